/// 集群能力的 HTTP 实现

use async_trait::async_trait;
use common::cluster::{ClusterClient, ClusterHandle, NodeHandle, TaskHandle, VmHandle};
use common::models::{ResourceRecord, ServerFilter, TaskStatus, Upid, VmAction, VmState};
use common::{Context, Error, Result};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use crate::http::PveClient;

#[async_trait]
impl ClusterClient for PveClient {
    async fn cluster(&self, _ctx: &Context) -> Result<Box<dyn ClusterHandle>> {
        Ok(Box::new(PveCluster {
            client: self.clone(),
        }))
    }

    async fn node(&self, ctx: &Context, name: &str) -> Result<Box<dyn NodeHandle>> {
        let status: NodeStatus = self
            .get(ctx, &format!("/nodes/{}/status", name), &[])
            .await?;
        debug!(node = name, uptime = ?status.uptime, "节点状态");

        Ok(Box::new(PveNode {
            client: self.clone(),
            name: name.to_string(),
        }))
    }
}

/// 节点状态（只关心少量字段）
#[derive(Debug, Deserialize)]
struct NodeStatus {
    #[serde(default)]
    uptime: Option<u64>,
}

/// 虚拟机当前状态
#[derive(Debug, Deserialize)]
struct VmCurrentStatus {
    status: String,
    #[serde(default)]
    qmpstatus: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

pub struct PveCluster {
    client: PveClient,
}

#[async_trait]
impl ClusterHandle for PveCluster {
    async fn resources(
        &self,
        ctx: &Context,
        filter: Option<ServerFilter>,
    ) -> Result<Vec<ResourceRecord>> {
        let query: Vec<(&str, &str)> = filter
            .map(|f| vec![("type", f.as_str())])
            .unwrap_or_default();
        self.client.get(ctx, "/cluster/resources", &query).await
    }
}

pub struct PveNode {
    client: PveClient,
    name: String,
}

#[async_trait]
impl NodeHandle for PveNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn virtual_machine(&self, ctx: &Context, vmid: u64) -> Result<Box<dyn VmHandle>> {
        let current: VmCurrentStatus = self
            .client
            .get(
                ctx,
                &format!("/nodes/{}/qemu/{}/status/current", self.name, vmid),
                &[],
            )
            .await?;

        Ok(Box::new(PveVm {
            client: self.client.clone(),
            node: self.name.clone(),
            vmid,
            name: current.name,
            state: VmState::from_status(&current.status, current.qmpstatus.as_deref()),
        }))
    }
}

#[derive(Debug)]
pub struct PveVm {
    client: PveClient,
    node: String,
    vmid: u64,
    name: Option<String>,
    state: VmState,
}

#[async_trait]
impl VmHandle for PveVm {
    fn vmid(&self) -> u64 {
        self.vmid
    }

    fn node(&self) -> &str {
        &self.node
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn state(&self) -> VmState {
        self.state
    }

    async fn request(&self, ctx: &Context, action: VmAction) -> Result<Box<dyn TaskHandle>> {
        let upid: String = self
            .client
            .post(
                ctx,
                &format!("/nodes/{}/qemu/{}/status/{}", self.node, self.vmid, action),
                &[],
            )
            .await?;

        let upid: Upid = upid.parse().map_err(|e| {
            Error::Transport(format!(
                "已向虚拟机 {} 发出 {} 请求，但无法解析返回的任务标识 {:?}: {}",
                self.vmid, action, upid, e
            ))
        })?;
        Ok(Box::new(PveTask {
            client: self.client.clone(),
            upid,
        }))
    }
}

#[derive(Debug)]
pub struct PveTask {
    client: PveClient,
    upid: Upid,
}

impl fmt::Display for PveTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {} on {}, started {})",
            self.upid,
            self.upid.task_type,
            self.upid.id,
            self.upid.node,
            self.upid.start_time.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

#[async_trait]
impl TaskHandle for PveTask {
    fn upid(&self) -> &str {
        self.upid.as_str()
    }

    async fn ping(&self, ctx: &Context) -> Result<TaskStatus> {
        self.client
            .get(
                ctx,
                &format!("/nodes/{}/tasks/{}/status", self.upid.node, self.upid),
                &[],
            )
            .await
    }
}
