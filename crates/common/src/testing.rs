/// 测试替身
///
/// 基于内存快照的集群客户端，记录每类远端调用的次数

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cluster::{ClusterClient, ClusterHandle, NodeHandle, TaskHandle, VmHandle};
use crate::context::Context;
use crate::models::{ResourceRecord, ServerFilter, TaskStatus, VmAction, VmState};
use crate::{Error, Result};

/// 远端调用计数
#[derive(Debug, Default)]
pub struct CallCounter {
    pub clusters: AtomicUsize,
    pub resources: AtomicUsize,
    pub nodes: AtomicUsize,
    pub vms: AtomicUsize,
    pub requests: AtomicUsize,
    pub pings: AtomicUsize,
}

impl CallCounter {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct MockCluster {
    snapshot: Vec<ResourceRecord>,
    pings_until_done: usize,
    exit_status: String,
    fail_resources: Option<String>,
    reject_request: Option<String>,
    fail_pings_after: Option<usize>,
    pub calls: Arc<CallCounter>,
    pub requested: Arc<Mutex<Vec<(String, u64, VmAction)>>>,
}

impl MockCluster {
    pub fn new(snapshot: Vec<ResourceRecord>) -> Self {
        Self {
            snapshot,
            pings_until_done: 0,
            exit_status: "OK".to_string(),
            fail_resources: None,
            reject_request: None,
            fail_pings_after: None,
            calls: Arc::new(CallCounter::default()),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 任务在返回终态前先报告 `n` 次 running
    pub fn with_running_pings(mut self, n: usize) -> Self {
        self.pings_until_done = n;
        self
    }

    pub fn with_exit_status(mut self, exit_status: impl Into<String>) -> Self {
        self.exit_status = exit_status.into();
        self
    }

    pub fn failing_resources(mut self, message: impl Into<String>) -> Self {
        self.fail_resources = Some(message.into());
        self
    }

    pub fn rejecting_requests(mut self, message: impl Into<String>) -> Self {
        self.reject_request = Some(message.into());
        self
    }

    /// 前 `n` 次查询正常，之后的任务状态查询返回传输错误
    pub fn failing_pings_after(mut self, n: usize) -> Self {
        self.fail_pings_after = Some(n);
        self
    }

    pub fn request_count(&self) -> usize {
        CallCounter::get(&self.calls.requests)
    }

    pub fn ping_count(&self) -> usize {
        CallCounter::get(&self.calls.pings)
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    async fn cluster(&self, _ctx: &Context) -> Result<Box<dyn ClusterHandle>> {
        self.calls.clusters.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }

    async fn node(&self, _ctx: &Context, name: &str) -> Result<Box<dyn NodeHandle>> {
        self.calls.nodes.fetch_add(1, Ordering::SeqCst);
        if !self.snapshot.iter().any(|r| r.node == name) {
            return Err(Error::NotFound(format!("节点 {}", name)));
        }
        Ok(Box::new(MockNode {
            name: name.to_string(),
            cluster: self.clone(),
        }))
    }
}

#[async_trait]
impl ClusterHandle for MockCluster {
    async fn resources(
        &self,
        _ctx: &Context,
        filter: Option<ServerFilter>,
    ) -> Result<Vec<ResourceRecord>> {
        self.calls.resources.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_resources {
            return Err(Error::Transport(message.clone()));
        }
        Ok(self
            .snapshot
            .iter()
            .filter(|r| filter.map(|f| f.admits(r.resource_type)).unwrap_or(true))
            .cloned()
            .collect())
    }
}

struct MockNode {
    name: String,
    cluster: MockCluster,
}

#[async_trait]
impl NodeHandle for MockNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn virtual_machine(&self, _ctx: &Context, vmid: u64) -> Result<Box<dyn VmHandle>> {
        self.cluster.calls.vms.fetch_add(1, Ordering::SeqCst);
        let record = self
            .cluster
            .snapshot
            .iter()
            .find(|r| r.node == self.name && r.vmid == Some(vmid))
            .ok_or_else(|| Error::NotFound(format!("虚拟机 {} (节点 {})", vmid, self.name)))?;

        let state = record
            .status
            .as_deref()
            .map(|s| VmState::from_status(s, None))
            .unwrap_or(VmState::Unknown);

        Ok(Box::new(MockVm {
            vmid,
            node: self.name.clone(),
            name: record.name.clone(),
            state,
            cluster: self.cluster.clone(),
        }))
    }
}

pub struct MockVm {
    pub vmid: u64,
    pub node: String,
    pub name: Option<String>,
    pub state: VmState,
    cluster: MockCluster,
}

impl MockVm {
    pub fn new(cluster: &MockCluster, vmid: u64, node: &str, state: VmState) -> Self {
        Self {
            vmid,
            node: node.to_string(),
            name: None,
            state,
            cluster: cluster.clone(),
        }
    }
}

impl fmt::Debug for MockVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockVm")
            .field("vmid", &self.vmid)
            .field("node", &self.node)
            .field("state", &self.state)
            .finish()
    }
}

#[async_trait]
impl VmHandle for MockVm {
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

    async fn request(&self, _ctx: &Context, action: VmAction) -> Result<Box<dyn TaskHandle>> {
        self.cluster.calls.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.cluster.reject_request {
            return Err(Error::Transport(message.clone()));
        }
        if let Ok(mut requested) = self.cluster.requested.lock() {
            requested.push((self.node.clone(), self.vmid, action));
        }
        Ok(Box::new(MockTask {
            upid: format!(
                "UPID:{}:00001234:00005678:65A0F1C0:qm{}:{}:root@pam:",
                self.node, action, self.vmid
            ),
            pings_until_done: self.cluster.pings_until_done,
            exit_status: self.cluster.exit_status.clone(),
            fail_after: self.cluster.fail_pings_after,
            seen: AtomicUsize::new(0),
            calls: self.cluster.calls.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct MockTask {
    upid: String,
    pings_until_done: usize,
    exit_status: String,
    fail_after: Option<usize>,
    seen: AtomicUsize,
    calls: Arc<CallCounter>,
}

impl fmt::Display for MockTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.upid)
    }
}

#[async_trait]
impl TaskHandle for MockTask {
    fn upid(&self) -> &str {
        &self.upid
    }

    async fn ping(&self, _ctx: &Context) -> Result<TaskStatus> {
        self.calls.pings.fetch_add(1, Ordering::SeqCst);
        let seen = self.seen.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| seen >= n) {
            return Err(Error::Transport(format!("500 查询任务 {} 状态失败", self.upid)));
        }
        if seen < self.pings_until_done {
            Ok(TaskStatus::running())
        } else {
            Ok(TaskStatus::stopped(self.exit_status.clone()))
        }
    }
}
