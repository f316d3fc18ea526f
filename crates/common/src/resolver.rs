/// 实体解析
///
/// 将 VMID 解析为具体的节点与虚拟机句柄

use tracing::{debug, warn};

use crate::cluster::{ClusterClient, VmHandle};
use crate::context::Context;
use crate::models::{ResourceRecord, ServerFilter};
use crate::resources::{list_resources, ResourceQuery};
use crate::{Error, Result};

/// 同一 VMID 出现多条记录时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// 以快照中最后一条为准
    #[default]
    LastMatch,
    /// 以快照中第一条为准
    FirstMatch,
    /// 直接报错
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct VmResolver {
    policy: DuplicatePolicy,
}

impl VmResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    /// 解析虚拟机
    pub async fn resolve(
        &self,
        ctx: &Context,
        vmid: u64,
        client: &dyn ClusterClient,
    ) -> Result<Box<dyn VmHandle>> {
        if vmid == 0 {
            return Err(Error::InvalidArgument("VMID 必须为正整数".to_string()));
        }

        let query = ResourceQuery::builder()
            .server_filter(ServerFilter::Vm)
            .build();
        let resources = list_resources(ctx, client, &query).await?;

        let record = self.select(vmid, &resources)?;
        debug!(vmid, node = %record.node, "已定位虚拟机所在节点");

        let node = client.node(ctx, &record.node).await?;
        node.virtual_machine(ctx, vmid).await
    }

    /// 按策略从快照中选出唯一记录
    fn select<'a>(&self, vmid: u64, resources: &'a [ResourceRecord]) -> Result<&'a ResourceRecord> {
        let matches: Vec<&ResourceRecord> = resources
            .iter()
            .filter(|r| r.vmid == Some(vmid))
            .collect();

        if matches.len() > 1 {
            let nodes: Vec<&str> = matches.iter().map(|r| r.node.as_str()).collect();
            if self.policy == DuplicatePolicy::Reject {
                return Err(Error::InvalidArgument(format!(
                    "VMID {} 对应多条资源记录: {}",
                    vmid,
                    nodes.join(", ")
                )));
            }
            warn!(vmid, nodes = ?nodes, policy = ?self.policy, "VMID 对应多条资源记录");
        }

        let selected = match self.policy {
            DuplicatePolicy::FirstMatch => matches.first(),
            DuplicatePolicy::LastMatch | DuplicatePolicy::Reject => matches.last(),
        };

        selected
            .copied()
            .ok_or_else(|| Error::NotFound(format!("VMID 为 {} 的虚拟机", vmid)))
    }
}

/// 以默认策略解析虚拟机
pub async fn resolve_vm(
    ctx: &Context,
    vmid: u64,
    client: &dyn ClusterClient,
) -> Result<Box<dyn VmHandle>> {
    VmResolver::new().resolve(ctx, vmid, client).await
}
