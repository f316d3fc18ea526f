/// 集群客户端抽象层
///
/// 定义核心逻辑依赖的远端能力，具体实现由传输层（HTTP 客户端）或测试替身提供

use async_trait::async_trait;
use std::fmt;

use crate::context::Context;
use crate::models::{ResourceRecord, ServerFilter, TaskStatus, VmAction, VmState};
use crate::Result;

/// 已绑定到单个集群的客户端
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// 获取集群句柄
    async fn cluster(&self, ctx: &Context) -> Result<Box<dyn ClusterHandle>>;

    /// 按名称获取节点句柄
    async fn node(&self, ctx: &Context, name: &str) -> Result<Box<dyn NodeHandle>>;
}

/// 集群句柄
#[async_trait]
pub trait ClusterHandle: Send + Sync {
    /// 查询资源快照，`filter` 为空时返回全部资源
    async fn resources(
        &self,
        ctx: &Context,
        filter: Option<ServerFilter>,
    ) -> Result<Vec<ResourceRecord>>;
}

/// 节点句柄
#[async_trait]
pub trait NodeHandle: Send + Sync {
    fn name(&self) -> &str;

    /// 获取节点上的虚拟机
    async fn virtual_machine(&self, ctx: &Context, vmid: u64) -> Result<Box<dyn VmHandle>>;
}

/// 虚拟机句柄，状态为解析时的快照
#[async_trait]
pub trait VmHandle: Send + Sync + fmt::Debug {
    fn vmid(&self) -> u64;

    fn node(&self) -> &str;

    fn name(&self) -> Option<&str>;

    fn state(&self) -> VmState;

    /// 发起状态变更，返回远端异步任务
    async fn request(&self, ctx: &Context, action: VmAction) -> Result<Box<dyn TaskHandle>>;
}

/// 异步任务句柄
#[async_trait]
pub trait TaskHandle: Send + Sync + fmt::Debug + fmt::Display {
    fn upid(&self) -> &str;

    /// 查询一次任务状态
    async fn ping(&self, ctx: &Context) -> Result<TaskStatus>;
}
