/// pvemox - 公共库
///
/// 资源发现与过滤、实体解析、状态变更编排以及任务跟踪

pub mod cluster;
pub mod context;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod resources;
pub mod state;
pub mod task;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use cluster::{ClusterClient, ClusterHandle, NodeHandle, TaskHandle, VmHandle};
pub use context::Context;
pub use errors::{Error, Result};
pub use resources::{list_resources, list_virtual_machines, ResourceQuery};
pub use resolver::{resolve_vm, DuplicatePolicy, VmResolver};
pub use state::{StateOrchestrator, StateOutcome, StateRequestParams};
pub use task::TaskTracker;
pub use workflow::{run_state_change, StateChange, StateChangeReport};
