/// 单次命令的完整流程：发现 -> 解析 -> 编排 -> 轮询

use std::time::Duration;
use tracing::info;

use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::models::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TASK_TIMEOUT};
use crate::models::{RequestableState, TaskStatus, VmState};
use crate::resolver::{DuplicatePolicy, VmResolver};
use crate::state::{StateOrchestrator, StateOutcome, StateRequestParams};
use crate::task::TaskTracker;
use crate::Result;

/// 状态变更请求
#[derive(Debug, Clone)]
pub struct StateChange {
    pub vmid: u64,
    pub requested_state: RequestableState,
    pub graceful: bool,
    pub idempotent: bool,
    pub duplicate_policy: DuplicatePolicy,
    pub poll_interval: Duration,
    /// 等待任务完成的超时，`None` 表示只受外部上下文约束
    pub timeout: Option<Duration>,
}

impl StateChange {
    pub fn new(vmid: u64, requested_state: RequestableState) -> Self {
        Self {
            vmid,
            requested_state,
            graceful: false,
            idempotent: false,
            duplicate_policy: DuplicatePolicy::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Some(Duration::from_secs(DEFAULT_TASK_TIMEOUT)),
        }
    }
}

/// 流程结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChangeReport {
    AlreadySatisfied {
        vmid: u64,
        state: VmState,
    },
    Completed {
        vmid: u64,
        node: String,
        task: String,
        status: TaskStatus,
    },
}

/// 执行一次状态变更
pub async fn run_state_change(
    ctx: &Context,
    client: &dyn ClusterClient,
    change: &StateChange,
) -> Result<StateChangeReport> {
    let vm = VmResolver::with_policy(change.duplicate_policy)
        .resolve(ctx, change.vmid, client)
        .await?;

    let params = StateRequestParams::new(change.requested_state, vm.as_ref())
        .graceful(change.graceful);
    let outcome = StateOrchestrator::new(change.idempotent)
        .request_state(ctx, params)
        .await?;

    let task = match outcome {
        StateOutcome::AlreadySatisfied => {
            return Ok(StateChangeReport::AlreadySatisfied {
                vmid: vm.vmid(),
                state: vm.state(),
            });
        }
        StateOutcome::Requested(task) => task,
    };
    info!(vmid = vm.vmid(), upid = task.upid(), "状态变更已提交，等待任务完成");

    let wait_ctx = match change.timeout {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx.child(),
    };
    let status = TaskTracker::new(change.poll_interval)
        .await_completion(&wait_ctx, task.as_ref())
        .await?;

    Ok(StateChangeReport::Completed {
        vmid: vm.vmid(),
        node: vm.node().to_string(),
        task: task.to_string(),
        status,
    })
}
