/// 状态变更编排
///
/// 比较虚拟机当前状态与目标状态，必要时向远端发起变更请求

use tracing::{info, warn};

use crate::cluster::{TaskHandle, VmHandle};
use crate::context::Context;
use crate::models::{RequestableState, VmAction, VmState};
use crate::{Error, Result};

/// 状态变更请求参数
#[derive(Debug)]
pub struct StateRequestParams<'a> {
    pub requested_state: RequestableState,
    /// 停止时使用 ACPI 关机而非强制停止
    pub graceful: bool,
    pub vm: &'a dyn VmHandle,
}

impl<'a> StateRequestParams<'a> {
    pub fn new(requested_state: RequestableState, vm: &'a dyn VmHandle) -> Self {
        Self {
            requested_state,
            graceful: false,
            vm,
        }
    }

    pub fn graceful(mut self, graceful: bool) -> Self {
        self.graceful = graceful;
        self
    }
}

/// 编排结果
#[derive(Debug)]
pub enum StateOutcome {
    /// 已处于目标状态，未发起请求
    AlreadySatisfied,
    /// 已发起请求
    Requested(Box<dyn TaskHandle>),
}

impl StateOutcome {
    pub fn task(&self) -> Option<&dyn TaskHandle> {
        match self {
            Self::Requested(task) => Some(task.as_ref()),
            Self::AlreadySatisfied => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateOrchestrator {
    idempotent: bool,
}

impl StateOrchestrator {
    pub fn new(idempotent: bool) -> Self {
        Self { idempotent }
    }

    /// 根据当前状态选择远端操作
    pub fn action_for(current: VmState, requested: RequestableState, graceful: bool) -> VmAction {
        match requested {
            RequestableState::Running if current == VmState::Paused => VmAction::Resume,
            RequestableState::Running => VmAction::Start,
            RequestableState::Stopped if graceful => VmAction::Shutdown,
            RequestableState::Stopped => VmAction::Stop,
            RequestableState::Paused => VmAction::Suspend,
        }
    }

    /// 请求状态变更
    pub async fn request_state(
        &self,
        ctx: &Context,
        params: StateRequestParams<'_>,
    ) -> Result<StateOutcome> {
        let vm = params.vm;
        let current = vm.state();

        if current == params.requested_state.as_vm_state() {
            let msg = format!("VM {} already in requested state ({})", vm.vmid(), current);
            if self.idempotent {
                warn!(vmid = vm.vmid(), node = %vm.node(), "{}", msg);
                return Ok(StateOutcome::AlreadySatisfied);
            }
            return Err(Error::AlreadyInState(msg));
        }

        let action = Self::action_for(current, params.requested_state, params.graceful);
        info!(
            vmid = vm.vmid(),
            node = %vm.node(),
            from = %current,
            action = %action,
            "请求虚拟机状态变更"
        );

        let task = vm.request(ctx, action).await?;
        Ok(StateOutcome::Requested(task))
    }
}
