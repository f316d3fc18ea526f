/// stop / shutdown / start / suspend

use anyhow::Context as _;
use client::PveClient;
use common::models::RequestableState;
use common::{run_state_change, Context, StateChange, StateChangeReport};
use std::time::Duration;
use tracing::info;

use crate::args::StateArgs;

pub fn build_change(requested_state: RequestableState, graceful: bool, args: &StateArgs) -> StateChange {
    let mut change = StateChange::new(args.vmid, requested_state);
    change.graceful = graceful;
    change.idempotent = args.idempotent;
    change.duplicate_policy = args.on_duplicate.into();
    change.timeout = Some(Duration::from_secs(args.timeout_secs));
    change
}

pub async fn run(
    ctx: &Context,
    client: &PveClient,
    requested_state: RequestableState,
    graceful: bool,
    args: StateArgs,
) -> anyhow::Result<()> {
    let change = build_change(requested_state, graceful, &args);
    info!(vmid = change.vmid, "🔄 请求虚拟机进入 {} 状态", requested_state);

    let report = run_state_change(ctx, client, &change)
        .await
        .with_context(|| format!("虚拟机 {} 状态变更失败", change.vmid))?;

    match report {
        StateChangeReport::AlreadySatisfied { vmid, state } => {
            info!(vmid, "虚拟机已处于 {} 状态，无需操作", state);
        }
        StateChangeReport::Completed { vmid, node, task, .. } => {
            info!(vmid, node = %node, "✅ 任务完成: {}", task);
        }
    }
    Ok(())
}
