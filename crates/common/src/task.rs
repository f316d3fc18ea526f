/// 任务跟踪
///
/// 轮询异步任务直至终态；上下文取消或超时时停止轮询，远端任务的实际结果不做假设

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cluster::TaskHandle;
use crate::context::Context;
use crate::models::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::models::TaskStatus;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct TaskTracker {
    poll_interval: Duration,
}

impl Default for TaskTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }
}

impl TaskTracker {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// 等待任务完成
    pub async fn await_completion(
        &self,
        ctx: &Context,
        task: &dyn TaskHandle,
    ) -> Result<TaskStatus> {
        let mut polls: u32 = 0;
        let interrupted = |e: Error| match e {
            Error::Cancelled(reason) => {
                Error::Cancelled(format!("等待任务 {} 时中断: {}", task.upid(), reason))
            }
            other => other,
        };

        loop {
            let status = ctx.run(task.ping(ctx)).await.map_err(interrupted)?;
            polls += 1;

            if status.is_terminal() {
                let exit_status = status.exit_status.clone().unwrap_or_default();
                if !status.is_success() {
                    return Err(Error::TaskFailed(format!("{}: {}", task.upid(), exit_status)));
                }
                if exit_status != "OK" {
                    warn!(upid = task.upid(), exit_status = %exit_status, "任务完成但有警告");
                }
                info!(upid = task.upid(), polls, "任务已完成");
                return Ok(status);
            }

            debug!(upid = task.upid(), polls, "任务仍在运行");

            ctx.sleep(self.poll_interval).await.map_err(interrupted)?;
        }
    }
}
