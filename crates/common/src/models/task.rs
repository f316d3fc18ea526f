/// 异步任务模型
///
/// 状态变更请求返回 UPID，随后通过任务状态接口轮询

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// 任务运行状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Running,
    Stopped,
}

/// 任务状态快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStatus {
    pub status: TaskState,

    /// 任务结束后才有值，成功时为 `OK`
    #[serde(default, rename = "exitstatus", skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<String>,
}

impl TaskStatus {
    pub fn running() -> Self {
        Self {
            status: TaskState::Running,
            exit_status: None,
        }
    }

    pub fn stopped(exit_status: impl Into<String>) -> Self {
        Self {
            status: TaskState::Stopped,
            exit_status: Some(exit_status.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status == TaskState::Stopped
    }

    /// `OK` 或带警告结束都视为成功
    pub fn is_success(&self) -> bool {
        self.is_terminal()
            && self
                .exit_status
                .as_deref()
                .map(|s| s == "OK" || s.starts_with("WARNINGS"))
                .unwrap_or(false)
    }
}

/// 任务唯一标识
///
/// 格式: `UPID:node:pid:pstart:starttime:type:id:user:`，数值字段为十六进制
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upid {
    raw: String,
    pub node: String,
    pub pid: u32,
    pub pstart: u64,
    pub start_time: DateTime<Utc>,
    pub task_type: String,
    pub id: String,
    pub user: String,
}

impl Upid {
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Upid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("无效的 UPID: {}", s));

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 8 || parts[0] != "UPID" {
            return Err(invalid());
        }

        let pid = u32::from_str_radix(parts[2], 16).map_err(|_| invalid())?;
        let pstart = u64::from_str_radix(parts[3], 16).map_err(|_| invalid())?;
        let epoch = i64::from_str_radix(parts[4], 16).map_err(|_| invalid())?;
        let start_time = Utc.timestamp_opt(epoch, 0).single().ok_or_else(invalid)?;

        Ok(Self {
            raw: s.to_string(),
            node: parts[1].to_string(),
            pid,
            pstart,
            start_time,
            task_type: parts[5].to_string(),
            id: parts[6].to_string(),
            user: parts[7].to_string(),
        })
    }
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
