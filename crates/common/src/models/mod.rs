/// 共享数据模型
///
/// 定义集群资源、虚拟机状态以及任务相关的数据结构

pub mod task;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use task::{TaskState, TaskStatus, Upid};

/// 服务端资源过滤器（`/cluster/resources?type=`）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServerFilter {
    Vm,
    Storage,
    Node,
    Sdn,
}

impl ServerFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vm => "vm",
            Self::Storage => "storage",
            Self::Node => "node",
            Self::Sdn => "sdn",
        }
    }

    /// 该过滤器在服务端会保留的资源类型
    pub fn admits(&self, resource_type: ResourceType) -> bool {
        match self {
            Self::Vm => matches!(
                resource_type,
                ResourceType::Qemu | ResourceType::Lxc | ResourceType::OpenVz
            ),
            Self::Storage => resource_type == ResourceType::Storage,
            Self::Node => resource_type == ResourceType::Node,
            Self::Sdn => resource_type == ResourceType::Sdn,
        }
    }
}

impl fmt::Display for ServerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServerFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vm" => Ok(Self::Vm),
            "storage" => Ok(Self::Storage),
            "node" => Ok(Self::Node),
            "sdn" => Ok(Self::Sdn),
            other => Err(crate::Error::InvalidArgument(format!(
                "未知的资源过滤器: {}",
                other
            ))),
        }
    }
}

/// 集群资源类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Node,
    Storage,
    Pool,
    Qemu,
    Lxc,
    /// 已废弃
    OpenVz,
    Sdn,
    /// 新版本服务端可能返回的其它类型
    #[serde(other)]
    Unknown,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Storage => "storage",
            Self::Pool => "pool",
            Self::Qemu => "qemu",
            Self::Lxc => "lxc",
            Self::OpenVz => "openvz",
            Self::Sdn => "sdn",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "node" => Ok(Self::Node),
            "storage" => Ok(Self::Storage),
            "pool" => Ok(Self::Pool),
            "qemu" => Ok(Self::Qemu),
            "lxc" => Ok(Self::Lxc),
            "openvz" => Ok(Self::OpenVz),
            "sdn" => Ok(Self::Sdn),
            other => Err(crate::Error::InvalidArgument(format!(
                "未知的资源类型: {}",
                other
            ))),
        }
    }
}

/// 集群资源记录
///
/// 每次发现调用都会重新生成，调用方独占所有权
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    /// 所属节点（pool 类型没有）
    #[serde(default)]
    pub node: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u64>,

    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// 其余字段原样透传
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ResourceRecord {
    pub fn new(resource_type: ResourceType, node: impl Into<String>) -> Self {
        let node = node.into();
        Self {
            id: format!("{}/{}", resource_type, node),
            resource_type,
            node,
            vmid: None,
            name: None,
            status: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_vmid(mut self, vmid: u64) -> Self {
        self.id = format!("{}/{}", self.resource_type, vmid);
        self.vmid = Some(vmid);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// 虚拟机运行状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VmState {
    Running,
    Stopped,
    Paused,
    Unknown,
}

impl VmState {
    /// 由 `status` 与 `qmpstatus` 推导状态，暂停的虚拟机 `status` 仍为 running
    pub fn from_status(status: &str, qmp_status: Option<&str>) -> Self {
        match (status, qmp_status) {
            ("running", Some("paused")) | ("running", Some("suspended")) => Self::Paused,
            ("running", _) => Self::Running,
            ("stopped", _) => Self::Stopped,
            ("paused", _) => Self::Paused,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Paused => "paused",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可请求的目标状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestableState {
    Running,
    Stopped,
    Paused,
}

impl RequestableState {
    pub fn as_vm_state(&self) -> VmState {
        match self {
            Self::Running => VmState::Running,
            Self::Stopped => VmState::Stopped,
            Self::Paused => VmState::Paused,
        }
    }
}

impl fmt::Display for RequestableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_vm_state().as_str())
    }
}

/// 远端状态变更操作（`status/{action}`）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VmAction {
    Start,
    Stop,
    Shutdown,
    Suspend,
    Resume,
}

impl VmAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Shutdown => "shutdown",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
        }
    }
}

impl fmt::Display for VmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 常量定义
pub mod constants {
    /// 应用名称，用于配置目录
    pub const APP_NAME: &str = "pvemox";

    /// API 路径后缀
    pub const API_URL_SUFFIX: &str = "/api2/json";

    /// 默认 PVE 端口
    pub const DEFAULT_PVE_PORT: u16 = 8006;

    /// 默认协议
    pub const DEFAULT_SCHEME: &str = "https";

    /// 默认任务轮询间隔（毫秒）
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

    /// 默认任务等待超时（秒）
    pub const DEFAULT_TASK_TIMEOUT: u64 = 300;

    /// 默认 HTTP 请求超时（秒）
    pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;
}
