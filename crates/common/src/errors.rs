/// 错误定义

use thiserror::Error;

/// 统一错误类型
#[derive(Error, Debug)]
pub enum Error {
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyInState(String),

    #[error("传输错误: {0}")]
    Transport(String),

    #[error("操作已取消: {0}")]
    Cancelled(String),

    #[error("任务失败: {0}")]
    TaskFailed(String),

    #[error("无效参数: {0}")]
    InvalidArgument(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// 是否为取消/超时
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// 是否为资源未找到
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// 统一结果类型
pub type Result<T> = std::result::Result<T, Error>;
