/// 连接配置
///
/// 由调用方在启动时构造并传入客户端，客户端内部不读取任何全局配置

use common::models::constants::{API_URL_SUFFIX, DEFAULT_HTTP_TIMEOUT};
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct ConnectionConfig {
    /// API 根地址，例如 `https://pve1:8006/api2/json`
    pub url: String,
    pub username: String,
    pub password: String,
    pub realm: String,
    pub timeout: Duration,
    /// 跳过 TLS 证书校验（自签名证书）
    pub insecure: bool,
}

impl ConnectionConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT),
            insecure: false,
        }
    }

    /// 显式 URL 优先，否则由协议、主机、端口拼接
    pub fn api_url(url: Option<&str>, scheme: &str, host: &str, port: u16) -> String {
        match url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => format!("{}://{}:{}{}", scheme, host, port, API_URL_SUFFIX),
        }
    }

    /// 登录名，形如 `root@pam`
    pub fn login_name(&self) -> String {
        if self.username.contains('@') {
            self.username.clone()
        } else {
            format!("{}@{}", self.username, self.realm)
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("realm", &self.realm)
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .finish()
    }
}
