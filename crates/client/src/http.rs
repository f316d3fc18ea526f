/// PVE HTTP 客户端
///
/// 负责认证票据、请求发送与 `{"data": ...}` 响应解包

use common::{Context, Error, Result};
use reqwest::header::COOKIE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;

const CSRF_HEADER: &str = "CSRFPreventionToken";

/// 认证票据
#[derive(Debug, Clone, Deserialize)]
struct Ticket {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf_token: String,
}

/// API 响应包装
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    config: ConnectionConfig,
    ticket: OnceCell<Ticket>,
}

/// PVE API 客户端
///
/// 克隆开销很小，票据在同一客户端的所有克隆之间共享
#[derive(Clone)]
pub struct PveClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for PveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PveClient")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl PveClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        let base_url = config.url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!("无效的 PVE 地址: {}", config.url)));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                config,
                ticket: OnceCell::new(),
            }),
        })
    }

    /// 获取票据，首次调用时登录
    async fn ticket(&self) -> Result<&Ticket> {
        self.inner
            .ticket
            .get_or_try_init(|| self.login())
            .await
    }

    async fn login(&self) -> Result<Ticket> {
        let config = &self.inner.config;
        let username = config.login_name();
        let url = format!("{}/access/ticket", self.inner.base_url);

        debug!("🔐 登录 PVE: user={}, url={}", username, url);
        let response = self
            .inner
            .http
            .post(&url)
            .form(&[("username", username.as_str()), ("password", config.password.as_str())])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("登录请求失败: {}", e)))?;

        let ticket: Ticket = decode(response, "/access/ticket").await?;
        info!("✅ 登录成功: {}", username);
        Ok(ticket)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.send(ctx, Method::GET, path, query, &[]).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        self.send(ctx, Method::POST, path, &[], form).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<T> {
        ctx.run(async {
            let ticket = self.ticket().await?;
            let url = format!("{}{}", self.inner.base_url, path);

            debug!("📤 {} {}", method, path);
            let mut request = self
                .inner
                .http
                .request(method.clone(), &url)
                .header(COOKIE, format!("PVEAuthCookie={}", ticket.ticket));
            if !query.is_empty() {
                request = request.query(query);
            }
            if method != Method::GET {
                request = request.header(CSRF_HEADER, &ticket.csrf_token).form(form);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::Transport(format!("{} {} 请求失败: {}", method, path, e)))?;
            decode(response, path).await
        })
        .await
    }
}

/// 检查状态码并解包响应
async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<无法读取响应内容: {}>", e),
        };
        warn!("📥 {} 返回错误: status={}, body={}", path, status, body);
        let message = format!("{} {}: {}", status, path, body.trim());
        return Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Transport(message),
        });
    }

    let envelope: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| Error::Transport(format!("无法解析 {} 的响应: {}", path, e)))?;
    Ok(envelope.data)
}
