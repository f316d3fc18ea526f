/// 配置管理
///
/// 优先级：命令行参数 > 环境变量 > 配置文件 > 默认值。
/// 命令行与环境变量由 clap 合并，这里只负责配置文件与默认值。

use anyhow::Context as _;
use client::ConnectionConfig;
use common::models::constants::{APP_NAME, DEFAULT_HTTP_TIMEOUT, DEFAULT_PVE_PORT, DEFAULT_SCHEME};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::args::ConnectionArgs;

/// 配置文件内容（YAML）
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FileSettings {
    #[serde(default, alias = "pveuser")]
    pub pve_user: Option<String>,
    #[serde(default, alias = "pvepassword")]
    pub pve_password: Option<String>,
    #[serde(default, alias = "pverealm")]
    pub pve_realm: Option<String>,
    #[serde(default, alias = "pveurl", alias = "url")]
    pub pve_url: Option<String>,
    #[serde(default, alias = "scheme")]
    pub pve_uri_scheme: Option<String>,
    #[serde(default, alias = "pvehost")]
    pub pve_host: Option<String>,
    #[serde(default, alias = "pveport")]
    pub pve_port: Option<u16>,
    #[serde(default)]
    pub insecure: Option<bool>,
    /// HTTP 请求超时（秒）
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl FileSettings {
    /// 加载配置文件；未显式指定且找不到文件时使用空配置
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("配置文件不存在: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match discover_config_file() {
                Some(path) => path,
                None => {
                    debug!("未找到配置文件，使用默认配置");
                    return Ok(Self::default());
                }
            },
        };

        debug!("加载配置文件: {}", path.display());
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .with_context(|| format!("无法读取配置文件 {}", path.display()))
    }

    /// 合并命令行参数，生成连接配置
    pub fn connection(&self, args: &ConnectionArgs) -> ConnectionConfig {
        let pick = |arg: &Option<String>, file: &Option<String>, default: &str| {
            arg.clone()
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        let url = args.url.clone().or_else(|| self.pve_url.clone());
        let scheme = pick(&args.scheme, &self.pve_uri_scheme, DEFAULT_SCHEME);
        let host = pick(&args.host, &self.pve_host, "localhost");
        let port = args.port.or(self.pve_port).unwrap_or(DEFAULT_PVE_PORT);

        let mut config = ConnectionConfig::new(
            ConnectionConfig::api_url(url.as_deref(), &scheme, &host, port),
            pick(&args.user, &self.pve_user, "root"),
            pick(&args.password, &self.pve_password, "root"),
            pick(&args.realm, &self.pve_realm, "pam"),
        );
        config.insecure = args.insecure || self.insecure.unwrap_or(false);
        config.timeout = Duration::from_secs(self.timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT));
        config
    }
}

/// 配置文件候选路径，按优先级排列
pub fn candidate_paths(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    match xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
        Some(xdg) => paths.push(xdg.join(APP_NAME).join("config.yaml")),
        None => {
            if let Some(home) = &home {
                paths.push(home.join(".config").join(APP_NAME).join("config.yaml"));
            }
        }
    }
    if let Some(home) = home {
        paths.push(home.join(format!(".{}.yaml", APP_NAME)));
    }
    if let Some(cwd) = cwd {
        paths.push(cwd.join(format!(".{}.yaml", APP_NAME)));
    }

    paths
}

fn discover_config_file() -> Option<PathBuf> {
    candidate_paths(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        dirs::home_dir(),
        std::env::current_dir().ok(),
    )
    .into_iter()
    .find(|p| p.is_file())
}
