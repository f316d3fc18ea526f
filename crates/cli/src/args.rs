/// 命令行参数定义

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use common::models::constants::DEFAULT_TASK_TIMEOUT;
use common::models::{ResourceType, ServerFilter};
use common::DuplicatePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pvemox")]
#[command(about = "Proxmox VE 集群命令行客户端", long_about = None)]
pub struct Args {
    /// 配置文件路径（默认依次查找 $XDG_CONFIG_HOME/pvemox/config.yaml、~/.config/pvemox/config.yaml、~/.pvemox.yaml、./.pvemox.yaml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// 连接参数，未指定的项依次回退到环境变量、配置文件与默认值
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// 登录用户名
    #[arg(long = "pveuser", env = "PVE_USER", global = true)]
    pub user: Option<String>,

    /// 登录密码
    #[arg(long = "pvepassword", env = "PVE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// 认证域
    #[arg(long = "pverealm", env = "PVE_REALM", global = true)]
    pub realm: Option<String>,

    /// 完整 API 地址，指定后忽略 scheme/host/port
    #[arg(long = "pveurl", env = "PVE_URL", global = true)]
    pub url: Option<String>,

    /// 协议
    #[arg(long = "scheme", env = "PVE_URI_SCHEME", global = true)]
    pub scheme: Option<String>,

    /// 主机
    #[arg(long = "pvehost", env = "PVE_HOST", global = true)]
    pub host: Option<String>,

    /// 端口
    #[arg(long = "pveport", env = "PVE_PORT", global = true)]
    pub port: Option<u16>,

    /// 跳过 TLS 证书校验
    #[arg(long, env = "PVE_INSECURE", global = true, default_value_t = false)]
    pub insecure: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 强制停止虚拟机
    Stop(StateArgs),

    /// 通过 ACPI 关闭虚拟机
    Shutdown(StateArgs),

    /// 启动虚拟机（暂停中的虚拟机会被恢复）
    Start(StateArgs),

    /// 暂停虚拟机
    Suspend(StateArgs),

    /// 列出集群资源
    List(ListArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct StateArgs {
    /// 目标虚拟机 VMID
    #[arg(value_parser = parse_vmid)]
    pub vmid: u64,

    /// 虚拟机已处于目标状态时不报错
    #[arg(long, default_value_t = false)]
    pub idempotent: bool,

    /// 等待任务完成的超时（秒）
    #[arg(long, default_value_t = DEFAULT_TASK_TIMEOUT)]
    pub timeout_secs: u64,

    /// 同一 VMID 出现多条资源记录时的处理方式
    #[arg(long, value_enum, default_value = "last")]
    pub on_duplicate: DuplicateArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateArg {
    Last,
    First,
    Error,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Last => DuplicatePolicy::LastMatch,
            DuplicateArg::First => DuplicatePolicy::FirstMatch,
            DuplicateArg::Error => DuplicatePolicy::Reject,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// 服务端过滤器：vm、storage、node、sdn
    #[arg(long)]
    pub server_filter: Option<ServerFilter>,

    /// 客户端类型过滤，可重复，多个类型取并集
    #[arg(long = "type")]
    pub types: Vec<ResourceType>,

    /// 只列出 QEMU 虚拟机
    #[arg(long, default_value_t = false, conflicts_with_all = ["server_filter", "types"])]
    pub vms: bool,

    /// 以 JSON 输出
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

fn parse_vmid(value: &str) -> Result<u64, String> {
    common::utils::parse_vmid(value).map_err(|e| e.to_string())
}
