/// pvemox - Proxmox VE 集群命令行客户端
///
/// 发现集群资源、变更虚拟机状态并等待任务完成

mod args;
mod commands;
mod config;

use anyhow::Context as _;
use clap::Parser;
use client::PveClient;
use common::Context;
use tracing::{debug, warn};

use crate::args::Args;
use crate::config::FileSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 后再解析参数，使环境变量绑定生效
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // 初始化日志，输出到 stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    let settings = FileSettings::load(args.config.as_deref())?;
    let connection = settings.connection(&args.connection);
    debug!(url = %connection.url, user = %connection.login_name(), "连接配置");

    let client = PveClient::new(connection).context("无法创建 PVE 客户端")?;

    let ctx = Context::background();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 收到中断信号，正在取消...");
            interrupt.cancel();
        }
    });

    commands::dispatch(&ctx, &client, args.command).await
}
