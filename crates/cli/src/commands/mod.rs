/// 子命令实现

pub mod list;
pub mod state;

use client::PveClient;
use common::models::RequestableState;
use common::Context;

use crate::args::Command;

/// 分发子命令
pub async fn dispatch(ctx: &Context, client: &PveClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Stop(args) => state::run(ctx, client, RequestableState::Stopped, false, args).await,
        Command::Shutdown(args) => state::run(ctx, client, RequestableState::Stopped, true, args).await,
        Command::Start(args) => state::run(ctx, client, RequestableState::Running, false, args).await,
        Command::Suspend(args) => state::run(ctx, client, RequestableState::Paused, false, args).await,
        Command::List(args) => list::run(ctx, client, args).await,
    }
}
