/// list 子命令

use anyhow::Context as _;
use client::PveClient;
use common::models::ResourceRecord;
use common::utils::format_bytes;
use common::{list_resources, list_virtual_machines, Context, ResourceQuery};
use tracing::debug;

use crate::args::ListArgs;

pub fn build_query(args: &ListArgs) -> ResourceQuery {
    let mut builder = ResourceQuery::builder().resource_types(args.types.iter().copied());
    if let Some(filter) = args.server_filter {
        builder = builder.server_filter(filter);
    }
    builder.build()
}

pub async fn run(ctx: &Context, client: &PveClient, args: ListArgs) -> anyhow::Result<()> {
    let records = if args.vms {
        list_virtual_machines(ctx, client).await
    } else {
        list_resources(ctx, client, &build_query(&args)).await
    }
    .context("获取集群资源失败")?;
    debug!(count = records.len(), "资源列表");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render_table(&records));
    }
    Ok(())
}

/// 表格输出
pub fn render_table(records: &[ResourceRecord]) -> String {
    let mut out = format!(
        "{:<20} {:<8} {:<12} {:>6} {:<24} {:<10} {:>12}\n",
        "ID", "TYPE", "NODE", "VMID", "NAME", "STATUS", "MAXMEM"
    );
    for record in records {
        let vmid = record.vmid.map(|v| v.to_string()).unwrap_or_default();
        let maxmem = record
            .extra
            .get("maxmem")
            .and_then(|v| v.as_u64())
            .map(format_bytes)
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<20} {:<8} {:<12} {:>6} {:<24} {:<10} {:>12}\n",
            record.id,
            record.resource_type,
            record.node,
            vmid,
            record.name.as_deref().unwrap_or("-"),
            record.status.as_deref().unwrap_or("-"),
            maxmem,
        ));
    }
    out
}
