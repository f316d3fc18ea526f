/// 工具函数集合

use crate::{Error, Result};

/// 解析单个 VMID
pub fn parse_vmid(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::InvalidArgument(format!(
            "无效的 VMID: {}",
            value
        ))),
        Ok(vmid) => Ok(vmid),
    }
}

/// 格式化字节大小
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
