/// pvemox - PVE API 传输层
///
/// 基于 reqwest 实现 `common::ClusterClient`

pub mod config;
pub mod handles;
pub mod http;

pub use config::ConnectionConfig;
pub use http::PveClient;
