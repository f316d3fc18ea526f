/// 资源过滤引擎
///
/// 两级过滤：服务端按资源大类缩小传输量，客户端再按具体类型或自定义条件筛选。
/// 客户端条件之间取并集，记录只要命中任意一个条件即被保留。

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::models::{ResourceRecord, ResourceType, ServerFilter};
use crate::Result;

/// 自定义过滤函数
pub type ResourceFilterFn = Arc<dyn Fn(&ResourceRecord) -> bool + Send + Sync>;

/// 客户端过滤条件
#[derive(Clone)]
pub enum ResourcePredicate {
    /// 资源类型相等
    Type(ResourceType),
    /// 自定义条件
    Custom(ResourceFilterFn),
}

impl ResourcePredicate {
    pub fn matches(&self, record: &ResourceRecord) -> bool {
        match self {
            Self::Type(t) => record.resource_type == *t,
            Self::Custom(f) => f(record),
        }
    }
}

impl fmt::Debug for ResourcePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(t) => write!(f, "Type({})", t),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// 资源查询（不可变）
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    server_filter: Option<ServerFilter>,
    predicates: Vec<ResourcePredicate>,
}

impl ResourceQuery {
    pub fn builder() -> ResourceQueryBuilder {
        ResourceQueryBuilder::default()
    }

    /// 不做任何过滤
    pub fn all() -> Self {
        Self::default()
    }

    pub fn server_filter(&self) -> Option<ServerFilter> {
        self.server_filter
    }

    pub fn predicates(&self) -> &[ResourcePredicate] {
        &self.predicates
    }

    /// 客户端过滤阶段：无条件时全部通过，否则保留命中任一条件的记录，顺序不变
    pub fn apply(&self, records: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
        if self.predicates.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|r| self.predicates.iter().any(|p| p.matches(r)))
            .collect()
    }
}

/// 资源查询构造器
#[derive(Debug, Default)]
pub struct ResourceQueryBuilder {
    server_filter: Option<ServerFilter>,
    predicates: Vec<ResourcePredicate>,
}

impl ResourceQueryBuilder {
    /// 服务端过滤器
    pub fn server_filter(mut self, filter: ServerFilter) -> Self {
        self.server_filter = Some(filter);
        self
    }

    /// 追加类型条件，重复的类型只保留一次
    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        let exists = self
            .predicates
            .iter()
            .any(|p| matches!(p, ResourcePredicate::Type(t) if *t == resource_type));
        if !exists {
            self.predicates.push(ResourcePredicate::Type(resource_type));
        }
        self
    }

    pub fn resource_types(self, types: impl IntoIterator<Item = ResourceType>) -> Self {
        types.into_iter().fold(self, |b, t| b.resource_type(t))
    }

    /// 追加自定义条件，需要交集语义时可在一个函数中组合多个条件
    pub fn matching<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResourceRecord) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(ResourcePredicate::Custom(Arc::new(f)));
        self
    }

    pub fn build(self) -> ResourceQuery {
        ResourceQuery {
            server_filter: self.server_filter,
            predicates: self.predicates,
        }
    }
}

/// 查询集群资源
pub async fn list_resources(
    ctx: &Context,
    client: &dyn ClusterClient,
    query: &ResourceQuery,
) -> Result<Vec<ResourceRecord>> {
    let cluster = client.cluster(ctx).await?;
    let snapshot = cluster.resources(ctx, query.server_filter()).await?;
    let total = snapshot.len();

    let records = query.apply(snapshot);
    debug!(
        server_filter = ?query.server_filter(),
        predicates = query.predicates().len(),
        total,
        matched = records.len(),
        "资源查询完成"
    );
    Ok(records)
}

/// 查询所有 QEMU 虚拟机资源
pub async fn list_virtual_machines(
    ctx: &Context,
    client: &dyn ClusterClient,
) -> Result<Vec<ResourceRecord>> {
    let query = ResourceQuery::builder()
        .server_filter(ServerFilter::Vm)
        .resource_type(ResourceType::Qemu)
        .build();
    list_resources(ctx, client, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallCounter, MockCluster};

    fn mixed_snapshot() -> Vec<ResourceRecord> {
        vec![
            ResourceRecord::new(ResourceType::Node, "pve1"),
            ResourceRecord::new(ResourceType::Storage, "pve1").with_name("local-lvm"),
            ResourceRecord::new(ResourceType::Pool, ""),
            ResourceRecord::new(ResourceType::Qemu, "pve1").with_vmid(100),
            ResourceRecord::new(ResourceType::Lxc, "pve1").with_vmid(101),
            ResourceRecord::new(ResourceType::OpenVz, "pve2").with_vmid(102),
            ResourceRecord::new(ResourceType::Sdn, "pve2"),
        ]
    }

    #[tokio::test]
    async fn test_vm_filter_then_qemu_only() {
        let client = MockCluster::new(vec![
            ResourceRecord::new(ResourceType::Qemu, "pve1").with_vmid(100),
            ResourceRecord::new(ResourceType::Lxc, "pve1").with_vmid(101),
        ]);
        let query = ResourceQuery::builder()
            .server_filter(ServerFilter::Vm)
            .resource_type(ResourceType::Qemu)
            .build();

        let records = list_resources(&Context::background(), &client, &query)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vmid, Some(100));
    }

    #[tokio::test]
    async fn test_predicates_are_unioned() {
        let client = MockCluster::new(mixed_snapshot());
        let query = ResourceQuery::builder()
            .resource_type(ResourceType::Qemu)
            .resource_type(ResourceType::Storage)
            .build();

        let records = list_resources(&Context::background(), &client, &query)
            .await
            .unwrap();
        let types: Vec<ResourceType> = records.iter().map(|r| r.resource_type).collect();
        assert_eq!(types, vec![ResourceType::Storage, ResourceType::Qemu]);
    }

    #[tokio::test]
    async fn test_no_predicates_passes_everything() {
        let client = MockCluster::new(mixed_snapshot());
        let records = list_resources(&Context::background(), &client, &ResourceQuery::all())
            .await
            .unwrap();
        assert_eq!(records, mixed_snapshot());
    }

    #[tokio::test]
    async fn test_server_filter_scopes_snapshot() {
        let client = MockCluster::new(mixed_snapshot());
        let query = ResourceQuery::builder().server_filter(ServerFilter::Vm).build();

        let records = list_resources(&Context::background(), &client, &query)
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| ServerFilter::Vm.admits(r.resource_type)));
    }

    #[test]
    fn test_duplicate_type_is_collapsed() {
        let query = ResourceQuery::builder()
            .resource_type(ResourceType::Qemu)
            .resource_type(ResourceType::Qemu)
            .build();
        assert_eq!(query.predicates().len(), 1);

        let records = query.apply(mixed_snapshot());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_custom_predicate_unions_with_types() {
        let query = ResourceQuery::builder()
            .resource_type(ResourceType::Node)
            .matching(|r| r.vmid.map(|id| id >= 101).unwrap_or(false))
            .build();

        let ids: Vec<String> = query
            .apply(mixed_snapshot())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["node/pve1", "lxc/101", "openvz/102"]);
    }

    #[test]
    fn test_apply_is_pure() {
        let query = ResourceQuery::builder()
            .resource_types([ResourceType::Lxc, ResourceType::Sdn])
            .build();
        let first = query.apply(mixed_snapshot());
        let second = query.apply(mixed_snapshot());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = MockCluster::new(mixed_snapshot()).failing_resources("401 认证失败");
        let err = list_resources(&Context::background(), &client, &ResourceQuery::all())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Transport(ref m) if m == "401 认证失败"));
        assert_eq!(CallCounter::get(&client.calls.resources), 1);
    }

    #[tokio::test]
    async fn test_list_virtual_machines() {
        let client = MockCluster::new(mixed_snapshot());
        let records = list_virtual_machines(&Context::background(), &client)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_type, ResourceType::Qemu);
    }
}
