//! Resource query layer
//!
//! Listing calls go to the daemon through the handle. Lookups work on
//! records that were already fetched and never issue I/O, so a caller can
//! list once and look up many times.

use regex::Regex;
use sg_api::{Container, FilterArgs, ListOptions, Network, Node, Resource, Service, Task};

use crate::api::DockerApi;
use crate::error::ClientError;
use crate::handle::ClientHandle;

/// Listing options for a set of filter pairs
///
/// No pairs means an unfiltered listing. Every pair is forwarded; repeated
/// keys add predicates rather than replacing earlier ones.
pub fn list_options<I, K, V>(filter: I) -> ListOptions
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let filters: FilterArgs = filter.into_iter().collect();
    if filters.is_empty() {
        ListOptions::default()
    } else {
        ListOptions::with_filters(filters)
    }
}

/// First record whose ID equals `id` exactly
pub fn find_by_id<'a, R: Resource>(id: &str, records: &'a [R]) -> Result<&'a R, ClientError> {
    records
        .iter()
        .find(|record| record.id() == id)
        .ok_or_else(|| ClientError::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        })
}

/// Services whose name matches the regular expression `pattern`
///
/// Matching is unanchored and keeps the input order. A malformed pattern
/// is an error, never an empty result.
pub fn find_services_by_name(
    pattern: &str,
    services: &[Service],
) -> Result<Vec<Service>, ClientError> {
    let regex = Regex::new(pattern)?;
    Ok(matching_services(&regex, services))
}

/// Tasks belonging to `service_id`, in input order
pub fn find_tasks_by_service_id(service_id: &str, tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.service_id == service_id)
        .cloned()
        .collect()
}

fn matching_services(regex: &Regex, services: &[Service]) -> Vec<Service> {
    services
        .iter()
        .filter(|service| regex.is_match(service.name()))
        .cloned()
        .collect()
}

impl<A: DockerApi> ClientHandle<A> {
    pub async fn list_services<I, K, V>(&self, filter: I) -> Result<Vec<Service>, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.service_list(list_options(filter)).await
    }

    pub async fn list_tasks<I, K, V>(&self, filter: I) -> Result<Vec<Task>, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.task_list(list_options(filter)).await
    }

    pub async fn list_nodes<I, K, V>(&self, filter: I) -> Result<Vec<Node>, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.node_list(list_options(filter)).await
    }

    pub async fn list_networks<I, K, V>(&self, filter: I) -> Result<Vec<Network>, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.network_list(list_options(filter)).await
    }

    pub async fn list_containers<I, K, V>(
        &self,
        filter: I,
    ) -> Result<Vec<Container>, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.container_list(list_options(filter)).await
    }

    /// Remove every service whose name matches `pattern`
    ///
    /// Lists all services, then removes the matches one by one in listing
    /// order. This is not transactional: the first failed removal stops the
    /// run and yields [`ClientError::PartialDelete`] carrying the services
    /// already removed. Re-running is safe since removed services no longer
    /// appear in the listing.
    pub async fn delete_services_matching(
        &self,
        pattern: &str,
    ) -> Result<Vec<Service>, ClientError> {
        let regex = Regex::new(pattern)?;

        let services = self.service_list(ListOptions::default()).await?;
        let matched = matching_services(&regex, &services);
        tracing::debug!(
            "{} of {} service(s) match '{}'",
            matched.len(),
            services.len(),
            pattern
        );

        let mut removed = Vec::with_capacity(matched.len());
        for service in matched {
            if let Err(e) = self.service_remove(&service.id).await {
                return Err(ClientError::PartialDelete {
                    removed,
                    failed_id: service.id,
                    source: Box::new(e),
                });
            }
            tracing::info!("Removed service {} ({})", service.name(), service.id);
            removed.push(service);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use sg_api::{Annotations, ResourceKind, ServiceSpec};

    use crate::context::CallContext;

    fn service(id: &str, name: &str) -> Service {
        Service {
            id: id.to_string(),
            spec: ServiceSpec {
                annotations: Annotations {
                    name: name.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn task(id: &str, service_id: &str) -> Task {
        Task {
            id: id.to_string(),
            service_id: service_id.to_string(),
            ..Default::default()
        }
    }

    /// In-memory collaborator recording what it was asked
    #[derive(Default)]
    struct FakeApi {
        services: Vec<Service>,
        tasks: Vec<Task>,
        nodes: Vec<Node>,
        networks: Vec<Network>,
        seen_options: Mutex<Vec<ListOptions>>,
        list_calls: AtomicUsize,
        remove_calls: AtomicUsize,
        removed_ids: Mutex<Vec<String>>,
        /// 1-based removal that fails
        fail_remove_at: Option<usize>,
        /// 1-based removal that never finishes
        hang_remove_at: Option<usize>,
    }

    impl FakeApi {
        fn with_services(services: Vec<Service>) -> Self {
            Self {
                services,
                ..Default::default()
            }
        }

        fn record(&self, options: ListOptions) {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_options.lock().unwrap().push(options);
        }

        fn last_options(&self) -> ListOptions {
            self.seen_options.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl DockerApi for FakeApi {
        async fn ping(&self) -> Result<String, ClientError> {
            Ok("OK".to_string())
        }

        async fn service_list(&self, options: ListOptions) -> Result<Vec<Service>, ClientError> {
            self.record(options);
            Ok(self.services.clone())
        }

        async fn service_remove(&self, service_id: &str) -> Result<(), ClientError> {
            let n = self.remove_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.hang_remove_at == Some(n) {
                std::future::pending::<()>().await;
            }
            if self.fail_remove_at == Some(n) {
                return Err(ClientError::Api {
                    status: 500,
                    message: format!("rpc error: cannot remove {}", service_id),
                });
            }
            self.removed_ids.lock().unwrap().push(service_id.to_string());
            Ok(())
        }

        async fn task_list(&self, options: ListOptions) -> Result<Vec<Task>, ClientError> {
            self.record(options);
            Ok(self.tasks.clone())
        }

        async fn node_list(&self, options: ListOptions) -> Result<Vec<Node>, ClientError> {
            self.record(options);
            Ok(self.nodes.clone())
        }

        async fn node_remove(&self, _node_id: &str, _force: bool) -> Result<(), ClientError> {
            Ok(())
        }

        async fn network_list(&self, options: ListOptions) -> Result<Vec<Network>, ClientError> {
            self.record(options);
            Ok(self.networks.clone())
        }

        async fn network_remove(&self, _network_id: &str) -> Result<(), ClientError> {
            Ok(())
        }

        async fn container_list(
            &self,
            options: ListOptions,
        ) -> Result<Vec<Container>, ClientError> {
            self.record(options);
            Ok(Vec::new())
        }

        async fn container_remove(
            &self,
            _container_id: &str,
            _force: bool,
        ) -> Result<(), ClientError> {
            Ok(())
        }
    }

    fn handle(api: FakeApi) -> ClientHandle<FakeApi> {
        ClientHandle::from_api(api, CallContext::new())
    }

    #[test]
    fn test_list_options_empty_filter_is_unfiltered() {
        let options = list_options(Vec::<(String, String)>::new());
        assert_eq!(options, ListOptions::default());
        assert_eq!(options.query(), None);
    }

    #[tokio::test]
    async fn test_list_services_forwards_duplicate_keys() {
        let handle = handle(FakeApi::with_services(vec![service("s1", "web")]));

        let services = handle
            .list_services([("label", "tier=front"), ("label", "env=prod"), ("name", "web")])
            .await
            .unwrap();
        assert_eq!(services.len(), 1);

        let options = handle.api().last_options();
        assert_eq!(options.filters.get("label"), vec!["env=prod", "tier=front"]);
        assert_eq!(options.filters.get("name"), vec!["web"]);
        assert_eq!(options.filters.len(), 3);
    }

    #[tokio::test]
    async fn test_list_without_filter_requests_unfiltered_listing() {
        let handle = handle(FakeApi::default());

        handle.list_tasks(Vec::<(&str, &str)>::new()).await.unwrap();
        handle.list_nodes([("role", "manager")]).await.unwrap();

        let seen = handle.api().seen_options.lock().unwrap().clone();
        assert_eq!(seen[0], ListOptions::default());
        assert!(seen[1].filters.contains("role", "manager"));
    }

    #[tokio::test]
    async fn test_find_by_id_is_exact_and_local() {
        let api = FakeApi::with_services(vec![
            service("abc", "web"),
            service("ABC", "api"),
            service("abc", "duplicate"),
        ]);
        let handle = handle(api);

        let services = handle.list_services(Vec::<(&str, &str)>::new()).await.unwrap();

        assert_eq!(find_by_id("abc", &services).unwrap().name(), "web");
        assert_eq!(find_by_id("ABC", &services).unwrap().name(), "api");

        let err = find_by_id("ab", &services).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No service with ID ab found");

        assert_eq!(handle.api().list_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_find_by_id_reports_kind() {
        let nodes = vec![Node {
            id: "n1".to_string(),
            ..Default::default()
        }];
        assert!(find_by_id("n1", &nodes).is_ok());

        match find_by_id::<Network>("net1", &[]) {
            Err(ClientError::NotFound { kind, id }) => {
                assert_eq!(kind, ResourceKind::Network);
                assert_eq!(id, "net1");
            }
            other => panic!("expected not-found, got {:?}", other),
        }
    }

    #[test]
    fn test_find_services_by_name() {
        let services = vec![
            service("1", "web-frontend"),
            service("2", "db"),
            service("3", "web-backend"),
        ];

        let matched = find_services_by_name("^web-", &services).unwrap();
        let ids: Vec<&str> = matched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        // unanchored
        assert_eq!(find_services_by_name("end$", &services).unwrap().len(), 2);

        assert!(find_services_by_name("^cache", &services).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_pattern_is_an_error() {
        let services = vec![service("1", "web")];
        let err = find_services_by_name("web(", &services).unwrap_err();
        assert!(matches!(err, ClientError::Pattern(_)));
    }

    #[test]
    fn test_find_tasks_by_service_id() {
        let tasks = vec![
            task("t1", "svc-a"),
            task("t2", "svc-b"),
            task("t3", "svc-a"),
        ];

        let found = find_tasks_by_service_id("svc-a", &tasks);
        let ids: Vec<&str> = found.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);

        assert!(find_tasks_by_service_id("svc-A", &tasks).is_empty());
    }

    #[tokio::test]
    async fn test_delete_matching_removes_only_matches() {
        let handle = handle(FakeApi::with_services(vec![
            service("1", "web-a"),
            service("2", "db"),
            service("3", "web-b"),
        ]));

        let removed = handle.delete_services_matching("^web").await.unwrap();
        let ids: Vec<&str> = removed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        assert_eq!(
            *handle.api().removed_ids.lock().unwrap(),
            vec!["1".to_string(), "3".to_string()]
        );
        assert_eq!(handle.api().last_options(), ListOptions::default());
    }

    #[tokio::test]
    async fn test_delete_matching_stops_at_first_failure() {
        let api = FakeApi {
            fail_remove_at: Some(3),
            ..FakeApi::with_services((1..=5).map(|i| service(&i.to_string(), "web")).collect())
        };
        let handle = handle(api);

        let err = handle.delete_services_matching("web").await.unwrap_err();
        match &err {
            ClientError::PartialDelete {
                removed,
                failed_id,
                source,
            } => {
                let ids: Vec<&str> = removed.iter().map(|s| s.id.as_str()).collect();
                assert_eq!(ids, vec!["1", "2"]);
                assert_eq!(failed_id, "3");
                assert!(matches!(**source, ClientError::Api { status: 500, .. }));
            }
            other => panic!("expected partial delete, got {:?}", other),
        }

        assert_eq!(handle.api().remove_calls.load(Ordering::SeqCst), 3);
        assert_eq!(handle.api().removed_ids.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_matching_rejects_bad_pattern_before_io() {
        let handle = handle(FakeApi::with_services(vec![service("1", "web")]));

        let err = handle.delete_services_matching("[web").await.unwrap_err();
        assert!(matches!(err, ClientError::Pattern(_)));
        assert_eq!(handle.api().list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(handle.api().remove_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_context_blocks_calls() {
        let handle = handle(FakeApi::with_services(vec![service("1", "web")]));
        handle.cancel();

        let err = handle.list_services([("name", "web")]).await.unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(handle.api().list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_delete_reports_progress() {
        let api = FakeApi {
            hang_remove_at: Some(2),
            ..FakeApi::with_services(vec![
                service("1", "web"),
                service("2", "web"),
                service("3", "web"),
            ])
        };
        let handle = std::sync::Arc::new(handle(api));

        let task = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.delete_services_matching("web").await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        let err = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.removed().len(), 1);
        assert_eq!(handle.api().remove_calls.load(Ordering::SeqCst), 2);
    }
}
