#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::reconciler::ResourceReconciler;
    use super::super::types::Outcome;
    use crate::store::{ResourceKind, ResourceStore as _};
    use crate::templates::{PluginContext, plugin_descriptors};
    use crate::testing::{MemoryResourceStore, StoreCall};

    const NAME: &str = "cat-facts-operator-console-plugin";

    fn ctx() -> PluginContext<'static> {
        PluginContext {
            operator_name: "cat-facts-operator",
            version: "v0.0.9",
            image_repository: "quay.io/rymiller/cat-facts-operator-console-plugin",
            namespace: "cats",
        }
    }

    #[tokio::test]
    async fn ensure_creates_when_absent() {
        let store = Arc::new(MemoryResourceStore::new());
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(0);

        let outcome = reconciler.ensure(&desc).await.unwrap();

        assert_eq!(outcome, Outcome::Created);
        assert!(
            store
                .object(ResourceKind::Workload, Some("cats"), NAME)
                .is_some()
        );
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Get(ResourceKind::Workload, NAME.into()),
                StoreCall::Create(ResourceKind::Workload, NAME.into()),
            ]
        );
    }

    #[tokio::test]
    async fn ensure_twice_keeps_one_object_and_no_diff() {
        let store = Arc::new(MemoryResourceStore::new());
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(1);

        assert_eq!(reconciler.ensure(&desc).await.unwrap(), Outcome::Created);
        let first = store
            .object(ResourceKind::Endpoint, Some("cats"), NAME)
            .unwrap();
        assert_eq!(reconciler.ensure(&desc).await.unwrap(), Outcome::Updated);
        let second = store
            .object(ResourceKind::Endpoint, Some("cats"), NAME)
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(first.data, second.data);
        assert_eq!(first.metadata.labels, second.metadata.labels);
        assert_eq!(first.metadata.annotations, second.metadata.annotations);
    }

    #[tokio::test]
    async fn ensure_heals_drift_but_keeps_server_fields() {
        let store = Arc::new(MemoryResourceStore::new());
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(1);

        let mut drifted = desc.desired.clone();
        drifted.metadata.resource_version = Some("7".into());
        drifted.data["spec"]["type"] = json!("NodePort");
        drifted.data["spec"]["clusterIP"] = json!("10.96.0.12");
        drifted.data["status"] = json!({"loadBalancer": {}});
        store.insert(ResourceKind::Endpoint, drifted);

        assert_eq!(reconciler.ensure(&desc).await.unwrap(), Outcome::Updated);

        let healed = store
            .object(ResourceKind::Endpoint, Some("cats"), NAME)
            .unwrap();
        assert_eq!(healed.data["spec"]["type"], "ClusterIP");
        assert_eq!(healed.data["spec"]["clusterIP"], "10.96.0.12");
        assert_eq!(healed.data["status"], json!({"loadBalancer": {}}));
    }

    #[tokio::test]
    async fn ensure_resets_drifted_selector() {
        let store = Arc::new(MemoryResourceStore::new());
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(1);

        let mut drifted = desc.desired.clone();
        drifted.metadata.resource_version = Some("3".into());
        drifted.data["spec"]["selector"] = json!({"app": NAME, "tier": "nonexistent"});
        store.insert(ResourceKind::Endpoint, drifted);

        reconciler.ensure(&desc).await.unwrap();

        let healed = store
            .object(ResourceKind::Endpoint, Some("cats"), NAME)
            .unwrap();
        assert_eq!(healed.data["spec"]["selector"], json!({"app": NAME}));
    }

    #[tokio::test]
    async fn ensure_restores_locked_down_pod_spec() {
        let store = Arc::new(MemoryResourceStore::new());
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(0);

        let mut drifted = desc.desired.clone();
        drifted.metadata.resource_version = Some("5".into());
        drifted.metadata.uid = Some("uid-1".into());
        let pod = &mut drifted.data["spec"]["template"]["spec"];
        pod["hostNetwork"] = json!(true);
        pod["securityContext"]["runAsUser"] = json!(0);
        store.insert(ResourceKind::Workload, drifted);

        assert_eq!(reconciler.ensure(&desc).await.unwrap(), Outcome::Updated);

        let healed = store
            .object(ResourceKind::Workload, Some("cats"), NAME)
            .unwrap();
        let pod = &healed.data["spec"]["template"]["spec"];
        assert!(pod.get("hostNetwork").is_none());
        assert!(pod["securityContext"].get("runAsUser").is_none());
        assert_eq!(pod["securityContext"]["runAsNonRoot"], true);
        assert_eq!(healed.metadata.uid.as_deref(), Some("uid-1"));
        assert_eq!(
            healed.data["spec"],
            desc.desired.data["spec"],
            "workload spec should match the desired shape exactly"
        );
    }

    #[tokio::test]
    async fn cluster_scoped_kind_is_looked_up_without_namespace() {
        let store = Arc::new(MemoryResourceStore::new());
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(2);
        assert_eq!(desc.namespace, None);

        reconciler.ensure(&desc).await.unwrap();
        reconciler.ensure(&desc).await.unwrap();

        assert_eq!(store.len(), 1);
        let listed = store
            .list(ResourceKind::PluginRegistration, None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(
            store
                .object(ResourceKind::PluginRegistration, None, NAME)
                .is_some()
        );
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let store = Arc::new(MemoryResourceStore::new());
        store.fail_on(ResourceKind::Workload);
        let reconciler = ResourceReconciler::new(store.clone());
        let desc = plugin_descriptors(&ctx()).unwrap().remove(0);

        let err = reconciler.ensure(&desc).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.len(), 0);
    }
}
