use crate::create_options::{container_create_body, volume_create_options};
use crate::engine::DockerEngine;
use anyhow::{Context, Result};
use bollard::Docker;
use dockpanel_shared::{ContainerSpec, EngineRecord, VolumeSpec};
use futures::future::try_join_all;
use std::sync::Arc;

pub struct DockerService {
    engine: Arc<dyn DockerEngine>,
}

impl DockerService {
    pub async fn new() -> Result<Self> {
        // Endpoint order: DOCKER_HOST, then the Desktop socket under $HOME,
        // then bollard's platform default (/var/run/docker.sock on Linux)
        let docker = if let Ok(docker_host) = std::env::var("DOCKER_HOST") {
            log::info!("Using DOCKER_HOST: {}", docker_host);
            // unix:// selects a socket, anything else is treated as http/tcp
            if let Some(socket_path) = docker_host.strip_prefix("unix://") {
                Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
                    .context(format!("Failed to connect to Docker socket: {}", socket_path))?
            } else {
                Docker::connect_with_http(&docker_host, 120, bollard::API_DEFAULT_VERSION)
                    .context(format!("Failed to connect to Docker host: {}", docker_host))?
            }
        } else if let Ok(home) = std::env::var("HOME") {
            let desktop_path = format!("{}/.docker/desktop/docker.sock", home);
            if std::path::Path::new(&desktop_path).exists() {
                log::info!("Connecting to Docker Desktop socket: {}", desktop_path);
                match Docker::connect_with_socket(&desktop_path, 120, bollard::API_DEFAULT_VERSION) {
                    Ok(d) => d,
                    Err(e) => {
                        log::warn!("Failed to connect to Docker Desktop socket ({}), trying default: {}", desktop_path, e);
                        Docker::connect_with_local_defaults()
                            .context("Failed to connect to Docker daemon")?
                    }
                }
            } else {
                log::info!("Using Docker local defaults");
                Docker::connect_with_local_defaults()
                    .context("Failed to connect to Docker daemon")?
            }
        } else {
            log::info!("Using Docker local defaults");
            Docker::connect_with_local_defaults()
                .context("Failed to connect to Docker daemon")?
        };

        let service = Self::with_engine(Arc::new(docker));

        // Fail fast if the daemon is unreachable
        match service.engine.list_container_ids().await {
            Ok(ids) => {
                log::info!("Docker connection successful. Found {} containers on initial connection test", ids.len());
            }
            Err(e) => {
                return Err(anyhow::anyhow!("Failed to connect to Docker daemon: {}. Make sure Docker is running and accessible.", e));
            }
        }

        Ok(service)
    }

    pub fn with_engine(engine: Arc<dyn DockerEngine>) -> Self {
        Self { engine }
    }

    /// Inspect every container, stopped ones included.
    ///
    /// Inspects run concurrently; the first failure aborts the whole batch.
    pub async fn list_containers(&self) -> Result<Vec<EngineRecord>> {
        let ids = self.engine.list_container_ids().await.map_err(|e| {
            log::error!("Error listing containers: {}", e);
            anyhow::anyhow!("Failed to list containers: {}", e)
        })?;

        log::debug!("Docker API returned {} containers", ids.len());

        let containers = try_join_all(ids.iter().map(|id| async move {
            self.engine.inspect_container(id).await.map_err(|e| {
                log::error!("Error inspecting container {}: {}", id, e);
                anyhow::anyhow!("Failed to inspect container {}: {}", id, e)
            })
        }))
        .await?;

        log::info!("Returning {} inspected containers", containers.len());
        Ok(containers)
    }

    pub async fn inspect_container(&self, id: &str) -> Result<EngineRecord> {
        let record = self.engine.inspect_container(id).await.map_err(|e| {
            log::error!("Error inspecting container {}: {}", id, e);
            anyhow::anyhow!("Failed to inspect container {}: {}", id, e)
        })?;
        log::info!("Container {} inspected successfully", id);
        Ok(record)
    }

    pub async fn start_container(&self, id: &str) -> Result<()> {
        self.engine
            .start_container(id)
            .await
            .map_err(|e| {
                log::error!("Error starting container {}: {}", id, e);
                anyhow::anyhow!("Failed to start container {}: {}", id, e)
            })?;
        log::info!("Container {} started successfully", id);
        Ok(())
    }

    pub async fn stop_container(&self, id: &str) -> Result<()> {
        self.engine
            .stop_container(id)
            .await
            .map_err(|e| {
                log::error!("Error stopping container {}: {}", id, e);
                anyhow::anyhow!("Failed to stop container {}: {}", id, e)
            })?;
        log::info!("Container {} stopped successfully", id);
        Ok(())
    }

    pub async fn restart_container(&self, id: &str) -> Result<()> {
        self.engine
            .restart_container(id)
            .await
            .map_err(|e| {
                log::error!("Error restarting container {}: {}", id, e);
                anyhow::anyhow!("Failed to restart container {}: {}", id, e)
            })?;
        log::info!("Container {} restarted successfully", id);
        Ok(())
    }

    pub async fn pause_container(&self, id: &str) -> Result<()> {
        self.engine
            .pause_container(id)
            .await
            .map_err(|e| {
                log::error!("Error pausing container {}: {}", id, e);
                anyhow::anyhow!("Failed to pause container {}: {}", id, e)
            })?;
        log::info!("Container {} paused successfully", id);
        Ok(())
    }

    pub async fn unpause_container(&self, id: &str) -> Result<()> {
        self.engine
            .unpause_container(id)
            .await
            .map_err(|e| {
                log::error!("Error unpausing container {}: {}", id, e);
                anyhow::anyhow!("Failed to unpause container {}: {}", id, e)
            })?;
        log::info!("Container {} unpaused successfully", id);
        Ok(())
    }

    pub async fn kill_container(&self, id: &str) -> Result<()> {
        self.engine
            .kill_container(id)
            .await
            .map_err(|e| {
                log::error!("Error killing container {}: {}", id, e);
                anyhow::anyhow!("Failed to kill container {}: {}", id, e)
            })?;
        log::info!("Container {} killed successfully", id);
        Ok(())
    }

    /// Stop then remove a container. A failed stop (already stopped, say) is
    /// only logged; the removal still happens.
    pub async fn delete_container(&self, id: &str) -> Result<()> {
        if let Err(e) = self.engine.stop_container(id).await {
            log::error!("Error stopping container {}: {}", id, e);
        }

        self.engine
            .remove_container(id)
            .await
            .map_err(|e| {
                log::error!("Error deleting container {}: {}", id, e);
                anyhow::anyhow!("Failed to delete container {}: {}", id, e)
            })?;
        log::info!("Container {} deleted successfully", id);
        Ok(())
    }

    /// Create, start and inspect a container, returning the inspect record
    pub async fn create_container(&self, spec: &ContainerSpec) -> Result<EngineRecord> {
        let body = container_create_body(spec);
        log::debug!("Container creation options for {}: {:?}", spec.name, body);

        let created = async {
            let id = self.engine.create_container(&spec.name, body).await?;
            self.engine.start_container(&id).await?;
            log::info!("Container {} started successfully", spec.name);
            self.engine.inspect_container(&id).await
        }
        .await
        .map_err(|e| {
            log::error!("Error creating container {}: {}", spec.name, e);
            anyhow::anyhow!("Failed to create container {}: {}", spec.name, e)
        })?;

        log::info!("Container {} created and started successfully", spec.name);
        Ok(created)
    }

    pub async fn list_images(&self) -> Result<Vec<EngineRecord>> {
        let ids = self.engine.list_image_ids().await.map_err(|e| {
            log::error!("Error listing images: {}", e);
            anyhow::anyhow!("Failed to list images: {}", e)
        })?;

        let images = try_join_all(ids.iter().map(|id| async move {
            self.engine.inspect_image(id).await.map_err(|e| {
                log::error!("Error inspecting image {}: {}", id, e);
                anyhow::anyhow!("Failed to inspect image {}: {}", id, e)
            })
        }))
        .await?;

        log::info!("Returning {} inspected images", images.len());
        Ok(images)
    }

    pub async fn delete_image(&self, id: &str) -> Result<()> {
        self.engine
            .remove_image(id)
            .await
            .map_err(|e| {
                log::error!("Error deleting image {}: {}", id, e);
                anyhow::anyhow!("Failed to delete image {}: {}", id, e)
            })?;
        log::info!("Image {} deleted successfully", id);
        Ok(())
    }

    pub async fn list_networks(&self) -> Result<Vec<EngineRecord>> {
        let ids = self.engine.list_network_ids().await.map_err(|e| {
            log::error!("Error listing networks: {}", e);
            anyhow::anyhow!("Failed to list networks: {}", e)
        })?;

        let networks = try_join_all(ids.iter().map(|id| async move {
            self.engine.inspect_network(id).await.map_err(|e| {
                log::error!("Error inspecting network {}: {}", id, e);
                anyhow::anyhow!("Failed to inspect network {}: {}", id, e)
            })
        }))
        .await?;

        log::info!("Returning {} inspected networks", networks.len());
        Ok(networks)
    }

    pub async fn list_volumes(&self) -> Result<Vec<EngineRecord>> {
        let listing = self.engine.list_volumes().await.map_err(|e| {
            log::error!("Error listing volumes: {}", e);
            anyhow::anyhow!("Failed to list volumes: {}", e)
        })?;

        if !listing.warnings.is_empty() {
            log::warn!("Warnings: {:?}", listing.warnings);
        }

        let volumes = try_join_all(listing.names.iter().map(|name| async move {
            self.engine.inspect_volume(name).await.map_err(|e| {
                log::error!("Error inspecting volume {}: {}", name, e);
                anyhow::anyhow!("Failed to inspect volume {}: {}", name, e)
            })
        }))
        .await?;

        log::info!("Returning {} inspected volumes", volumes.len());
        Ok(volumes)
    }

    /// Create a volume and return its inspect record
    pub async fn create_volume(&self, spec: &VolumeSpec) -> Result<EngineRecord> {
        let created = async {
            let name = self.engine.create_volume(volume_create_options(spec)).await?;
            log::info!("Volume {} created successfully", name);
            self.engine.inspect_volume(&name).await
        }
        .await
        .map_err(|e| {
            log::error!("Error creating volume {}: {}", spec.name, e);
            anyhow::anyhow!("Failed to create volume {}: {}", spec.name, e)
        })?;

        log::info!("Volume {} created and inspected successfully", spec.name);
        Ok(created)
    }

    pub async fn delete_volume(&self, name: &str) -> Result<()> {
        self.engine
            .remove_volume(name)
            .await
            .map_err(|e| {
                log::error!("Error deleting volume {}: {}", name, e);
                anyhow::anyhow!("Failed to delete volume {}: {}", name, e)
            })?;
        log::info!("Volume {} deleted successfully", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingEngine;
    use dockpanel_shared::PortMapping;
    use std::collections::HashMap;

    fn service(engine: &RecordingEngine) -> DockerService {
        DockerService::with_engine(Arc::new(engine.clone()))
    }

    fn web_spec() -> ContainerSpec {
        ContainerSpec {
            name: "web".to_string(),
            image: "nginx:latest".to_string(),
            ports: vec![PortMapping {
                host_port: "8080".to_string(),
                container_port: "80".to_string(),
                protocol: "tcp".to_string(),
            }],
            command: None,
            auto_remove: None,
        }
    }

    #[tokio::test]
    async fn test_list_containers_inspects_every_container() {
        let engine = RecordingEngine::new().with_container("a").with_container("b");
        let records = service(&engine).list_containers().await.unwrap();

        let ids: Vec<_> = records.iter().map(|r| r["Id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let calls = engine.calls();
        assert_eq!(calls[0], "list_containers:all");
        assert!(calls.contains(&"inspect_container:a".to_string()));
        assert!(calls.contains(&"inspect_container:b".to_string()));
    }

    #[tokio::test]
    async fn test_list_containers_empty() {
        let engine = RecordingEngine::new();
        assert!(service(&engine).list_containers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_inspect_failure_aborts_batch() {
        let engine = RecordingEngine::new()
            .with_container("a")
            .with_container("b")
            .failing_for("inspect_container", "b");

        let err = service(&engine).list_containers().await.unwrap_err();
        assert!(err.to_string().contains("Failed to inspect container b"));
    }

    #[tokio::test]
    async fn test_list_failure_skips_inspects() {
        let engine = RecordingEngine::new()
            .with_container("a")
            .failing("list_containers");

        assert!(service(&engine).list_containers().await.is_err());
        assert_eq!(engine.calls(), vec!["list_containers:all".to_string()]);
    }

    #[tokio::test]
    async fn test_lifecycle_calls_forward_to_engine() {
        let engine = RecordingEngine::new().with_container("a");
        let svc = service(&engine);

        svc.start_container("a").await.unwrap();
        svc.stop_container("a").await.unwrap();
        svc.restart_container("a").await.unwrap();
        svc.pause_container("a").await.unwrap();
        svc.unpause_container("a").await.unwrap();
        svc.kill_container("a").await.unwrap();

        assert_eq!(
            engine.calls(),
            vec![
                "start_container:a",
                "stop_container:a",
                "restart_container:a",
                "pause_container:a",
                "unpause_container:a",
                "kill_container:a",
            ]
        );
    }

    #[tokio::test]
    async fn test_lifecycle_error_propagates() {
        let engine = RecordingEngine::new();
        let err = service(&engine).pause_container("missing").await.unwrap_err();
        assert!(err.to_string().contains("Failed to pause container missing"));
    }

    #[tokio::test]
    async fn test_delete_container_removes_even_when_stop_fails() {
        let engine = RecordingEngine::new()
            .with_container("a")
            .failing("stop_container");

        service(&engine).delete_container("a").await.unwrap();

        assert_eq!(engine.calls(), vec!["stop_container:a", "remove_container:a"]);
        assert!(!engine.has_container("a"));
    }

    #[tokio::test]
    async fn test_delete_container_fails_when_remove_fails() {
        let engine = RecordingEngine::new();
        assert!(service(&engine).delete_container("ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_create_container_creates_starts_and_inspects() {
        let engine = RecordingEngine::new();
        let record = service(&engine).create_container(&web_spec()).await.unwrap();

        assert_eq!(record["Id"], "web");
        assert_eq!(
            engine.calls(),
            vec!["create_container:web", "start_container:web", "inspect_container:web"]
        );
        let body = &engine.created_bodies()[0];
        assert_eq!(body.image.as_deref(), Some("nginx:latest"));
        assert!(body.exposed_ports.as_ref().unwrap().contains_key("80/tcp"));
    }

    #[tokio::test]
    async fn test_create_container_stops_at_failed_start() {
        let engine = RecordingEngine::new().failing("start_container");
        let err = service(&engine).create_container(&web_spec()).await.unwrap_err();

        assert!(err.to_string().contains("Failed to create container web"));
        assert_eq!(engine.calls(), vec!["create_container:web", "start_container:web"]);
    }

    #[tokio::test]
    async fn test_images_list_and_delete() {
        let engine = RecordingEngine::new().with_image("sha256:1").with_image("sha256:2");
        let svc = service(&engine);

        assert_eq!(svc.list_images().await.unwrap().len(), 2);
        svc.delete_image("sha256:1").await.unwrap();
        assert_eq!(svc.list_images().await.unwrap().len(), 1);
        assert!(svc.delete_image("sha256:1").await.is_err());
    }

    #[tokio::test]
    async fn test_networks_are_inspected() {
        let engine = RecordingEngine::new().with_network("bridge").with_network("host");
        let records = service(&engine).list_networks().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(engine.calls().contains(&"inspect_network:host".to_string()));
    }

    #[tokio::test]
    async fn test_volume_warnings_do_not_fail_listing() {
        let engine = RecordingEngine::new()
            .with_volume("data")
            .with_volume_warning("volume driver is slow");
        let records = service(&engine).list_volumes().await.unwrap();
        assert_eq!(records[0]["Name"], "data");
    }

    #[tokio::test]
    async fn test_create_volume_returns_inspect_record() {
        let engine = RecordingEngine::new();
        let spec = VolumeSpec {
            name: "data".to_string(),
            driver: Some("local".to_string()),
            driver_opts: HashMap::from([("type".to_string(), "tmpfs".to_string())]),
            labels: HashMap::from([("app".to_string(), "web".to_string())]),
        };

        let record = service(&engine).create_volume(&spec).await.unwrap();

        assert_eq!(record["Name"], "data");
        assert_eq!(record["Labels"]["app"], "web");
        assert_eq!(engine.calls(), vec!["create_volume:data", "inspect_volume:data"]);

        let sent = &engine.created_volumes()[0];
        assert_eq!(sent.name.as_deref(), Some("data"));
        assert_eq!(sent.driver.as_deref(), Some("local"));
        assert_eq!(sent.driver_opts.as_ref().unwrap()["type"], "tmpfs");
        assert_eq!(sent.labels.as_ref().unwrap()["app"], "web");
    }

    #[tokio::test]
    async fn test_delete_volume() {
        let engine = RecordingEngine::new().with_volume("data");
        let svc = service(&engine);
        svc.delete_volume("data").await.unwrap();
        assert!(!engine.has_volume("data"));
        assert!(svc.delete_volume("data").await.is_err());
    }
}
