//! In-memory `DockerEngine` that records every call.

use crate::engine::{DockerEngine, EngineError, VolumeListing};
use async_trait::async_trait;
use bollard::errors::Error as DockerError;
use bollard::models::{ContainerCreateBody, VolumeCreateOptions};
use dockpanel_shared::EngineRecord;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingEngine {
    inner: Arc<Mutex<EngineState>>,
}

#[derive(Default)]
struct EngineState {
    containers: BTreeMap<String, EngineRecord>,
    images: BTreeMap<String, EngineRecord>,
    networks: BTreeMap<String, EngineRecord>,
    volumes: BTreeMap<String, EngineRecord>,
    volume_warnings: Vec<String>,
    failing: HashSet<String>,
    calls: Vec<String>,
    created_bodies: Vec<ContainerCreateBody>,
    created_volumes: Vec<VolumeCreateOptions>,
}

fn server_error(message: String) -> EngineError {
    EngineError::Docker(DockerError::DockerResponseServerError {
        status_code: 500,
        message,
    })
}

fn not_found(kind: &str, id: &str) -> EngineError {
    EngineError::Docker(DockerError::DockerResponseServerError {
        status_code: 404,
        message: format!("No such {}: {}", kind, id),
    })
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, id: &str) -> Self {
        self.state()
            .containers
            .insert(id.to_string(), json!({ "Id": id, "Name": format!("/{}", id) }));
        self
    }

    pub fn with_image(self, id: &str) -> Self {
        self.state()
            .images
            .insert(id.to_string(), json!({ "Id": id, "RepoTags": [format!("{}:latest", id)] }));
        self
    }

    pub fn with_network(self, id: &str) -> Self {
        self.state()
            .networks
            .insert(id.to_string(), json!({ "Id": id, "Driver": "bridge" }));
        self
    }

    pub fn with_volume(self, name: &str) -> Self {
        self.state()
            .volumes
            .insert(name.to_string(), json!({ "Name": name, "Driver": "local" }));
        self
    }

    pub fn with_volume_warning(self, warning: &str) -> Self {
        self.state().volume_warnings.push(warning.to_string());
        self
    }

    /// Make every call to `operation` fail, e.g. `"stop_container"`
    pub fn failing(self, operation: &str) -> Self {
        self.state().failing.insert(operation.to_string());
        self
    }

    /// Make only the call to `operation` with argument `arg` fail
    pub fn failing_for(self, operation: &str, arg: &str) -> Self {
        self.state().failing.insert(format!("{}:{}", operation, arg));
        self
    }

    /// Calls in the order they reached the engine, as `operation:arg`
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn created_bodies(&self) -> Vec<ContainerCreateBody> {
        self.state().created_bodies.clone()
    }

    pub fn created_volumes(&self) -> Vec<VolumeCreateOptions> {
        self.state().created_volumes.clone()
    }

    pub fn has_container(&self, id: &str) -> bool {
        self.state().containers.contains_key(id)
    }

    pub fn has_volume(&self, name: &str) -> bool {
        self.state().volumes.contains_key(name)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, operation: &str, arg: &str) -> Result<(), EngineError> {
        let mut state = self.state();
        let call = format!("{}:{}", operation, arg);
        state.calls.push(call.clone());
        if state.failing.contains(operation) || state.failing.contains(&call) {
            return Err(server_error(format!("{} failed", call)));
        }
        Ok(())
    }

    fn lookup(
        &self,
        kind: &str,
        id: &str,
        pick: fn(&EngineState) -> &BTreeMap<String, EngineRecord>,
    ) -> Result<EngineRecord, EngineError> {
        let state = self.state();
        pick(&state)
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(kind, id))
    }

    fn require_container(&self, id: &str) -> Result<(), EngineError> {
        self.lookup("container", id, |s| &s.containers).map(|_| ())
    }
}

#[async_trait]
impl DockerEngine for RecordingEngine {
    async fn list_container_ids(&self) -> Result<Vec<String>, EngineError> {
        self.record("list_containers", "all")?;
        Ok(self.state().containers.keys().cloned().collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<EngineRecord, EngineError> {
        self.record("inspect_container", id)?;
        self.lookup("container", id, |s| &s.containers)
    }

    async fn create_container(
        &self,
        name: &str,
        body: ContainerCreateBody,
    ) -> Result<String, EngineError> {
        self.record("create_container", name)?;
        let mut state = self.state();
        let record = json!({
            "Id": name,
            "Name": format!("/{}", name),
            "Config": { "Image": body.image.clone(), "Tty": body.tty },
        });
        state.containers.insert(name.to_string(), record);
        state.created_bodies.push(body);
        Ok(name.to_string())
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("start_container", id)?;
        self.require_container(id)
    }

    async fn stop_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("stop_container", id)?;
        self.require_container(id)
    }

    async fn kill_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("kill_container", id)?;
        self.require_container(id)
    }

    async fn restart_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("restart_container", id)?;
        self.require_container(id)
    }

    async fn pause_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("pause_container", id)?;
        self.require_container(id)
    }

    async fn unpause_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("unpause_container", id)?;
        self.require_container(id)
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        self.record("remove_container", id)?;
        self.state()
            .containers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("container", id))
    }

    async fn list_image_ids(&self) -> Result<Vec<String>, EngineError> {
        self.record("list_images", "")?;
        Ok(self.state().images.keys().cloned().collect())
    }

    async fn inspect_image(&self, id: &str) -> Result<EngineRecord, EngineError> {
        self.record("inspect_image", id)?;
        self.lookup("image", id, |s| &s.images)
    }

    async fn remove_image(&self, id: &str) -> Result<(), EngineError> {
        self.record("remove_image", id)?;
        self.state()
            .images
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("image", id))
    }

    async fn list_network_ids(&self) -> Result<Vec<String>, EngineError> {
        self.record("list_networks", "")?;
        Ok(self.state().networks.keys().cloned().collect())
    }

    async fn inspect_network(&self, id: &str) -> Result<EngineRecord, EngineError> {
        self.record("inspect_network", id)?;
        self.lookup("network", id, |s| &s.networks)
    }

    async fn list_volumes(&self) -> Result<VolumeListing, EngineError> {
        self.record("list_volumes", "")?;
        let state = self.state();
        Ok(VolumeListing {
            names: state.volumes.keys().cloned().collect(),
            warnings: state.volume_warnings.clone(),
        })
    }

    async fn inspect_volume(&self, name: &str) -> Result<EngineRecord, EngineError> {
        self.record("inspect_volume", name)?;
        self.lookup("volume", name, |s| &s.volumes)
    }

    async fn create_volume(&self, options: VolumeCreateOptions) -> Result<String, EngineError> {
        let name = options.name.clone().unwrap_or_default();
        self.record("create_volume", &name)?;
        let mut state = self.state();
        let record = json!({
            "Name": name,
            "Driver": options.driver.clone().unwrap_or_else(|| "local".to_string()),
            "Labels": options.labels.clone().unwrap_or_default(),
        });
        state.volumes.insert(name.clone(), record);
        state.created_volumes.push(options);
        Ok(name)
    }

    async fn remove_volume(&self, name: &str) -> Result<(), EngineError> {
        self.record("remove_volume", name)?;
        self.state()
            .volumes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found("volume", name))
    }
}
