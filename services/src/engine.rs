//! Seam between the service layer and the Docker daemon.
//!
//! `DockerEngine` exposes exactly the engine calls the API forwards to.
//! Inspect results leave this module as `EngineRecord`s so the HTTP layer
//! forwards the engine's JSON untouched.

use async_trait::async_trait;
use bollard::Docker;
use bollard::errors::Error as DockerError;
use bollard::models::{ContainerCreateBody, VolumeCreateOptions};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, InspectContainerOptions, InspectNetworkOptions,
    KillContainerOptions, ListContainersOptions, ListImagesOptions, ListNetworksOptions,
    ListVolumesOptions, RemoveContainerOptions, RemoveImageOptions, RemoveVolumeOptions,
    RestartContainerOptions, StartContainerOptions, StopContainerOptions,
};
use dockpanel_shared::EngineRecord;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Docker(#[from] DockerError),
    #[error("failed to decode engine record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Volume names plus whatever warnings the engine attached to the listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeListing {
    pub names: Vec<String>,
    pub warnings: Vec<String>,
}

#[async_trait]
pub trait DockerEngine: Send + Sync {
    /// Ids of every container, stopped ones included
    async fn list_container_ids(&self) -> Result<Vec<String>, EngineError>;
    async fn inspect_container(&self, id: &str) -> Result<EngineRecord, EngineError>;
    /// Returns the id of the new container
    async fn create_container(
        &self,
        name: &str,
        body: ContainerCreateBody,
    ) -> Result<String, EngineError>;
    async fn start_container(&self, id: &str) -> Result<(), EngineError>;
    async fn stop_container(&self, id: &str) -> Result<(), EngineError>;
    async fn kill_container(&self, id: &str) -> Result<(), EngineError>;
    async fn restart_container(&self, id: &str) -> Result<(), EngineError>;
    async fn pause_container(&self, id: &str) -> Result<(), EngineError>;
    async fn unpause_container(&self, id: &str) -> Result<(), EngineError>;
    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;

    async fn list_image_ids(&self) -> Result<Vec<String>, EngineError>;
    async fn inspect_image(&self, id: &str) -> Result<EngineRecord, EngineError>;
    async fn remove_image(&self, id: &str) -> Result<(), EngineError>;

    async fn list_network_ids(&self) -> Result<Vec<String>, EngineError>;
    async fn inspect_network(&self, id: &str) -> Result<EngineRecord, EngineError>;

    async fn list_volumes(&self) -> Result<VolumeListing, EngineError>;
    async fn inspect_volume(&self, name: &str) -> Result<EngineRecord, EngineError>;
    /// Returns the name the engine gave the volume
    async fn create_volume(&self, options: VolumeCreateOptions) -> Result<String, EngineError>;
    async fn remove_volume(&self, name: &str) -> Result<(), EngineError>;
}

fn to_record<T: Serialize>(value: T) -> Result<EngineRecord, EngineError> {
    Ok(serde_json::to_value(value)?)
}

#[async_trait]
impl DockerEngine for Docker {
    async fn list_container_ids(&self) -> Result<Vec<String>, EngineError> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let containers = Docker::list_containers(self, Some(options)).await?;
        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<EngineRecord, EngineError> {
        let inspect = Docker::inspect_container(self, id, None::<InspectContainerOptions>).await?;
        to_record(inspect)
    }

    async fn create_container(
        &self,
        name: &str,
        body: ContainerCreateBody,
    ) -> Result<String, EngineError> {
        let options = CreateContainerOptionsBuilder::default().name(name).build();
        let created = Docker::create_container(self, Some(options), body).await?;
        Ok(created.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::start_container(self, id, None::<StartContainerOptions>).await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::stop_container(self, id, None::<StopContainerOptions>).await?;
        Ok(())
    }

    async fn kill_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::kill_container(self, id, None::<KillContainerOptions>).await?;
        Ok(())
    }

    async fn restart_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::restart_container(self, id, None::<RestartContainerOptions>).await?;
        Ok(())
    }

    async fn pause_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::pause_container(self, id).await?;
        Ok(())
    }

    async fn unpause_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::unpause_container(self, id).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        Docker::remove_container(self, id, None::<RemoveContainerOptions>).await?;
        Ok(())
    }

    async fn list_image_ids(&self) -> Result<Vec<String>, EngineError> {
        let images = Docker::list_images(self, Some(ListImagesOptions::default())).await?;
        Ok(images.into_iter().map(|image| image.id).collect())
    }

    async fn inspect_image(&self, id: &str) -> Result<EngineRecord, EngineError> {
        let inspect = Docker::inspect_image(self, id).await?;
        to_record(inspect)
    }

    async fn remove_image(&self, id: &str) -> Result<(), EngineError> {
        let deleted = Docker::remove_image(self, id, None::<RemoveImageOptions>, None).await?;
        log::debug!("Engine removed {} image layers/tags for {}", deleted.len(), id);
        Ok(())
    }

    async fn list_network_ids(&self) -> Result<Vec<String>, EngineError> {
        let networks = Docker::list_networks(self, None::<ListNetworksOptions>).await?;
        Ok(networks.into_iter().filter_map(|n| n.id).collect())
    }

    async fn inspect_network(&self, id: &str) -> Result<EngineRecord, EngineError> {
        let inspect = Docker::inspect_network(self, id, None::<InspectNetworkOptions>).await?;
        to_record(inspect)
    }

    async fn list_volumes(&self) -> Result<VolumeListing, EngineError> {
        let response = Docker::list_volumes(self, None::<ListVolumesOptions>).await?;
        Ok(VolumeListing {
            names: response
                .volumes
                .unwrap_or_default()
                .into_iter()
                .map(|v| v.name)
                .collect(),
            warnings: response.warnings.unwrap_or_default(),
        })
    }

    async fn inspect_volume(&self, name: &str) -> Result<EngineRecord, EngineError> {
        let inspect = Docker::inspect_volume(self, name).await?;
        to_record(inspect)
    }

    async fn create_volume(&self, options: VolumeCreateOptions) -> Result<String, EngineError> {
        let volume = Docker::create_volume(self, options).await?;
        Ok(volume.name)
    }

    async fn remove_volume(&self, name: &str) -> Result<(), EngineError> {
        Docker::remove_volume(self, name, None::<RemoveVolumeOptions>).await?;
        Ok(())
    }
}
