use bollard::models::{ContainerCreateBody, HostConfig, PortBinding, VolumeCreateOptions};
use dockpanel_shared::{ContainerSpec, VolumeSpec};
use std::collections::HashMap;

/// Build the engine's container creation body from a validated spec.
///
/// Every port mapping is exposed and bound; mappings that share a container
/// port accumulate their host bindings under the same key.
pub fn container_create_body(spec: &ContainerSpec) -> ContainerCreateBody {
    let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();

    for port in &spec.ports {
        let key = port.port_key();
        exposed_ports.entry(key.clone()).or_default();
        port_bindings
            .entry(key)
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(PortBinding {
                host_ip: None,
                host_port: Some(port.host_port.clone()),
            });
    }

    let host_config = HostConfig {
        port_bindings: Some(port_bindings),
        auto_remove: spec.auto_remove,
        ..Default::default()
    };

    ContainerCreateBody {
        image: Some(spec.image.clone()),
        tty: Some(true),
        cmd: spec.command.clone(),
        exposed_ports: Some(exposed_ports),
        host_config: Some(host_config),
        ..Default::default()
    }
}

pub fn volume_create_options(spec: &VolumeSpec) -> VolumeCreateOptions {
    VolumeCreateOptions {
        name: Some(spec.name.clone()),
        driver: spec.driver.clone(),
        driver_opts: Some(spec.driver_opts.clone()),
        labels: Some(spec.labels.clone()),
        ..Default::default()
    }
}
