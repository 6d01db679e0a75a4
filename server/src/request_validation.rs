use dockpanel_shared::{
    ContainerSpec, CreateContainerRequest, CreateVolumeRequest, PortMapping, VolumeSpec,
};
use serde_json::Value;
use thiserror::Error;

/// Request rejections, each reported to the client as a 400
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image and name are required")]
    MissingImageOrName,
    #[error("Ports should be an array")]
    PortsNotArray,
    #[error("Each port must be an object")]
    PortNotObject,
    #[error("Unsupported port protocol: {0}")]
    UnsupportedProtocol(String),
    #[error("Command could not be parsed")]
    InvalidCommand,
    #[error("Container ID is required")]
    MissingContainerId,
    #[error("Image ID is required")]
    MissingImageId,
    #[error("Volume ID is required")]
    MissingVolumeId,
    #[error("Volume name is required")]
    MissingVolumeName,
}

const PROTOCOLS: [&str; 3] = ["tcp", "udp", "sctp"];

/// Treat absent and blank values alike
fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Ports arrive from HTML forms as strings or from scripts as numbers
fn port_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => present(Some(s.as_str())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Empty strings, `false` and `0` count as "no ports", the way a form leaves them
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Unrecognised values leave the engine default in place
fn auto_remove(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_ports(ports: Option<&Value>) -> Result<Vec<PortMapping>, ValidationError> {
    let entries = match ports {
        None => return Ok(Vec::new()),
        Some(value) if is_blank(value) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ValidationError::PortsNotArray),
    };

    let mut mappings = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.as_object().ok_or(ValidationError::PortNotObject)?;
        let host_port = port_value(entry.get("hostPort"));
        let container_port = port_value(entry.get("containerPort"));

        // Half-filled rows from the form are skipped
        let (Some(host_port), Some(container_port)) = (host_port, container_port) else {
            continue;
        };

        let protocol = entry
            .get("protocol")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .unwrap_or_else(|| "tcp".to_string());
        if !PROTOCOLS.contains(&protocol.as_str()) {
            return Err(ValidationError::UnsupportedProtocol(protocol));
        }

        mappings.push(PortMapping {
            host_port,
            container_port,
            protocol,
        });
    }
    Ok(mappings)
}

pub fn container_spec(request: &CreateContainerRequest) -> Result<ContainerSpec, ValidationError> {
    let form = request.form_data.clone().unwrap_or_default();

    let (Some(image), Some(name)) = (
        present(form.image_name.as_deref()),
        present(form.container_name.as_deref()),
    ) else {
        return Err(ValidationError::MissingImageOrName);
    };

    let ports = parse_ports(form.ports.as_ref())?;

    let command = match present(form.command.as_deref()) {
        Some(line) => {
            Some(shell_words::split(&line).map_err(|_| ValidationError::InvalidCommand)?)
        }
        None => None,
    };

    Ok(ContainerSpec {
        name,
        image,
        ports,
        command,
        auto_remove: auto_remove(form.autoremove.as_ref()),
    })
}

pub fn volume_spec(request: &CreateVolumeRequest) -> Result<VolumeSpec, ValidationError> {
    let name = present(request.name.as_deref()).ok_or(ValidationError::MissingVolumeName)?;

    Ok(VolumeSpec {
        name,
        driver: present(request.driver.as_deref()),
        driver_opts: request.driver_opts.clone().unwrap_or_default(),
        labels: request.labels.clone().unwrap_or_default(),
    })
}

pub fn required_id(id: Option<&str>, missing: ValidationError) -> Result<String, ValidationError> {
    present(id).ok_or(missing)
}
