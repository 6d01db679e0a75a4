pub mod models;

pub use models::{
    EngineRecord, CreateContainerRequest, CreateContainerForm, PortMapping, ContainerSpec,
    ContainerIdRequest, ImageIdRequest, VolumeIdRequest, CreateVolumeRequest, VolumeSpec,
    MessageResponse, ErrorResponse, HealthStatus,
};
