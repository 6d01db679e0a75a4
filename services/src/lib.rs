pub mod create_options;
pub mod docker_service;
pub mod engine;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use docker_service::DockerService;
pub use engine::{DockerEngine, EngineError, VolumeListing};
