use crate::request_validation::{self, ValidationError};
use dockpanel_services::DockerService;
use dockpanel_shared::{
    ContainerIdRequest, CreateContainerRequest, CreateVolumeRequest, ErrorResponse, HealthStatus,
    ImageIdRequest, MessageResponse, VolumeIdRequest,
};
use actix_web::{error, web, HttpResponse, Responder};
use chrono::Utc;
use std::sync::Arc;

pub struct AppState {
    pub docker_service: Arc<DockerService>,
}

fn bad_request(e: ValidationError) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()))
}

/// Engine details stay in the log; clients get a generic message
fn engine_failure(action: &str, e: anyhow::Error) -> HttpResponse {
    log::error!("Error trying to {}: {:#}", action, e);
    HttpResponse::InternalServerError().json(ErrorResponse::new(format!("Failed to {}", action)))
}

/// Malformed bodies get the same error shape as validation failures
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest()
            .json(ErrorResponse::new(format!("Invalid JSON body: {}", err)));
        error::InternalError::from_response(err, response).into()
    })
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("This is an API for Docker webUI")
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "OK".to_string(),
        timestamp: Utc::now(),
    })
}

/// List all containers with their full inspect data
pub async fn list_containers(state: web::Data<AppState>) -> impl Responder {
    match state.docker_service.list_containers().await {
        Ok(containers) => HttpResponse::Ok().json(containers),
        Err(e) => engine_failure("list containers", e),
    }
}

/// Create and start a container from the web UI form
pub async fn create_container(
    state: web::Data<AppState>,
    body: web::Json<CreateContainerRequest>,
) -> impl Responder {
    log::info!("Received request to create container: {:?}", body.form_data);

    let spec = match request_validation::container_spec(&body) {
        Ok(spec) => spec,
        Err(e) => return bad_request(e),
    };

    match state.docker_service.create_container(&spec).await {
        Ok(container) => HttpResponse::Created().json(container),
        Err(e) => engine_failure("create container", e),
    }
}

pub async fn inspect_container(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let container_id = path.into_inner();

    match state.docker_service.inspect_container(&container_id).await {
        Ok(container) => HttpResponse::Ok().json(container),
        Err(e) => engine_failure("inspect container", e),
    }
}

async fn delete_container_by_id(state: &AppState, container_id: &str) -> HttpResponse {
    match state.docker_service.delete_container(container_id).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Container deleted successfully")),
        Err(e) => engine_failure("delete container", e),
    }
}

/// Delete the container named in the body
pub async fn delete_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    match request_validation::required_id(
        body.container_id.as_deref(),
        ValidationError::MissingContainerId,
    ) {
        Ok(id) => delete_container_by_id(&state, &id).await,
        Err(e) => bad_request(e),
    }
}

/// Delete the container named in the path
pub async fn delete_container_path(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match request_validation::required_id(Some(path.as_str()), ValidationError::MissingContainerId) {
        Ok(id) => delete_container_by_id(&state, &id).await,
        Err(e) => bad_request(e),
    }
}

/// Single-call lifecycle operations addressed by `containerId` in the body
#[derive(Debug, Clone, Copy)]
enum ContainerAction {
    Start,
    Stop,
    Restart,
    Pause,
    Unpause,
    Kill,
}

impl ContainerAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Kill => "kill",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
            Self::Pause => "paused",
            Self::Unpause => "unpaused",
            Self::Kill => "killed",
        }
    }

    async fn apply(self, service: &DockerService, id: &str) -> anyhow::Result<()> {
        match self {
            Self::Start => service.start_container(id).await,
            Self::Stop => service.stop_container(id).await,
            Self::Restart => service.restart_container(id).await,
            Self::Pause => service.pause_container(id).await,
            Self::Unpause => service.unpause_container(id).await,
            Self::Kill => service.kill_container(id).await,
        }
    }
}

async fn run_container_action(
    state: &AppState,
    body: &ContainerIdRequest,
    action: ContainerAction,
) -> HttpResponse {
    let container_id = match request_validation::required_id(
        body.container_id.as_deref(),
        ValidationError::MissingContainerId,
    ) {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };

    match action.apply(&state.docker_service, &container_id).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new(format!(
            "Container {} successfully",
            action.past_tense()
        ))),
        Err(e) => engine_failure(&format!("{} container", action.verb()), e),
    }
}

pub async fn start_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    run_container_action(&state, &body, ContainerAction::Start).await
}

pub async fn stop_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    run_container_action(&state, &body, ContainerAction::Stop).await
}

pub async fn restart_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    run_container_action(&state, &body, ContainerAction::Restart).await
}

pub async fn pause_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    run_container_action(&state, &body, ContainerAction::Pause).await
}

pub async fn unpause_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    run_container_action(&state, &body, ContainerAction::Unpause).await
}

pub async fn kill_container(
    state: web::Data<AppState>,
    body: web::Json<ContainerIdRequest>,
) -> impl Responder {
    run_container_action(&state, &body, ContainerAction::Kill).await
}

/// List all images with their full inspect data
pub async fn list_images(state: web::Data<AppState>) -> impl Responder {
    match state.docker_service.list_images().await {
        Ok(images) => HttpResponse::Ok().json(images),
        Err(e) => engine_failure("list images", e),
    }
}

pub async fn delete_image(
    state: web::Data<AppState>,
    body: web::Json<ImageIdRequest>,
) -> impl Responder {
    let image_id = match request_validation::required_id(
        body.image_id.as_deref(),
        ValidationError::MissingImageId,
    ) {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };

    match state.docker_service.delete_image(&image_id).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Image deleted successfully")),
        Err(e) => engine_failure("delete image", e),
    }
}

pub async fn list_networks(state: web::Data<AppState>) -> impl Responder {
    match state.docker_service.list_networks().await {
        Ok(networks) => HttpResponse::Ok().json(networks),
        Err(e) => engine_failure("list networks", e),
    }
}

pub async fn list_volumes(state: web::Data<AppState>) -> impl Responder {
    match state.docker_service.list_volumes().await {
        Ok(volumes) => HttpResponse::Ok().json(volumes),
        Err(e) => engine_failure("list volumes", e),
    }
}

pub async fn create_volume(
    state: web::Data<AppState>,
    body: web::Json<CreateVolumeRequest>,
) -> impl Responder {
    log::info!("Received request to create volume: {:?}", body);

    let spec = match request_validation::volume_spec(&body) {
        Ok(spec) => spec,
        Err(e) => return bad_request(e),
    };

    match state.docker_service.create_volume(&spec).await {
        Ok(volume) => HttpResponse::Created().json(volume),
        Err(e) => engine_failure("create volume", e),
    }
}

pub async fn delete_volume(
    state: web::Data<AppState>,
    body: web::Json<VolumeIdRequest>,
) -> impl Responder {
    let volume_id = match request_validation::required_id(
        body.volume_id.as_deref(),
        ValidationError::MissingVolumeId,
    ) {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };

    match state.docker_service.delete_volume(&volume_id).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Volume deleted successfully")),
        Err(e) => engine_failure("delete volume", e),
    }
}
