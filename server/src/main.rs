mod config;
mod handlers;
mod request_validation;
mod routes;

use actix_web::{web, App, HttpServer};
use config::Config;
use handlers::AppState;
use dockpanel_services::DockerService;
use std::sync::Arc;
use actix_cors::Cors;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    log::info!("Starting Docker web UI API on {}", config.bind_address());

    let docker_service = match DockerService::new().await {
        Ok(service) => Arc::new(service),
        Err(e) => {
            log::error!("Failed to initialize Docker service: {:#}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let app_state = web::Data::new(AppState { docker_service });

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_method()
            .allow_any_origin()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
