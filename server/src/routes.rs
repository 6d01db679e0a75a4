use crate::handlers;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(handlers::json_config())
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))

        // Container endpoints
        .service(
            web::resource("/containers")
                .route(web::get().to(handlers::list_containers))
                .route(web::post().to(handlers::create_container))
                .route(web::delete().to(handlers::delete_container)),
        )
        .route("/containers/start", web::post().to(handlers::start_container))
        .route("/containers/stop", web::post().to(handlers::stop_container))
        .route("/containers/restart", web::post().to(handlers::restart_container))
        .route("/containers/pause", web::post().to(handlers::pause_container))
        .route("/containers/unpause", web::post().to(handlers::unpause_container))
        .route("/containers/kill", web::post().to(handlers::kill_container))
        .service(
            web::resource("/containers/{id}")
                .route(web::get().to(handlers::inspect_container))
                .route(web::delete().to(handlers::delete_container_path)),
        )

        // Image endpoints
        .service(
            web::resource("/images")
                .route(web::get().to(handlers::list_images))
                .route(web::delete().to(handlers::delete_image)),
        )

        // Network endpoints
        .route("/networks", web::get().to(handlers::list_networks))

        // Volume endpoints
        .service(
            web::resource("/volumes")
                .route(web::get().to(handlers::list_volumes))
                .route(web::post().to(handlers::create_volume))
                .route(web::delete().to(handlers::delete_volume)),
        );
}
