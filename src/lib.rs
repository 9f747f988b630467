#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, Scope, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::admin::{admin_applications, admin_stats, update_status};
#[cfg(feature = "server")]
use crate::routes::visa_application::{
    create_application, list_applications, save_draft, save_passport_draft, save_traveler_draft,
    show_application, update_application, upload_attachment,
};
#[cfg(feature = "server")]
use crate::routes::{json_config, query_config};

pub mod db;
pub mod domain;
pub mod dto;
pub mod forms;
pub mod i18n;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;
pub mod wizard;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
mod error_conversions;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// The `/api` scope with every JSON endpoint registered.
#[cfg(feature = "server")]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/visa-application")
                .service(save_draft)
                .service(save_passport_draft)
                .service(save_traveler_draft)
                .service(create_application)
                .service(upload_attachment)
                .service(list_applications)
                .service(show_application)
                .service(update_application),
        )
        .service(
            web::scope("/admin")
                .service(admin_applications)
                .service(admin_stats)
                .service(update_status),
        )
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting visa intake API on {}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(api_scope())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
