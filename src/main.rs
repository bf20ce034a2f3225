use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod timekeeping;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::timekeeping::registry::SessionRegistry;
use crate::timekeeping::scan::ScanGuard;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index(registry: Data<SessionRegistry>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "hrm-timekeeping",
        "activeSessions": registry.active_count()
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        late_threshold_minutes = config.late_threshold_minutes,
        early_leave_tolerance_minutes = config.early_leave_tolerance_minutes,
        "Server starting..."
    );

    let pool = init_db(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let limiter = routes::build_limiter(config.rate_protected_per_min)
        .context("Invalid rate limit configuration")?;

    // one registry and scan guard shared by every worker
    let registry = Data::new(SessionRegistry::new(config.session_tick));
    let scan_guard = Data::new(ScanGuard::new(config.scan_debounce));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(registry.clone())
            .app_data(scan_guard.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config_data, &limiter))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
