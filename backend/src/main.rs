mod routes;
mod upstream;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use routes::configure_routes;
use std::env;
use upstream::UpstreamClient;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_API_URL: &str = "http://localhost:8000";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    };

    let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let upstream = UpstreamClient::new(&api_url).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid API_URL {:?}: {}", api_url, e),
        )
    })?;
    log::info!("Proxying report requests to {}", api_url);

    let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(upstream.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
