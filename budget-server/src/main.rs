#[macro_use]
extern crate tracing;
extern crate serde_json;

use std::error::Error;
use std::path::PathBuf;

use actix_web::error::JsonPayloadError;
use actix_web::web::Data;
use actix_web::{web, App};
use actix_web::{HttpResponse, HttpServer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use budget_lib::config::Config;
use budget_lib::recommendation::{self, RecurringTransactionRecommender, TagRecommender};
use budget_lib::user::TrustedHeaderAuth;

const SERVICE_NAME: &str = "budget-server";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    let tracing_guard = tracing::subscriber::set_default(subscriber);
    info!("tracing initialized");

    let config = match get_config_file() {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            warn!("Config file not found, reading config from environment");
            Config::from_env()?
        }
    };

    match &config.honeycomb_api_key {
        Some(api_key) => {
            let telemetry_layer =
                budget_lib::tracing::create_opentelemetry_layer(SERVICE_NAME, api_key)?;
            let subscriber = registry::Registry::default()
                .with(LevelFilter::INFO)
                .with(tracing_subscriber::fmt::Layer::default())
                .with(telemetry_layer);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = registry::Registry::default()
                .with(LevelFilter::INFO)
                .with(tracing_subscriber::fmt::Layer::default());
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    drop(tracing_guard);

    let repos =
        budget_repo::sqlx_repo::create_repos(config.database_url, config.max_pool_size).await?;

    let tag_recommender = Data::new(TagRecommender::new(
        repos.tag_candidates.clone(),
        config.recommendation.clone(),
    ));
    let recurring_recommender = Data::new(RecurringTransactionRecommender::new(
        repos.recurring_candidates.clone(),
        config.recommendation.clone(),
    ));
    let auth = TrustedHeaderAuth::new(&config.user_header)?;
    info!(user_header = %config.user_header, "Trusting upstream user header");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(repos.transaction_repo.clone()))
            .app_data(tag_recommender.clone())
            .app_data(recurring_recommender.clone())
            .wrap(budget_lib::tracing::create_middleware())
            .service(recommendation::recommendation_service().wrap(auth.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, req| {
                error!(req_path = req.path(), %err);
                match err {
                    JsonPayloadError::Deserialize(deserialize_err) => {
                        let error_body = serde_json::json!({
                            "error": "Unable to parse JSON payload",
                            "detail": format!("{}", deserialize_err),
                        });
                        actix_web::error::InternalError::from_response(
                            deserialize_err,
                            HttpResponse::BadRequest()
                                .content_type("application/json")
                                .body(error_body.to_string()),
                        )
                        .into()
                    }
                    _ => err.into(),
                }
            }))
    });
    server.bind("0.0.0.0:8000")?.run().await?;

    Ok(())
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}
