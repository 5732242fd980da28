#[macro_use]
extern crate rocket;

use std::sync::Arc;

use mongodb::Client;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::error::{BackendError, ConfigurationError};
use crate::ledger::HttpLedger;
use crate::route::{mount_api, Services};

pub mod config;
pub mod data;
pub mod error;
pub mod gate;
pub mod guard;
pub mod ledger;
pub mod resp;
pub mod role;
pub mod route;
pub mod status;
pub mod util;
pub mod view;
pub mod workflow;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if let Err(err) = tracing_log::LogTracer::init() {
            eprintln!("Unable to forward log records: {}", err);
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
    let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

    tracing::info!("Using MongoDB database: {}", c.mongodb_db);
    let db = client.database(c.mongodb_db.as_str());

    if let Err(err) = db.list_collection_names(None).await {
        tracing::error!("Unable to connect to MongoDB.");
        return Err(err.into());
    }

    tracing::info!(
        "Using ledger gateway {} (channel {}, chaincode {})",
        c.ledger_url,
        c.ledger_channel,
        c.ledger_chaincode
    );
    let services = Services {
        ledger: Arc::new(HttpLedger::from_config(&c)?),
        directory: Arc::new(db),
        hook: None,
        public_reader: c.public_reader.clone(),
    };

    build(c, services)
}

/// Assembles the server around already constructed collaborators.
pub fn build(c: Config, services: Services) -> Result<Rocket<Build>, BackendError> {
    tracing::info!("Starting HTTP server...");
    let mut r = rocket::build().manage(c).manage(services);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = mount_api(r);

    Ok(r)
}
