use std::env;

use actix_web::web::{self, Data, JsonConfig, PathConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod database;
pub mod error;
pub mod seed;

pub use campaign::{CampaignBody, CampaignListBody, CreateCampaignBody, UpdateCampaignBody};
pub use error::Error;

use crate::database::{Database, MemoryDatabase, MongoDatabase};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Starts the server on the current thread and blocks until it exits.
pub fn run(seed_data: bool) -> Result<(), Error> {
    actix_web::rt::System::new().block_on(serve(seed_data))
}

async fn serve(seed_data: bool) -> Result<(), Error> {
    let db: Box<dyn Database> = match env::var("MONGODB_URI") {
        Ok(uri) => {
            info!("connecting to db: {}", uri);
            let client = Client::with_uri_str(&uri).await?;
            Box::new(MongoDatabase::new(client.database("campaigns")))
        }
        Err(_) => {
            info!("no MONGODB_URI set, using the in-memory campaign store");
            Box::new(MemoryDatabase::new())
        }
    };

    if seed_data {
        seed::seed(&*db).await?;
    }

    let db = Data::new(db);
    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    info!("listening on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(db.clone())
            .wrap(TracingLogger::default())
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::update_campaign)
            .service(campaign::endpoints::delete_campaign)
            .default_service(web::to(|| async { Error::PathNotFound.error_response() }))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
