use std::sync::Arc;

use anyhow::Result;

pub mod api;
pub mod config;
pub mod database;
pub mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let settings = config::App::load()?;
    logging::debug_file_async(format!("settings.system: {:?}", settings.system));

    let db = database::PostgresSQL::new(&settings.postgresql)?;
    let result = api::start(Arc::new(db.clone()), &settings.system).await;

    if let Err(why) = &result {
        logging::error_file_async(format!("Failed to run the HTTP server because {:?}", why));
    }

    db.close().await;

    result
}
