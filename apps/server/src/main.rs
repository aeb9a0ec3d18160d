#![warn(clippy::all, clippy::pedantic)]

use clap::Parser;
use webmon_server::cli::Args;
use webmon_server::error::AppError;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    // Values from .env feed the clap `env` fallbacks below
    dotenvy::dotenv().ok();

    webmon_server::run(Args::parse()).await
}
