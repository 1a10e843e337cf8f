mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use crew_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
