mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use chantier_trace::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
