mod cli;
mod infra;
mod report;
mod routes;
mod server;

use ghr_impact::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
