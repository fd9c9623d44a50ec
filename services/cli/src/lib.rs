mod cli;
mod commands;
mod render;
mod terminal;

use civic_sense::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
