use crate::{
    backend::ShiftBackend, configuration::Configuration,
    configuration_handler::ConfigurationHandler, error::FixtureError, http::create_app,
    local_shifts::LocalShifts,
};
use chrono::Utc;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod backend;
mod configuration;
mod configuration_handler;
mod error;
mod fixtures;
mod http;
mod local_shifts;
mod schedule;
#[cfg(test)]
mod testutils;
mod types;

async fn seed_shifts(
    backend: &LocalShifts,
    configuration: &ConfigurationHandler,
) -> Result<(), FixtureError> {
    if let Some(path) = configuration.shifts_file() {
        let shifts = fixtures::load_shifts_file(&path).await?;
        backend
            .import_shifts(shifts)
            .map_err(|source| FixtureError::Rejected { path, source })?;
    } else if configuration.example_shifts() {
        let now = Utc::now().with_timezone(&configuration.utc_offset());
        if let Err(err) = backend.import_shifts(fixtures::example_shifts(now)) {
            error!(%err, "Failed to insert example shifts");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let backend = LocalShifts::default();
    if let Err(err) = seed_shifts(&backend, &configuration).await {
        error!(error = ?err, "Failed to load shifts");
        return ExitCode::FAILURE;
    }
    info!(count = backend.shifts().len(), "Shifts loaded");

    let address = format!("{}:{}", configuration.host(), configuration.port());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, "Failed to bind {address}");
            return ExitCode::FAILURE;
        }
    };
    info!("API server is listening at http://{address}");

    let app = create_app(backend, configuration);
    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "Server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
