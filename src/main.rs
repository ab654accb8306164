//! BlocoCheckin dashboard
//!
//! Main application entry point

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use BlocoCheckin::{
    config::Settings,
    gateway::RestGateway,
    state::DashboardSession,
    utils::{helpers::format_kg, logging},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("loading configuration")?;
    settings.validate().context("validating configuration")?;

    // Initialize logging; the guard flushes the file writer on exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", BlocoCheckin::info());

    let gateway = Arc::new(RestGateway::new(&settings.gateway)?);
    let mut session = DashboardSession::new(gateway, &settings);

    match (&settings.admin.email, &settings.admin.password) {
        (Some(email), Some(password)) => {
            if let Err(e) = session.sign_in(email, password).await {
                error!(error = %e, "Sign-in failed");
                return Err(e).context("signing in");
            }
        }
        _ => {
            warn!("No admin credentials configured; reading with the anonymous key");
            session.init().await?;
            if !session.state().is_signed_in() {
                if let Err(e) = session.refresh_all().await {
                    warn!(error = %e, "Anonymous refresh failed");
                }
            }
        }
    }

    if let Some(message) = session.snapshot().blocking_error() {
        error!(message = message, "Initial load failed");
    }

    let stats = session.stats();
    info!(
        registered = stats.total_registered,
        delivered = stats.total_delivered,
        pending = stats.total_pending,
        delivered_today = stats.delivered_today,
        food = %format_kg(stats.total_food_kg),
        attractions = session.snapshot().attractions.len(),
        "Dashboard loaded"
    );
    for slice in stats.unit_chart() {
        info!(unit = %slice.name, count = slice.value, "Registrations by unit");
    }

    if !session.is_watching() {
        session.watch_changes();
    }
    info!("Following changes; press Ctrl-C to stop");
    session
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await;

    info!("BlocoCheckin has been shut down.");
    Ok(())
}
