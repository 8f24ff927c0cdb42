use std::sync::Arc;

use thermoguard_engine::configs::Settings;
use thermoguard_engine::services::ClimateEngine;
use time::OffsetDateTime;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() {
    let settings = Arc::new(Settings::new().expect("Failed to load settings."));

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    let (engine, mut commands) = ClimateEngine::new(&settings);
    let engine = Arc::new(engine);

    // External dispatcher boundary: commands are logged until a transport is
    // attached to the channel.
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            tracing::info!(
                room_id = command.room_id,
                command_id = %command.id,
                target = ?command.target_status,
                "Dispatching AC command"
            );
        }
    });

    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    tracing::debug!(seq = event.seq, kind = event.payload.kind(), "Event published")
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event logger lagged behind the bus")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tracing::info!(
        tick_interval_secs = settings.control.tick_interval_secs,
        "Climate engine running"
    );

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
        settings.control.tick_interval_secs,
    ));
    loop {
        ticker.tick().await;
        engine.tick(OffsetDateTime::now_utc()).await;
    }
}
