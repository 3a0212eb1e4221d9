use anyhow::Result;
use ev_charge_planner::{api, config::Config, state::AppState, telemetry};
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    let state = AppState::new(&cfg.prices)?;
    let app = api::router(state, &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!("server binding to 0.0.0.0 - service will be reachable from the network");
    }

    info!(
        %addr,
        bidding_zone = %cfg.prices.bidding_zone,
        timezone = %cfg.prices.timezone,
        "starting EV charge planner"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
