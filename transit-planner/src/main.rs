use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_planner::mbta::{MbtaClient, MbtaConfig, MockSource};
use transit_planner::planner::{PlannerConfig, TripPlanner};
use transit_planner::web::{AppState, DataSource, create_router};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Read and parse an optional environment variable.
fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, String> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{name} is not valid: {raw:?}")),
        _ => Ok(None),
    }
}

fn data_source() -> Result<DataSource, Box<dyn std::error::Error>> {
    if let Ok(dir) = std::env::var("MOCK_DATA_DIR") {
        let source = MockSource::from_dir(&dir)?;
        info!(%dir, "serving schedules from local documents");
        return Ok(DataSource::Fixtures(source));
    }

    let mut config = match std::env::var("MBTA_API_KEY") {
        Ok(key) if !key.is_empty() => MbtaConfig::new(key),
        _ => {
            warn!("MBTA_API_KEY not set; requests are subject to the anonymous rate limit");
            MbtaConfig::default()
        }
    };
    if let Ok(url) = std::env::var("MBTA_BASE_URL") {
        config = config.with_base_url(url);
    }
    info!(base_url = %config.base_url, "using live schedule API");
    Ok(DataSource::Live(MbtaClient::new(config)?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut planner_config = PlannerConfig::default();
    if let Some(n) = env_parse::<usize>("PLANNER_CONCURRENCY")? {
        planner_config = planner_config.with_concurrency(n);
    }
    if let Some(secs) = env_parse::<u64>("PLANNER_DEADLINE_SECS")? {
        planner_config = planner_config.with_deadline_secs(Some(secs));
    }
    if let Some(tz) = env_parse::<chrono_tz::Tz>("PLANNER_TIMEZONE")? {
        planner_config = planner_config.with_timezone(tz);
    }

    let planner = TripPlanner::new(data_source()?, planner_config);
    let app = create_router(AppState::new(planner));

    let addr: SocketAddr = env_parse("BIND_ADDR")?.unwrap_or(DEFAULT_BIND_ADDR.parse()?);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "transit planner listening");
    info!("endpoints: GET /health, /trip/plan, /stops/nearby, /transfers");

    axum::serve(listener, app).await?;
    Ok(())
}
