use anyhow::Context;
use chrono::Utc;

use agristock_app::App;
use agristock_infra::{AppConfig, TracingSink};

fn main() -> anyhow::Result<()> {
    agristock_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting agristock");

    let app = App::start(&config, TracingSink).context("failed to start")?;
    let report = app.report(Utc::now()).context("failed to build dashboard report")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    let delivered = app.shutdown();
    tracing::info!(delivered, "agristock stopped");
    Ok(())
}
