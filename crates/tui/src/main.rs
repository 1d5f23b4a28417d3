use finance_tui::{app::App, config, error::Result, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    logging::init(&config)?;
    tracing::info!(base_url = %config.base_url, timezone = %config.timezone, "starting");

    let mut app = App::new(config)?;
    let result = app.run().await;
    if let Err(err) = &result {
        tracing::error!("exited with error: {err}");
    }
    result
}
