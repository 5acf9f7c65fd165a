use anyhow::Result;
use natalis_api::setup;
use natalis_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (_state, app) = setup::initialize_app(&config).await?;

    setup::server::start_server(&config, app).await
}
