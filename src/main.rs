use std::net::TcpListener;

use anyhow::Context;
use env_logger::Env;
use raise_scout::{configuration::get_configuration, startup::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    std::fs::create_dir_all(&configuration.output.directory).with_context(|| {
        format!(
            "Failed to create output directory {}",
            configuration.output.directory.display()
        )
    })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind {}", address))?;
    log::info!("Listening on {}", address);

    run(listener, configuration)?.await?;
    Ok(())
}
