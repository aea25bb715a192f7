mod config;
mod cover_art;
mod error;
mod metadata;
mod processor;
mod relocate;
mod scanner;
mod tags;

use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::Config::default();
    config.prepare()?;

    info!("📁 Scanning {}", config.untagged_dir.display());

    let lookup = metadata::AudnexusClient::new(&config)?;
    let organizer = processor::Organizer::new(config, lookup, tags::ContainerTags);
    organizer.run().await?.log_summary();

    Ok(())
}
