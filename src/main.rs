use devnode::{api::Server, config::Config, genesis, state::StateCache, Dispatcher};
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// The main entry point for the node.
///
/// Initializes logging, loads the configuration, provisions the funded
/// accounts and serves JSON-RPC until the listener fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&path)?;
    info!("Node starting with config: {:?}", config);

    let state_cache = StateCache::new();
    let accounts = genesis::provision(&state_cache, &config.accounts).await?;
    for (index, address) in accounts.iter().enumerate() {
        info!("({}) {:?}", index, address);
    }

    let dispatcher = Dispatcher::new(&config, state_cache);
    let server = Server::new(config.api.clone(), dispatcher);
    server.start().await?;

    Ok(())
}
