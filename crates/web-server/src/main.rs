use anyhow::Context;
use engine::PairsAnalyzer;
use std::net::SocketAddr;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads the configuration, then hands over to the crate's library.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = configuration::load_config()?;
    let _guard = configuration::init_tracing(&config.logging)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("server.host and server.port do not form a socket address")?;
    let analyzer = PairsAnalyzer::from_config(&config)?;

    web_server::run_server(addr, analyzer).await
}
