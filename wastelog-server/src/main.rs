//! Binary entry point for the wastelog API server.

use wastelog_server::config::ServerConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env()?;
    wastelog_server::run_server(config).await
}
