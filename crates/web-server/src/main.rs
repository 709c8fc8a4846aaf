// Entry point for `cargo run -p web-server`; the root binary's `serve`
// subcommand does the same.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_default_config()?;
    let _log_guard = configuration::init_tracing(&config.logging)?;
    let addr = config.server.socket_addr()?;
    web_server::run_server(config, addr).await
}
