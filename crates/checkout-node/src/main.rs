use checkout_core::Blockchain;
use checkout_node::{app, constants, AppState};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:3000
    #[arg(long, env = "CHECKOUT_LISTEN", default_value = constants::DEFAULT_LISTEN)]
    listen: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = constants::DEFAULT_LOG_FILTER)]
    log_filter: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)),
        )
        .init();

    let chain = Blockchain::new();
    for block in chain.snapshot() {
        info!(
            previous_hash = block.previous_hash(),
            payload = %block.payload().canonical_json(),
            hash = block.hash(),
            "block {}",
            block.position()
        );
    }

    let app = app(AppState::new(chain));

    let addr: SocketAddr = args.listen.parse()?;
    info!("checkout-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("checkout-node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
}
