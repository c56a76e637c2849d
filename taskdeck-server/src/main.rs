use std::sync::Arc;

use clap::Parser;
use taskdeck_server::{router, AppState, ServerResult};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "taskdeck-server", about = "In-memory task store")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> ServerResult<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskdeck_server=debug,tower_http=debug")),
        )
        .init();

    let app = router(Arc::new(AppState::default()));

    tracing::info!("Starting task store on {}", args.bind);
    let listener = tokio::net::TcpListener::bind(&args.bind).await.map_err(|e| {
        tracing::error!(%e, addr = %args.bind, "failed to bind");
        e
    })?;
    axum::serve(listener, app).await?;

    Ok(())
}
