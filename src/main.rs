use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taiga_bridge::{
    actions::Actions,
    api::{self, AppState},
    config::Config,
    mcp,
};

#[derive(Parser)]
#[command(name = "taiga-bridge")]
#[command(about = "Taiga as MCP tools and an API-key gated REST action proxy")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /actions/*, /mcp (streamable HTTP) and /openapi.json
    Serve {
        /// Bind address [default: MCP_HOST or 0.0.0.0]
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP [default: PORT or 8000]
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start MCP server via stdio
    Mcp,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taiga_bridge=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // stdout carries the protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);
    if config.api_key.is_none() {
        tracing::warn!("ACTION_PROXY_API_KEY is not set; /actions/* will answer 503");
    }

    let actions = Actions::from_config(&config);
    let app = api::create_router(AppState::new(actions, config));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("taiga-bridge listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { host, port }) => serve(config, host, port).await?,
        Some(Commands::Mcp) => mcp::run_stdio_server(Actions::from_config(&config)).await?,
        None => serve(config, None, None).await?,
    }

    Ok(())
}
