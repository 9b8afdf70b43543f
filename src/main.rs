use std::path::PathBuf;

use akkichat::{
    BANNER,
    config::{AkkiConfig, CONFIG_NAME},
    config_summary,
    error::AkkiError,
    gate,
    router::RouterBuilder,
    services::anthropic::AnthropicClient,
    state::AppState,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt::time::ChronoLocal, layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser, Debug)]
#[command(version, about = "Signed relay to the AkkiAI chat model")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = CONFIG_NAME)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the hash a client must send along with MESSAGE
    Sign { message: String },
    /// Send one message to the model and print the reply
    Ping {
        #[arg(default_value = "Hello, Claude")]
        message: String,
    },
}

fn init_logging(config: &AkkiConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy()
    };
    let timer = ChronoLocal::new("%H:%M:%S%.3f".to_string());
    let stdout = tracing_subscriber::fmt::layer()
        .with_timer(timer.to_owned())
        .with_filter(filter());
    let registry = tracing_subscriber::registry().with(stdout);
    let Some(log_dir) = config.log_dir.as_ref() else {
        registry.init();
        return None;
    };
    let file_appender = tracing_appender::rolling::daily(log_dir, "akkichat.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_timer(timer)
        .with_filter(filter());
    registry.with(file).init();
    Some(guard)
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("Shutdown signal received");
    state.shutdown.cancel();
}

async fn serve(config: AkkiConfig) -> Result<(), AkkiError> {
    println!("{}", *BANNER);
    println!("{}", config_summary(&config));
    let addr = config.address();
    let state = AppState::new(config)?;
    if !state.llm.has_key() {
        warn!("Anthropic API key is not set, /chat will fail until it is configured");
    }
    let app = RouterBuilder::new(state.to_owned())
        .with_default_setup()
        .build();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(state))
    .await?;
    Ok(())
}

async fn ping(config: AkkiConfig, message: String) -> Result<(), AkkiError> {
    let client = AnthropicClient::new(&config)?;
    let reply = client.complete(&message).await?;
    println!("{reply}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AkkiError> {
    #[cfg(windows)]
    {
        let _ = enable_ansi_support::enable_ansi_support();
    }
    let args = Args::parse();
    let config = AkkiConfig::load(&args.config)?;
    let _guard = init_logging(&config);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Sign { message } => {
            println!("{}", gate::sign(&message, &config.secret_key)?);
            Ok(())
        }
        Command::Ping { message } => ping(config, message).await,
    }
}
