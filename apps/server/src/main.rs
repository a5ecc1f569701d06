use anyhow::Context;
use clap::{Parser, Subcommand};
use sanketbani_chats::ServiceCatalog;
use sanketbani_config::load as load_config;
use sanketbani_gateway::{create_router, GatewayState};
use sanketbani_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "sanketbani-backend")]
#[command(about = "SanketBani chat and sign-language conversion backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server (default)
    Serve,
    /// Print the conversion services accepted for each kind of input
    Services,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Services => {
            print_services(&ServiceCatalog::new());
            Ok(())
        }
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting SanketBani backend");

    let config = load_config().context("failed to load configuration")?;

    let services =
        BackendServices::initialise(&config).context("failed to initialise backend services")?;

    let state = GatewayState::new(services.relay.clone(), services.dispatcher.clone());
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(sanketbani_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.shutdown().await;
    info!("backend shut down");
    Ok(())
}

fn print_services(catalog: &ServiceCatalog) {
    println!(
        "{:<8} {:<18} {:<8} {:<10}",
        "Input", "Service", "Result", "Status"
    );
    println!("{}", "-".repeat(46));

    for entry in catalog.entries() {
        let status = if entry.available {
            "available"
        } else {
            "planned"
        };
        println!(
            "{:<8} {:<18} {:<8} {:<10}",
            entry.input, entry.service, entry.result_kind, status
        );
    }
}
