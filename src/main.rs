#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use chessboard_bridge::{
    init_logging, run_console, serve, BoardEndpoint, CellAddress, ConsoleGameClient,
    EndpointConfig, PlayerColor, PositionMap, SessionConfig, SERVER_HOST, SERVER_PORT,
};
#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Wait for the board controller and bridge it to a console game session.
    Serve {
        #[arg(long, help = "Address to listen on (default 0.0.0.0:5000)")]
        bind: Option<String>,
        #[arg(long, value_enum, default_value_t = PlayerColor::White)]
        color: PlayerColor,
        #[arg(long, default_value_t = 1000, help = "Delay before a placed move is committed")]
        confirm_ms: u64,
        #[arg(long, default_value_t = 30, help = "Drop a silent board after this many seconds (0 disables)")]
        idle_timeout_secs: u64,
    },
    /// Print the sensor wiring table.
    Map,
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let map = PositionMap::standard().map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Serve {
            bind,
            color,
            confirm_ms,
            idle_timeout_secs,
        } => {
            let bind = bind.unwrap_or_else(|| format!("{}:{}", SERVER_HOST, SERVER_PORT));
            let config = EndpointConfig {
                session: SessionConfig::with_confirm_delay(Duration::from_millis(confirm_ms)),
                idle_timeout: (idle_timeout_secs > 0).then(|| Duration::from_secs(idle_timeout_secs)),
            };

            let listener = TcpListener::bind(&bind).await?;
            println!("Waiting for the board on {}...", bind);
            let (mut endpoint, handle, events) =
                BoardEndpoint::new(map, config, Arc::new(ConsoleGameClient::new()));

            tokio::select! {
                result = serve(listener, &mut endpoint) => result?,
                result = run_console(handle, events, color) => result?,
            }
        }
        Commands::Map => {
            for cell in CellAddress::all() {
                println!(
                    "{:<9} LED {:>3}  {}",
                    cell.to_string(),
                    map.led_for_cell(cell),
                    map.coordinate_for_cell(cell)
                );
            }
        }
    }
    Ok(())
}
