//! Headless stand-in for the board controller: connects to a running bridge,
//! sets up the starting position and plays the given moves by toggling reed
//! switches, printing every response it gets back.

use chessboard_bridge::{
    FrameEvent, InboundFrame, OutboundFrame, PositionMap, SensorSnapshot, UciMove,
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, Duration};

/// Pause between simulated hand movements.
const STEP: Duration = Duration::from_millis(300);
/// Long enough for the bridge to confirm a placed move.
const SETTLE: Duration = Duration::from_millis(1500);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <host:port> [uci_move...]", args[0]);
        std::process::exit(1);
    }
    let moves = args[2..]
        .iter()
        .map(|m| m.parse::<UciMove>().map_err(|e| anyhow::anyhow!("{}: {}", m, e)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let map = PositionMap::standard().map_err(|e| anyhow::anyhow!(e))?;
    let stream = TcpStream::connect(&args[1]).await?;
    let (read_half, mut write_half) = stream.into_split();

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match OutboundFrame::from_slice(line.as_bytes()) {
                Ok(frame) => {
                    let summary = json!({
                        "status": frame.status,
                        "leds": frame.leds.len(),
                    });
                    println!("{}", summary);
                }
                Err(e) => eprintln!("Unreadable response: {}", e),
            }
        }
    });

    let mut snapshot = SensorSnapshot::starting_position(&map);
    write_half
        .write_all(&InboundFrame::new(FrameEvent::PhaseChange, snapshot).to_bytes())
        .await?;
    sleep(STEP).await;

    for mv in moves {
        let steps = if snapshot.is_square_occupied(&map, mv.to) {
            vec![(mv.from, false), (mv.to, false), (mv.to, true)]
        } else {
            vec![(mv.from, false), (mv.to, true)]
        };
        for (square, occupied) in steps {
            snapshot = snapshot.with_square(&map, square, occupied);
            write_half
                .write_all(&InboundFrame::new(FrameEvent::ReedChange, snapshot).to_bytes())
                .await?;
            sleep(STEP).await;
        }
        sleep(SETTLE).await;
        write_half
            .write_all(&InboundFrame::new(FrameEvent::Heartbeat, snapshot).to_bytes())
            .await?;
        sleep(STEP).await;
    }

    write_half.shutdown().await?;
    reader.await?;
    Ok(())
}
