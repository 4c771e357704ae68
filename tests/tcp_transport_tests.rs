use std::sync::Arc;

use chessboard_bridge::{
    serve, BoardEndpoint, EndpointConfig, FrameEvent, GameClient, InboundFrame, LedColor,
    LedWire, OutboundFrame, PositionMap, SensorSnapshot, TcpTransport, Transport, UciMove,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

struct AcceptAll;

#[async_trait::async_trait]
impl GameClient for AcceptAll {
    async fn submit_move(&self, _mv: &UciMove) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn frames_split_across_writes_are_reassembled() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let board = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"\n{\"MCP1\": {\"PA\": ").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stream
            .write_all(b"{\"PA0\": 1}}}{\"type\": \"reed_state\", \"event\": \"heartbeat\", \"data\": {}}")
            .await
            .unwrap();
        stream
    });

    let (socket, _) = listener.accept().await?;
    let mut transport = TcpTransport::new(socket);

    let first = transport.recv().await?;
    assert_eq!(first.event, FrameEvent::Unspecified);
    assert_eq!(first.snapshot.count_occupied(), 1);

    let second = transport.recv().await?;
    assert_eq!(second.event, FrameEvent::Heartbeat);
    assert_eq!(second.snapshot, SensorSnapshot::empty());

    drop(board.await?);
    Ok(())
}

#[tokio::test]
async fn malformed_frame_does_not_close_the_connection() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let board = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"{\"MCP1\": {\"PA\": {\"PA0\": 7}}}{\"MCP1\": {\"PA\": {\"PA1\": 1}}}")
            .await
            .unwrap();
        stream
    });

    let (socket, _) = listener.accept().await?;
    let mut transport = TcpTransport::new(socket);
    let frame = transport.recv().await?;
    assert_eq!(frame.snapshot.count_occupied(), 1);

    drop(board.await?);
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("closed"));
    Ok(())
}

#[tokio::test]
async fn responses_are_newline_delimited_json() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let board = tokio::spawn(async move {
        let stream = TcpStream::connect(addr).await.unwrap();
        let mut lines = BufReader::new(stream).lines();
        lines.next_line().await.unwrap().unwrap()
    });

    let (socket, _) = listener.accept().await?;
    let mut transport = TcpTransport::new(socket);
    transport
        .send(OutboundFrame {
            leds: vec![LedWire {
                led: 1,
                color: LedColor::Red,
                blink: false,
            }],
            status: "Ready to play".to_string(),
        })
        .await?;

    let line = board.await?;
    let frame = OutboundFrame::from_slice(line.as_bytes())?;
    assert_eq!(frame.status, "Ready to play");
    assert_eq!(frame.leds[0].color, LedColor::Red);
    Ok(())
}

#[tokio::test]
async fn serve_answers_a_board_and_stops_on_shutdown() -> anyhow::Result<()> {
    let map = PositionMap::standard().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (mut endpoint, handle, _events) =
        BoardEndpoint::new(map.clone(), EndpointConfig::default(), Arc::new(AcceptAll));
    let server = tokio::spawn(async move { serve(listener, &mut endpoint).await });

    let stream = TcpStream::connect(addr).await?;
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let start = SensorSnapshot::starting_position(&map);
    write_half
        .write_all(&InboundFrame::new(FrameEvent::PhaseChange, start).to_bytes())
        .await?;
    let line = lines.next_line().await?.unwrap();
    assert_eq!(OutboundFrame::from_slice(line.as_bytes())?.status, "Ready to play");

    // A second board may connect after the first one leaves.
    drop(write_half);
    assert!(lines.next_line().await?.is_none());
    let mut second = TcpStream::connect(addr).await?;
    second
        .write_all(&InboundFrame::bare(SensorSnapshot::empty()).to_bytes())
        .await?;
    let mut lines = BufReader::new(second).lines();
    let line = lines.next_line().await?.unwrap();
    assert_eq!(
        OutboundFrame::from_slice(line.as_bytes())?.status,
        "Place pieces on the starting ranks"
    );

    handle.shutdown()?;
    server.await??;
    Ok(())
}
