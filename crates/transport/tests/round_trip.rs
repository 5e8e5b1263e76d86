//! Transport adapter against a real local WebSocket endpoint.
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message;

use protocol::{ClientMessage, PlayerId, ServerMessage, ServerMessageKind};

fn text(raw: &str) -> Message {
    Message::Text(raw.to_string())
}

/// One-connection server: answers `PlayerIdRequest` with an
/// out-of-vocabulary frame followed by the real response, ignores
/// everything else.
async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(socket).await.unwrap();
        while let Some(Ok(frame)) = ws.next().await {
            if let Message::Text(raw) = frame
                && raw.contains("PlayerIdRequest")
            {
                ws.send(text(r#"{"MessageType":"ServerMotd","Text":"hi"}"#))
                    .await
                    .unwrap();
                ws.send(text(r#"{"MessageType":"PlayerIdResponse","PlayerId":"p9"}"#))
                    .await
                    .unwrap();
            }
        }
    });
    format!("ws://{addr}")
}

#[tokio::test]
async fn handshake_round_trip_skips_unknown_frames() {
    let url = spawn_server().await;
    let handle = transport::Transport::connect(&url, transport::TransportConfig::default())
        .await
        .unwrap();
    let mut stream = handle.subscribe().await;

    let response = handle
        .send_and_wait(&ClientMessage::PlayerIdRequest, None, None)
        .await
        .unwrap();
    assert_eq!(
        response,
        ServerMessage::PlayerIdResponse {
            player_id: PlayerId::from("p9"),
        }
    );

    // The unknown ServerMotd frame was skipped; the generic stream starts
    // with the real response, delivered exactly once.
    let event = stream.recv().await.unwrap();
    assert_eq!(event, response);
}

#[tokio::test]
async fn timed_out_wait_names_the_expected_response() {
    let url = spawn_server().await;
    let handle = transport::Transport::connect(&url, transport::TransportConfig::default())
        .await
        .unwrap();

    let err = handle
        .send_and_wait(
            &ClientMessage::MapListRequest,
            None,
            Some(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    match err {
        transport::TransportError::Timeout { expected, .. } => {
            assert_eq!(expected, ServerMessageKind::MapListResponse);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn typed_route_fires_for_its_kind_only() {
    let url = spawn_server().await;
    let handle = transport::Transport::connect(&url, transport::TransportConfig::default())
        .await
        .unwrap();
    let mut route = handle
        .on_message_type(ServerMessageKind::PlayerIdResponse)
        .await;

    handle.send(&ClientMessage::PlayerIdRequest).await.unwrap();

    let routed = tokio::time::timeout(Duration::from_secs(5), route.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(routed.kind(), ServerMessageKind::PlayerIdResponse);
}
