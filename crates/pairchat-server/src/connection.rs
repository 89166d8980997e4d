//! Accept loop and per-connection handler: upgrade, attach to the lobby,
//! then pump frames both ways until either side goes away.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use pairchat_common::PairchatError;
use pairchat_lobby::{Dispatcher, Disposition};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async_with_config, WebSocketStream};

use crate::config::ServerConfig;
use crate::protocol::{encode_server_frame, parse_client_frame, ServerFrame};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Frames up to this multiple of `max_message_bytes` are read and answered
/// with an error frame; anything larger is refused by the WebSocket layer
/// and the link is dropped.
const TRANSPORT_LIMIT_FACTOR: usize = 4;

fn ws_config(config: &ServerConfig) -> WebSocketConfig {
    let limit = config.max_message_bytes * TRANSPORT_LIMIT_FACTOR;
    let mut ws = WebSocketConfig::default();
    ws.max_message_size = Some(limit);
    ws.max_frame_size = Some(limit);
    ws
}

/// Accept TCP connections forever, upgrading each on its own task.
pub async fn serve(listener: TcpListener, dispatcher: Dispatcher, config: Arc<ServerConfig>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let dispatcher = dispatcher.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    match accept_async_with_config(stream, Some(ws_config(&config))).await {
                        Ok(ws) => handle_connection(ws, addr, dispatcher, &config).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    dispatcher: Dispatcher,
    config: &ServerConfig,
) {
    let (mut sink, mut stream) = ws.split();

    let (tx, mut rx) = mpsc::channel(config.outbound_buffer);
    let id = dispatcher.connected(tx).await;
    tracing::info!(peer = %addr, connection = %id, "Client connected");

    loop {
        tokio::select! {
            // Lobby events → this client's WebSocket
            Some(event) = rx.recv() => {
                if send_frame(&mut sink, &event.into()).await.is_err() {
                    break;
                }
            }

            // This client's WebSocket → lobby
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match parse_client_frame(text.as_str(), config.max_message_bytes) {
                            Ok(event) => {
                                if dispatcher.handle(&id, event).await == Disposition::Close {
                                    let _ = sink.send(Message::Close(None)).await;
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(connection = %id, error = %e, "Rejected frame");
                                let rejected = ServerFrame::Error { message: e.to_string() };
                                if send_frame(&mut sink, &rejected).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!(connection = %id, "Rejected binary frame");
                        let rejected = ServerFrame::Error {
                            message: "binary frames are not supported".into(),
                        };
                        if send_frame(&mut sink, &rejected).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection = %id, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    dispatcher.disconnected(&id).await;
    tracing::info!(peer = %addr, connection = %id, "Client disconnected");
}

/// Send a ServerFrame as a JSON text frame.
async fn send_frame(sink: &mut WsSink, frame: &ServerFrame) -> Result<(), PairchatError> {
    let json = encode_server_frame(frame)?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| PairchatError::WebSocket(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairchat_lobby::{status, Coordinator};
    use serde_json::{json, Value};
    use tokio_tungstenite::connect_async;

    type Client = WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>;

    async fn start_server() -> (SocketAddr, Coordinator) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let coordinator = Coordinator::new();
        let dispatcher = Dispatcher::new(coordinator.clone());
        let config = Arc::new(ServerConfig {
            max_message_bytes: 256,
            ..ServerConfig::default()
        });
        tokio::spawn(serve(listener, dispatcher, config));
        (addr, coordinator)
    }

    async fn connect(addr: SocketAddr) -> Client {
        let (ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        ws
    }

    async fn send(ws: &mut Client, value: Value) {
        ws.send(Message::Text(value.to_string().into())).await.unwrap();
    }

    async fn recv(ws: &mut Client) -> Value {
        loop {
            let frame = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .unwrap();
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn two_clients_are_matched_and_can_chat() {
        let (addr, _) = start_server().await;
        let mut a = connect(addr).await;
        let mut b = connect(addr).await;

        send(&mut a, json!({"type": "join", "name": "alice", "category": "f"})).await;
        assert_eq!(recv(&mut a).await, json!({"type": "status", "text": status::WAITING}));

        send(&mut b, json!({"type": "join", "name": "bob", "category": "m"})).await;
        assert_eq!(
            recv(&mut a).await,
            json!({"type": "matched", "partner_category": "m"})
        );
        assert_eq!(
            recv(&mut b).await,
            json!({"type": "matched", "partner_category": "f"})
        );
        assert_eq!(recv(&mut a).await["text"], status::CONNECTED);
        assert_eq!(recv(&mut b).await["text"], status::CONNECTED);

        send(&mut a, json!({"type": "message", "text": "hi bob"})).await;
        assert_eq!(recv(&mut b).await, json!({"type": "message", "text": "hi bob"}));
    }

    #[tokio::test]
    async fn malformed_frame_gets_error_and_connection_survives() {
        let (addr, _) = start_server().await;
        let mut a = connect(addr).await;

        a.send(Message::Text("{nope".into())).await.unwrap();
        assert_eq!(recv(&mut a).await["type"], "error");

        send(&mut a, json!({"type": "join"})).await;
        assert_eq!(recv(&mut a).await["text"], status::WAITING);
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let (addr, coordinator) = start_server().await;
        let mut a = connect(addr).await;

        let text = "x".repeat(1024);
        send(&mut a, json!({"type": "message", "text": text})).await;
        assert_eq!(recv(&mut a).await["type"], "error");
        assert_eq!(coordinator.snapshot().await.connections, 0);
    }

    #[test]
    fn ws_config_scales_with_message_limit() {
        let config = ServerConfig {
            max_message_bytes: 1000,
            ..ServerConfig::default()
        };
        let ws = ws_config(&config);
        assert_eq!(ws.max_message_size, Some(4000));
        assert_eq!(ws.max_frame_size, Some(4000));
    }

    #[tokio::test]
    async fn frame_beyond_transport_limit_drops_the_link() {
        let (addr, coordinator) = start_server().await;
        let mut a = connect(addr).await;
        send(&mut a, json!({"type": "join"})).await;
        assert_eq!(recv(&mut a).await["text"], status::WAITING);

        let text = "x".repeat(256 * TRANSPORT_LIMIT_FACTOR * 2);
        let _ = a
            .send(Message::Text(json!({"type": "message", "text": text}).to_string().into()))
            .await;

        let frame = tokio::time::timeout(std::time::Duration::from_secs(5), a.next())
            .await
            .expect("timed out waiting for the link to drop");
        assert!(!matches!(frame, Some(Ok(Message::Text(_)))));

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.connections, 0);
        assert_eq!(snapshot.waiting, None);
    }

    #[tokio::test]
    async fn closing_socket_requeues_partner() {
        let (addr, coordinator) = start_server().await;
        let mut a = connect(addr).await;
        let mut b = connect(addr).await;

        send(&mut a, json!({"type": "join"})).await;
        recv(&mut a).await;
        send(&mut b, json!({"type": "join"})).await;
        recv(&mut b).await;
        recv(&mut b).await;

        a.close(None).await.unwrap();
        assert_eq!(recv(&mut b).await["text"], status::PARTNER_DISCONNECTED);

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.connections, 1);
        assert_eq!(snapshot.rooms, 0);
        assert!(snapshot.waiting.is_some());
    }

    #[tokio::test]
    async fn leave_closes_the_socket() {
        let (addr, _) = start_server().await;
        let mut a = connect(addr).await;

        send(&mut a, json!({"type": "join"})).await;
        recv(&mut a).await;
        send(&mut a, json!({"type": "leave"})).await;

        let frame = tokio::time::timeout(std::time::Duration::from_secs(5), a.next())
            .await
            .expect("timed out waiting for close");
        assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
    }
}
