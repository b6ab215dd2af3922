#![allow(dead_code)] // not every test file uses every helper

// In-process WebSocket server harness for client integration tests.
//
// Binds a loopback listener; every accepted connection is completed through
// the WebSocket handshake and handed to the test over a channel so the test
// drives the server side of the conversation directly.

use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

pub type ServerWs = WebSocketStream<TcpStream>;

pub async fn start_server() -> (String, mpsc::Receiver<ServerWs>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (conn_tx, conn_rx) = mpsc::channel(8);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            if let Ok(ws) = accept_async(stream).await {
                if conn_tx.send(ws).await.is_err() {
                    break;
                }
            }
        }
    });

    (format!("ws://{}/ws/activities", addr), conn_rx)
}

/// An endpoint nothing is listening on (bound, then released)
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}/ws/activities", addr)
}

pub async fn expect_connection(conn_rx: &mut mpsc::Receiver<ServerWs>) -> ServerWs {
    tokio::time::timeout(Duration::from_secs(5), conn_rx.recv())
        .await
        .expect("timed out waiting for a client connection")
        .expect("server task ended")
}

/// Assert that no connection arrives within `window`
pub async fn expect_no_connection(conn_rx: &mut mpsc::Receiver<ServerWs>, window: Duration) {
    if tokio::time::timeout(window, conn_rx.recv()).await.is_ok() {
        panic!("unexpected client connection");
    }
}

/// Read the next text frame as JSON; None on close or timeout
pub async fn next_text(ws: &mut ServerWs, timeout: Duration) -> Option<Value> {
    let result = tokio::time::timeout(timeout, async {
        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(&text).unwrap());
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
        None
    })
    .await;
    result.ok().flatten()
}

/// Assert that no text frame arrives within `window`
pub async fn expect_no_text(ws: &mut ServerWs, window: Duration) {
    if let Some(frame) = next_text(ws, window).await {
        panic!("unexpected frame from client: {frame}");
    }
}
