//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a `tokio-tungstenite` client to
//! verify frames actually flow over a socket, including the frame-kind
//! mapping the protocol layer relies on (binary surfaces, close maps to
//! `Closed`).

use codeduel_transport::{InboundFrame, WsListener};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Binds on an OS-assigned port and connects one client; returns both ends.
async fn connected_pair() -> (codeduel_transport::WsConnection, ClientWs) {
    let mut listener = WsListener::bind("127.0.0.1:0").await.expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");

    let server = tokio::spawn(async move { listener.accept().await.expect("should accept") });

    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client should connect");

    (server.await.expect("accept task should complete"), client)
}

#[tokio::test]
async fn test_text_flows_both_ways() {
    let (conn, mut client) = connected_pair().await;
    let (mut sender, mut receiver) = conn.split();

    sender.send_text("hello from server").await.expect("send should succeed");
    let msg = client.next().await.unwrap().unwrap();
    assert_eq!(msg.into_text().unwrap().as_str(), "hello from server");

    client
        .send(Message::Text("hello from client".into()))
        .await
        .unwrap();
    let frame = receiver.recv().await.expect("recv should succeed");
    assert_eq!(frame, InboundFrame::Text("hello from client".into()));
}

#[tokio::test]
async fn test_binary_frame_surfaces_as_binary() {
    let (conn, mut client) = connected_pair().await;
    let (_sender, mut receiver) = conn.split();

    client
        .send(Message::Binary(vec![1, 2, 3].into()))
        .await
        .unwrap();

    let frame = receiver.recv().await.expect("recv should succeed");
    assert_eq!(frame, InboundFrame::Binary);
}

#[tokio::test]
async fn test_client_close_maps_to_closed() {
    let (conn, mut client) = connected_pair().await;
    let (_sender, mut receiver) = conn.split();

    client.close(None).await.unwrap();

    let frame = receiver.recv().await.expect("recv should succeed");
    assert_eq!(frame, InboundFrame::Closed);
}

#[tokio::test]
async fn test_server_close_reaches_client() {
    let (conn, mut client) = connected_pair().await;
    let (mut sender, _receiver) = conn.split();

    sender.close().await.expect("close should succeed");

    let msg = client.next().await.unwrap().unwrap();
    assert!(matches!(msg, Message::Close(_)));
}

#[tokio::test]
async fn test_connection_ids_are_unique() {
    let (a, _client_a) = connected_pair().await;
    let (b, _client_b) = connected_pair().await;
    assert_ne!(a.id(), b.id());
}
