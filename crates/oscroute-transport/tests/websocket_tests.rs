//! WebSocket transport tests against a live echo server

use bytes::Bytes;
use oscroute_core::TransportState;
use oscroute_test_utils::{
    find_available_port, init_tracing, wait_for, wait_for_count, CallRecorder, TestServer,
    DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT,
};
use oscroute_transport::{
    ConnectOptions, Transport, TransportEvent, WebSocketConfig, WebSocketTransport,
};
use std::sync::Arc;

fn record_events(transport: &WebSocketTransport) -> CallRecorder<TransportEvent> {
    let recorder = CallRecorder::new();
    let cb = recorder.callback();
    transport.register_notify(Arc::new(move |event: TransportEvent| cb(&event)));
    recorder
}

async fn wait_for_status(transport: &WebSocketTransport, status: TransportState) -> bool {
    wait_for(|| transport.status() == status, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT).await
}

#[tokio::test]
async fn test_websocket_open_echo_close() {
    init_tracing();
    let server = TestServer::start().await;

    let transport = WebSocketTransport::new(WebSocketConfig::default()).unwrap();
    let events = record_events(&transport);

    transport
        .open(ConnectOptions::new().host("127.0.0.1").port(server.port()))
        .unwrap();
    assert!(wait_for_status(&transport, TransportState::Open).await, "never opened");

    transport.send(Bytes::from_static(b"\x01\x02\x03\x04")).unwrap();
    assert!(wait_for_count(&events, 2).await, "no echo received");

    match &events.calls()[1] {
        TransportEvent::Data(data, info) => {
            assert_eq!(data.as_ref(), b"\x01\x02\x03\x04");
            assert_eq!(info.address, "127.0.0.1");
            assert_eq!(info.family, "ws");
            assert_eq!(info.port, Some(server.port()));
        }
        other => panic!("expected data, got {:?}", other),
    }

    transport.close().unwrap();
    assert!(wait_for_status(&transport, TransportState::Closed).await, "never closed");
    assert_eq!(events.last(), Some(TransportEvent::Closed));
}

#[tokio::test]
async fn test_websocket_connection_refused() {
    init_tracing();
    let port = find_available_port().await;

    let transport = WebSocketTransport::new(WebSocketConfig::default()).unwrap();
    let events = record_events(&transport);

    transport
        .open(ConnectOptions::new().host("127.0.0.1").port(port))
        .unwrap();
    assert!(wait_for_status(&transport, TransportState::Closed).await);

    let calls = events.calls();
    assert!(matches!(calls.first(), Some(TransportEvent::Errored(_))));
    assert!(!calls.contains(&TransportEvent::Opened));
}

#[tokio::test]
async fn test_websocket_reopen() {
    init_tracing();
    let server = TestServer::start().await;

    let transport = WebSocketTransport::new(WebSocketConfig {
        host: "127.0.0.1".to_string(),
        port: Some(server.port()),
        ..Default::default()
    })
    .unwrap();

    transport.open(ConnectOptions::new()).unwrap();
    assert!(wait_for_status(&transport, TransportState::Open).await);

    transport.open(ConnectOptions::new()).unwrap();
    assert!(wait_for_status(&transport, TransportState::Open).await);

    // The first connection's teardown must not leak into the new one
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(transport.status(), TransportState::Open);
}

#[tokio::test]
async fn test_websocket_close_during_handshake() {
    init_tracing();

    // Accepts TCP connections but never answers the upgrade request
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let transport = WebSocketTransport::new(WebSocketConfig::default()).unwrap();
    let events = record_events(&transport);

    transport
        .open(ConnectOptions::new().host("127.0.0.1").port(port))
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(transport.status(), TransportState::Connecting);

    transport.close().unwrap();
    assert_eq!(transport.status(), TransportState::Closing);
    assert!(
        wait_for_status(&transport, TransportState::Closed).await,
        "close never completed while the handshake was pending"
    );
    assert_eq!(events.calls(), vec![TransportEvent::Closed]);

    silent.abort();
}
