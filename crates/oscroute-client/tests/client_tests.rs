//! Client Library Tests (oscroute-client)
//!
//! Tests for the client facade:
//! - Lifecycle channel wiring
//! - Inbound packet routing
//! - Error channel behavior
//! - Facade forwarding and argument validation
//! - Live round trip against a WebSocket echo server

use bytes::Bytes;
use oscroute_client::{ClientError, ConnectOptions, Event, Osc, RoutingInfo, TransportState};
use oscroute_test_utils::{
    init_tracing, wait_for, wait_for_count, CallRecorder, ManualConnector, OrderRecorder,
    TestServer, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT,
};
use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};

fn manual_client() -> (Osc, ManualConnector) {
    let connector = ManualConnector::new();
    let osc = Osc::builder()
        .host("localhost")
        .port(9000)
        .build_with_connector(connector.clone())
        .expect("build failed");
    (osc, connector)
}

fn message(addr: &str, args: Vec<OscType>) -> OscPacket {
    OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    })
}

fn encode(packet: &OscPacket) -> Vec<u8> {
    rosc::encoder::encode(packet).expect("encode failed")
}

// ============================================================================
// Lifecycle Channels
// ============================================================================

#[test]
fn test_open_and_close_events() {
    let (osc, connector) = manual_client();
    let opened = CallRecorder::<Event>::new();
    let closed = CallRecorder::<Event>::new();

    osc.on("open", opened.callback()).unwrap();
    osc.on("close", closed.callback()).unwrap();

    osc.open(ConnectOptions::new()).unwrap();
    assert_eq!(osc.status(), TransportState::Connecting);

    connector.connected();
    assert_eq!(osc.status(), TransportState::Open);
    assert_eq!(opened.calls(), vec![Event::Open]);

    osc.close().unwrap();
    assert_eq!(osc.status(), TransportState::Closing);
    connector.disconnected();

    assert_eq!(osc.status(), TransportState::Closed);
    assert_eq!(closed.calls(), vec![Event::Close]);
}

#[test]
fn test_error_event() {
    let (osc, connector) = manual_client();
    let errors = CallRecorder::<Event>::new();
    osc.on("error", errors.callback()).unwrap();

    osc.open(ConnectOptions::new()).unwrap();
    connector.error("connection reset");

    assert_eq!(errors.calls(), vec![Event::Error("connection reset".to_string())]);
    assert_eq!(osc.status(), TransportState::Connecting);
}

#[test]
fn test_error_without_subscriber_is_dropped() {
    let (osc, connector) = manual_client();
    osc.open(ConnectOptions::new()).unwrap();

    connector.error("nobody listening");
    connector.data(vec![0xde, 0xad]);

    assert_eq!(osc.status(), TransportState::Connecting);
}

// ============================================================================
// Inbound Routing
// ============================================================================

#[test]
fn test_inbound_message_routed_by_address() {
    let (osc, connector) = manual_client();
    let freq = CallRecorder::<Event>::new();
    let other = CallRecorder::<Event>::new();

    osc.on("/synth/1/freq", freq.callback()).unwrap();
    osc.on("/synth/2/freq", other.callback()).unwrap();

    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();

    let bytes = encode(&message("/synth/1/freq", vec![OscType::Float(440.0)]));
    let size = bytes.len();
    connector.data(bytes);

    assert_eq!(other.count(), 0);
    match freq.last() {
        Some(Event::Message { message, info }) => {
            assert_eq!(message.addr, "/synth/1/freq");
            assert_eq!(message.args, vec![OscType::Float(440.0)]);
            assert_eq!(
                info,
                RoutingInfo {
                    address: "localhost".to_string(),
                    family: "ws".to_string(),
                    port: Some(9000),
                    size,
                }
            );
        }
        other => panic!("expected message, got {:?}", other),
    }
}

#[test]
fn test_inbound_bundle_routed_in_order() {
    let (osc, connector) = manual_client();
    let order = OrderRecorder::new();

    osc.on("/a", order.track::<Event>("a")).unwrap();
    osc.on("/b", order.track::<Event>("b")).unwrap();

    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();

    let bundle = OscPacket::Bundle(OscBundle {
        timetag: OscTime {
            seconds: 0,
            fractional: 1,
        },
        content: vec![
            message("/b", vec![]),
            message("/a", vec![]),
            message("/unheard", vec![]),
            message("/b", vec![]),
        ],
    });
    connector.data(encode(&bundle));

    assert_eq!(order.order(), vec!["b", "a", "b"]);
}

#[test]
fn test_inbound_address_never_hits_channel() {
    let (osc, connector) = manual_client();
    let opened = CallRecorder::<Event>::new();
    osc.on("open", opened.callback()).unwrap();

    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();
    assert_eq!(opened.count(), 1);

    // An OSC message addressed `/open` is an address, not the lifecycle channel
    connector.data(encode(&message("/open", vec![])));
    assert_eq!(opened.count(), 1);
}

#[test]
fn test_decode_failure_goes_to_error_channel() {
    let (osc, connector) = manual_client();
    let errors = CallRecorder::<Event>::new();
    osc.on("error", errors.callback()).unwrap();

    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();
    connector.data(vec![0xff, 0x00, 0x00, 0x00]);

    assert_eq!(errors.count(), 1);
    assert!(matches!(errors.last(), Some(Event::Error(msg)) if msg.starts_with("decode error")));
}

// ============================================================================
// Subscriptions
// ============================================================================

#[test]
fn test_off_stops_delivery() {
    let (osc, connector) = manual_client();
    let calls = CallRecorder::<Event>::new();

    let token = osc.on("/fader/1", calls.callback()).unwrap();
    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();

    connector.data(encode(&message("/fader/1", vec![OscType::Int(1)])));
    assert!(osc.off("/fader/1", &token).unwrap());
    connector.data(encode(&message("/fader/1", vec![OscType::Int(2)])));

    assert_eq!(calls.count(), 1);
    assert!(!osc.off("/fader/1", &token).unwrap());
}

#[test]
fn test_notify_directly() {
    let (osc, _connector) = manual_client();
    let calls = CallRecorder::<Event>::new();
    osc.on("/x", calls.callback()).unwrap();

    assert!(osc.notify("/x", &Event::Open).unwrap());
    assert!(!osc.notify("/y", &Event::Open).unwrap());
    assert_eq!(calls.calls(), vec![Event::Open]);
}

#[test]
fn test_custom_channel() {
    let connector = ManualConnector::new();
    let osc = Osc::builder()
        .channel("ready")
        .build_with_connector(connector)
        .unwrap();

    let calls = CallRecorder::<Event>::new();
    osc.on("ready", calls.callback()).unwrap();

    assert!(osc.notify("ready", &Event::Open).unwrap());
    assert!(!osc.notify("/ready", &Event::Open).unwrap());
    assert_eq!(calls.count(), 1);
}

#[test]
fn test_invalid_channel_name() {
    let err = Osc::builder()
        .channel("bad/name")
        .build_with_connector(ManualConnector::new())
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_invalid_segments() {
    let (osc, _connector) = manual_client();
    let err = osc.on(vec!["ok", ""], |_: &Event| {}).unwrap_err();
    assert!(err.is_invalid_argument());
}

// ============================================================================
// Transport Forwarding
// ============================================================================

#[test]
fn test_server_requires_host_and_port() {
    let (osc, connector) = manual_client();

    assert!(osc.server("", 9000).unwrap_err().is_invalid_argument());
    assert!(osc.server("localhost", 0).unwrap_err().is_invalid_argument());
    assert_eq!(connector.connect_count(), 0);

    osc.server("10.0.0.5", 9912).unwrap();
    let request = connector.last_request().unwrap();
    assert_eq!(request.url.as_str(), "ws://10.0.0.5:9912/");
}

#[test]
fn test_send_requires_open() {
    let (osc, connector) = manual_client();

    let err = osc.send(vec![1u8, 2, 3]).unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));

    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();
    osc.send(vec![1u8, 2, 3]).unwrap();

    assert_eq!(connector.sent(), vec![Bytes::from_static(&[1, 2, 3])]);
}

#[test]
fn test_send_packet_encodes() {
    let (osc, connector) = manual_client();
    osc.open(ConnectOptions::new()).unwrap();
    connector.connected();

    let packet = message("/lights/dimmer", vec![OscType::Float(0.5)]);
    osc.send_packet(&packet).unwrap();

    let sent = connector.sent();
    assert_eq!(sent.len(), 1);
    let (_, decoded) = rosc::decoder::decode_udp(&sent[0]).unwrap();
    assert_eq!(decoded, packet);
}

#[test]
fn test_close_without_connection() {
    let (osc, _connector) = manual_client();
    assert!(matches!(osc.close(), Err(ClientError::Transport(_))));
    assert_eq!(osc.status(), TransportState::NotInitialized);
}

#[test]
fn test_build_outside_runtime_is_unavailable() {
    let err = Osc::builder().build().unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(oscroute_transport::TransportError::Core(
            oscroute_core::Error::TransportUnavailable(_)
        ))
    ));
}

// ============================================================================
// Live Round Trip
// ============================================================================

#[tokio::test]
async fn test_echo_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let server = TestServer::start().await;

    let osc = Osc::builder().host("127.0.0.1").port(server.port()).build()?;
    let opened = CallRecorder::<Event>::new();
    let echoed = CallRecorder::<Event>::new();
    osc.on("open", opened.callback())?;
    osc.on("/echo/value", echoed.callback())?;

    osc.open(ConnectOptions::new())?;
    assert!(wait_for_count(&opened, 1).await, "never opened");

    osc.send_packet(&message("/echo/value", vec![OscType::Int(7)]))?;
    assert!(wait_for_count(&echoed, 1).await, "no echo");
    assert_eq!(
        echoed.last().and_then(|e| e.message().cloned()).map(|m| m.args),
        Some(vec![OscType::Int(7)])
    );

    osc.close()?;
    assert!(
        wait_for(
            || osc.status() == TransportState::Closed,
            DEFAULT_CHECK_INTERVAL,
            DEFAULT_TIMEOUT
        )
        .await
    );
    Ok(())
}
