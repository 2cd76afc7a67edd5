//! Common test helpers for oscroute tests
//!
//! - Condition-based waiting (no hardcoded sleeps)
//! - Callback recorders for subscription testing
//! - A manual connector to simulate connection signals
//! - An RAII WebSocket echo server

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use oscroute_transport::{
    ConnectRequest, Connection, Connector, Result as TransportResult, SignalSender,
    TransportError,
};

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Install a fmt subscriber honoring `RUST_LOG`; safe to call from every test
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check() {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    check()
}

/// Wait for a recorder to have seen at least `target` calls
pub async fn wait_for_count<T: Clone>(recorder: &CallRecorder<T>, target: usize) -> bool {
    wait_for(|| recorder.count() >= target, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT).await
}

/// Find an available TCP port for testing
pub async fn find_available_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// Callback Recorders
// ============================================================================

/// Records every payload a callback receives
#[derive(Clone)]
pub struct CallRecorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> CallRecorder<T> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that records into this recorder
    pub fn callback(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |value: &T| calls.lock().push(value.clone())
    }

    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.calls.lock().last().cloned()
    }
}

impl<T: Clone> CallRecorder<T> {
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone + Send + 'static> Default for CallRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Records which labelled callbacks fired, in order
#[derive(Clone, Default)]
pub struct OrderRecorder {
    order: Arc<Mutex<Vec<&'static str>>>,
}

impl OrderRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<T>(&self, label: &'static str) -> impl Fn(&T) + Send + Sync + 'static {
        let order = Arc::clone(&self.order);
        move |_: &T| order.lock().push(label)
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.order.lock().clone()
    }
}

// ============================================================================
// Manual Connector
// ============================================================================

#[derive(Default)]
struct ManualState {
    requests: Vec<ConnectRequest>,
    signals: Option<SignalSender>,
    sent: Vec<Bytes>,
    fail_next: Option<String>,
}

/// A connector whose connections never touch the network.
///
/// Tests drive the lifecycle by hand: `connected()`, `disconnected()`,
/// `error()` and `data()` report signals for the most recent connection.
#[derive(Clone, Default)]
pub struct ManualConnector {
    state: Arc<Mutex<ManualState>>,
    closes: Arc<AtomicUsize>,
}

impl ManualConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `connect` fail synchronously
    pub fn fail_next_connect(&self, reason: &str) {
        self.state.lock().fail_next = Some(reason.to_string());
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn last_request(&self) -> Option<ConnectRequest> {
        self.state.lock().requests.last().cloned()
    }

    /// Number of times any connection was asked to close
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Payloads sent through any connection, in order
    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().sent.clone()
    }

    /// Signal sender of the most recent connection
    pub fn signals(&self) -> SignalSender {
        self.state
            .lock()
            .signals
            .clone()
            .expect("no connection has been opened")
    }

    pub fn connected(&self) {
        self.signals().connected();
    }

    pub fn disconnected(&self) {
        self.signals().disconnected(None);
    }

    pub fn error(&self, message: &str) {
        self.signals().error(message);
    }

    pub fn data(&self, data: impl Into<Bytes>) {
        self.signals().data(data.into());
    }
}

impl Connector for ManualConnector {
    fn connect(
        &self,
        request: ConnectRequest,
        signals: SignalSender,
    ) -> TransportResult<Box<dyn Connection>> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next.take() {
            return Err(TransportError::ConnectionFailed(reason));
        }

        state.requests.push(request);
        state.signals = Some(signals);

        Ok(Box::new(ManualConnection {
            state: Arc::clone(&self.state),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct ManualConnection {
    state: Arc<Mutex<ManualState>>,
    closes: Arc<AtomicUsize>,
}

impl Connection for ManualConnection {
    fn send(&self, data: Bytes) -> TransportResult<()> {
        self.state.lock().sent.push(data);
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Test Server - RAII wrapper with proper cleanup
// ============================================================================

/// A WebSocket server echoing every binary frame back to its sender
pub struct TestServer {
    port: u16,
    handle: Option<tokio::task::JoinHandle<()>>,
    ready: Arc<AtomicBool>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let ready = Arc::new(AtomicBool::new(false));
        let ready_clone = ready.clone();

        let handle = tokio::spawn(async move {
            ready_clone.store(true, Ordering::SeqCst);
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    while let Some(Ok(msg)) = ws.next().await {
                        match msg {
                            WsMessage::Binary(data) => {
                                if ws.send(WsMessage::Binary(data)).await.is_err() {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                });
            }
        });

        let ready_check = ready.clone();
        wait_for(
            move || ready_check.load(Ordering::SeqCst),
            DEFAULT_CHECK_INTERVAL,
            Duration::from_secs(5),
        )
        .await;

        Self {
            port,
            handle: Some(handle),
            ready,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
    }
}
