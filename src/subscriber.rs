//! Native ZeroMQ subscriber for the particle stream
//!
//! Runs a SUB socket on a tokio runtime in a background thread, with
//! channel-based message passing. The caller polls without blocking.
//! A restarted publisher is picked up by reconnecting with a fresh socket.

use crate::config::{RECONNECT_DELAY, RECV_QUEUE_DEPTH};
use crate::core::FrameSource;
use crate::sub_state::SubState;
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};
use zeromq::{Socket, SocketEvent, SocketRecv, SubSocket, ZmqError};

#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: ZmqError,
    },
    #[error("failed to subscribe: {0}")]
    Subscribe(#[source] ZmqError),
}

/// Why a single connection stopped
enum ConnectionEnd {
    /// Publisher closed or the link broke
    PeerLost,
    /// The client was dropped
    ConsumerGone,
}

/// Subscriber that owns one SUB socket in a background thread
pub struct SubscriberClient {
    rx: Receiver<Vec<u8>>,
    state: Arc<Mutex<SubState>>,
    /// Payloads dropped because the channel was full
    dropped: Arc<AtomicU64>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    endpoint: String,
}

impl SubscriberClient {
    /// Connect to a publisher endpoint with an empty subscription filter.
    ///
    /// Spawns a background thread with a tokio runtime to own the socket.
    /// Connection failures are reported through [`Self::state`].
    pub fn connect(endpoint: &str) -> Self {
        let (tx, rx) = mpsc::sync_channel(RECV_QUEUE_DEPTH);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state = Arc::new(Mutex::new(SubState::Connecting));
        let dropped = Arc::new(AtomicU64::new(0));

        let endpoint_owned = endpoint.to_string();
        let state_clone = state.clone();
        let dropped_clone = dropped.clone();

        let handle = std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "Failed to create tokio runtime");
                    *state_clone.lock() = SubState::Error(e.to_string());
                    return;
                }
            };
            rt.block_on(Self::supervise(
                endpoint_owned,
                tx,
                state_clone,
                dropped_clone,
                shutdown_rx,
            ));
        });

        Self {
            rx,
            state,
            dropped,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
            endpoint: endpoint.to_string(),
        }
    }

    /// Runs the feed until shutdown or Ctrl-C.
    ///
    /// The interrupt listener outlives a failed feed so Ctrl-C keeps working.
    async fn supervise(
        endpoint: String,
        tx: SyncSender<Vec<u8>>,
        state: Arc<Mutex<SubState>>,
        dropped: Arc<AtomicU64>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let feed = Self::run_feed(&endpoint, tx, state.clone(), dropped);
        tokio::pin!(feed);
        let mut feed_done = false;

        loop {
            tokio::select! {
                res = &mut feed, if !feed_done => {
                    feed_done = true;
                    match res {
                        Ok(()) => {
                            warn!(endpoint = %endpoint, "Subscriber feed ended");
                            *state.lock() = SubState::Disconnected;
                        }
                        Err(e) => {
                            error!(error = %e, "Subscriber error");
                            *state.lock() = SubState::Error(e.to_string());
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    info!("Interrupt received, shutting down");
                    *state.lock() = SubState::Interrupted;
                    break;
                }
                _ = &mut shutdown => {
                    debug!("Subscriber shutdown requested");
                    break;
                }
            }
        }
        // Dropping the pinned feed closes the socket
    }

    /// Keeps a connection up until the consumer goes away.
    ///
    /// A lost publisher drops the socket and reconnects with a fresh one.
    async fn run_feed(
        endpoint: &str,
        tx: SyncSender<Vec<u8>>,
        state: Arc<Mutex<SubState>>,
        dropped: Arc<AtomicU64>,
    ) -> Result<(), SubscriberError> {
        let mut connections: u64 = 0;
        loop {
            connections += 1;
            match Self::run_connection(endpoint, &tx, &state, &dropped).await? {
                ConnectionEnd::ConsumerGone => return Ok(()),
                ConnectionEnd::PeerLost => {
                    *state.lock() = SubState::Disconnected;
                    info!(
                        endpoint,
                        connections,
                        delay_ms = RECONNECT_DELAY.as_millis() as u64,
                        "Publisher lost, reconnecting"
                    );
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    async fn run_connection(
        endpoint: &str,
        tx: &SyncSender<Vec<u8>>,
        state: &Mutex<SubState>,
        dropped: &AtomicU64,
    ) -> Result<ConnectionEnd, SubscriberError> {
        info!(endpoint, "Connecting subscriber");

        let mut socket = SubSocket::new();
        let mut events = socket.monitor();
        socket
            .connect(endpoint)
            .await
            .map_err(|source| SubscriberError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;
        // Empty filter: receive everything
        socket.subscribe("").await.map_err(SubscriberError::Subscribe)?;

        info!(endpoint, "Subscriber connected");
        *state.lock() = SubState::Connected;

        loop {
            tokio::select! {
                received = socket.recv() => {
                    let msg = match received {
                        Ok(msg) => msg,
                        Err(e) => {
                            warn!(error = %e, "Receive failed");
                            return Ok(ConnectionEnd::PeerLost);
                        }
                    };
                    let payload: Vec<u8> = msg.into_vec().concat();
                    trace!(len = payload.len(), "Payload received");

                    match tx.try_send(payload) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            // Consumer is behind; newer snapshots will follow
                            let total = dropped.fetch_add(1, Ordering::Relaxed) + 1;
                            debug!(total, "Dropped payload (consumer busy)");
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            debug!("Receiver dropped, stopping feed");
                            return Ok(ConnectionEnd::ConsumerGone);
                        }
                    }
                }
                event = events.next() => match event {
                    Some(SocketEvent::Disconnected(_)) | None => {
                        warn!(endpoint, "Publisher disconnected");
                        return Ok(ConnectionEnd::PeerLost);
                    }
                    Some(other) => trace!(event = ?other, "Socket event"),
                },
            }
        }
    }

    /// Next payload if one is waiting; never blocks
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a payload.
    ///
    /// Once the feed has ended this still waits `timeout`, so polling loops
    /// keep their pace.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        match self.rx.recv_timeout(timeout) {
            Ok(payload) => Some(payload),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                None
            }
        }
    }

    pub fn state(&self) -> SubState {
        self.state.lock().clone()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Stop the background task and wait for the socket to be released.
    pub fn close(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // Task may already be gone after an interrupt
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => debug!(endpoint = %self.endpoint, "Subscriber closed"),
                Err(_) => warn!(endpoint = %self.endpoint, "Subscriber thread panicked"),
            }
        }
    }
}

impl FrameSource for SubscriberClient {
    fn poll(&mut self) -> Option<Vec<u8>> {
        self.try_recv()
    }
}

impl Drop for SubscriberClient {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{decode_frame, encode_values};
    use std::time::Instant;
    use zeromq::{PubSocket, SocketSend, ZmqMessage};

    const WAIT: Duration = Duration::from_secs(5);

    async fn bind_publisher() -> (PubSocket, String) {
        let mut publisher = PubSocket::new();
        let endpoint = publisher
            .bind("tcp://127.0.0.1:0")
            .await
            .expect("bind publisher")
            .to_string();
        (publisher, endpoint)
    }

    /// PUB drops messages until the subscription reaches it, so keep sending
    async fn publish_until_received(
        publisher: &mut PubSocket,
        client: &SubscriberClient,
        payload: &[u8],
    ) -> Option<Vec<u8>> {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            let _ = publisher.send(ZmqMessage::from(payload.to_vec())).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if let Some(received) = client.try_recv() {
                return Some(received);
            }
        }
        None
    }

    async fn wait_for_state(client: &SubscriberClient, expected: &SubState) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if client.state() == *expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_loopback_payload_intact() {
        let (mut publisher, endpoint) = bind_publisher().await;
        let client = SubscriberClient::connect(&endpoint);
        assert_eq!(client.endpoint(), endpoint);
        // Nothing published yet
        assert_eq!(client.try_recv(), None);

        let payload = encode_values(&[10.0, 1.0, 2.0, 3.0, 0.5, 4.0, 5.0, 6.0, 0.25]);
        let received = publish_until_received(&mut publisher, &client, &payload).await;
        assert_eq!(received.as_deref(), Some(payload.as_slice()));

        let frame = decode_frame(&payload).unwrap();
        assert_eq!(frame.domain_size, 10.0);
        assert_eq!(frame.particle_count(), 2);
        assert_eq!(frame.particles[1].radius, 0.25);
        assert!(client.state().is_connected());

        client.close();
    }

    #[tokio::test]
    async fn test_reconnects_after_publisher_restart() {
        let (mut publisher, endpoint) = bind_publisher().await;
        let client = SubscriberClient::connect(&endpoint);

        let first = encode_values(&[10.0, 1.0, 1.0, 1.0, 1.0]);
        let received = publish_until_received(&mut publisher, &client, &first).await;
        assert_eq!(received, Some(first));

        let _ = publisher.close().await;
        assert!(
            wait_for_state(&client, &SubState::Disconnected).await,
            "state = {:?}",
            client.state()
        );
        while client.try_recv().is_some() {}

        let mut publisher = PubSocket::new();
        publisher.bind(&endpoint).await.expect("rebind publisher");
        let second = encode_values(&[20.0, 2.0, 2.0, 2.0, 1.0]);
        let received = publish_until_received(&mut publisher, &client, &second).await;
        assert_eq!(received, Some(second));
        assert!(client.state().is_connected());

        client.close();
    }

    #[tokio::test]
    async fn test_close_while_connecting() {
        // Reserve a port, then free it so nothing is listening
        let (publisher, endpoint) = bind_publisher().await;
        let _ = publisher.close().await;

        let client = SubscriberClient::connect(&endpoint);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(client.try_recv(), None);
        assert!(!client.state().is_connected());

        let started = Instant::now();
        client.close();
        assert!(started.elapsed() < WAIT);
    }

    #[test]
    fn test_recv_timeout_waits_after_feed_failed() {
        let client = SubscriberClient::connect("not-an-endpoint");
        let deadline = Instant::now() + WAIT;
        while !matches!(client.state(), SubState::Error(_)) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(matches!(client.state(), SubState::Error(_)), "state = {:?}", client.state());

        let timeout = Duration::from_millis(50);
        let started = Instant::now();
        assert_eq!(client.recv_timeout(timeout), None);
        assert!(started.elapsed() >= timeout);
    }

    #[test]
    fn test_drop_joins_thread() {
        let client = SubscriberClient::connect("tcp://127.0.0.1:1");
        assert_eq!(client.try_recv(), None);
        drop(client);
    }
}
