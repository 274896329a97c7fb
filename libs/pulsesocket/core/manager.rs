//! Connection lifecycle manager
//!
//! # Architecture
//!
//! ```text
//!   connect() ──> spawn session task (epoch N)
//!                   │
//!                   ├─ open ──fail──> PendingRetry ──delay──┐
//!                   │   │                                   │
//!                   │   ok ──> Open: recv ─> decode ─> fan-out to subscribers
//!                   │              │  <── outbound queue (send())
//!                   │              └─ closed ──> PendingRetry ──delay──┤
//!                   │                                                  │
//!                   └────────────────<── retry (attempts < ceiling) ───┘
//!                                      └─ ceiling reached ──> Terminal
//!
//!   disconnect() ──> epoch N+1, cancel signal, state Idle
//! ```
//!
//! Each `connect()` from `Idle`/`Terminal` starts a new session with a fresh
//! epoch. A session whose epoch is no longer current exits without touching
//! shared state, so a cancelled retry can never resurrect a connection.

use crate::core::config::ManagerConfig;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
use crate::core::event::{ConnectionStatus, SocketEvent, StatusEnvelope};
use crate::core::subscribers::{SubscriberRegistry, Subscription};
use crate::traits::*;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Reconnecting publish/subscribe connection to one endpoint
///
/// Cloning is cheap; all clones share the same connection, subscribers and
/// retry state. At most one transport is live at any time. Dropping the
/// last clone disconnects.
pub struct ConnectionManager<D: MessageDecoder> {
    shared: Arc<Shared<D>>,
    _owner: Arc<Owner<D>>,
}

impl<D: MessageDecoder> Clone for ConnectionManager<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _owner: Arc::clone(&self._owner),
        }
    }
}

/// Held only by manager handles, never by the session task
struct Owner<D: MessageDecoder> {
    shared: Arc<Shared<D>>,
}

impl<D: MessageDecoder> Drop for Owner<D> {
    fn drop(&mut self) {
        if self.shared.teardown().is_some() {
            debug!("Last handle for {} dropped, session cancelled", self.shared.config.url);
        }
    }
}

struct Shared<D: MessageDecoder> {
    config: ManagerConfig<D>,
    state: AtomicConnectionState,
    metrics: AtomicMetrics,
    subscribers: Arc<SubscriberRegistry<D::Message>>,
    control: Mutex<Control>,
}

/// Mutable lifecycle bookkeeping, guarded by one lock
struct Control {
    /// Bumped by every `connect()` that starts a session and every `disconnect()`
    epoch: u64,
    /// Automatic attempts since the last successful open
    attempts: usize,
    session: Option<Session>,
}

/// Handle to the running session task
struct Session {
    cancel: watch::Sender<bool>,
    retry_now: Arc<Notify>,
    outbound: mpsc::UnboundedSender<WsMessage>,
    task: JoinHandle<()>,
}

impl Session {
    fn cancel(&self) {
        let _ = self.cancel.send(true);
    }
}

/// Why the message loop stopped
enum LoopExit {
    Cancelled,
    Closed(String),
}

impl<D: MessageDecoder> ConnectionManager<D> {
    pub(crate) fn new(config: ManagerConfig<D>) -> Self {
        let shared = Arc::new(Shared {
            config,
            state: AtomicConnectionState::new(ConnectionState::Idle),
            metrics: AtomicMetrics::new(),
            subscribers: Arc::new(SubscriberRegistry::new()),
            control: Mutex::new(Control {
                epoch: 0,
                attempts: 0,
                session: None,
            }),
        });

        Self {
            _owner: Arc::new(Owner {
                shared: Arc::clone(&shared),
            }),
            shared,
        }
    }

    /// Open the connection if idle or terminal; no-op otherwise
    ///
    /// Must be called from within a tokio runtime. Never fails: problems are
    /// reported to subscribers as status envelopes. A manual connect resets
    /// the retry counter. While a retry is pending, the retry fires
    /// immediately instead of waiting out its delay.
    pub fn connect(&self) {
        let mut control = self.shared.control.lock();

        match self.shared.state.get() {
            ConnectionState::Connecting | ConnectionState::Open => {
                debug!("Already connected or connecting to {}", self.url());
                return;
            }
            ConnectionState::PendingRetry => {
                if let Some(session) = control.session.as_ref() {
                    debug!("Retry pending for {}, attempting now", self.url());
                    session.retry_now.notify_one();
                    return;
                }
            }
            ConnectionState::Idle | ConnectionState::Terminal => {}
        }

        if let Some(stale) = control.session.take() {
            stale.cancel();
        }

        control.epoch += 1;
        control.attempts = 0;
        let epoch = control.epoch;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let retry_now = Arc::new(Notify::new());

        self.shared.state.set(ConnectionState::Connecting);
        info!("Connecting to {}", self.url());

        let task = tokio::spawn(run_session(
            Arc::clone(&self.shared),
            epoch,
            cancel_rx,
            outbound_rx,
            Arc::clone(&retry_now),
        ));

        control.session = Some(Session {
            cancel: cancel_tx,
            retry_now,
            outbound: outbound_tx,
            task,
        });
    }

    /// Tear down any live or pending connection and stop retrying
    ///
    /// Idempotent. Subscribers stay registered; a later `connect()` resumes
    /// delivery to them.
    pub fn disconnect(&self) {
        let _ = self.shared.teardown();
    }

    /// Disconnect and wait for the session task to finish
    ///
    /// Once this returns the socket is closed.
    pub async fn close(&self) {
        if let Some(task) = self.shared.teardown() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Session task for {} panicked", self.url());
                }
            }
        }
    }

    /// Register a subscriber for every future event, including status envelopes
    pub fn subscribe<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<D::Message>,
    {
        self.shared.subscribers.subscribe(Arc::new(subscriber))
    }

    /// Subscribe through an unbounded channel instead of a callback
    pub fn subscribe_channel(
        &self,
    ) -> (Subscription, crossbeam_channel::Receiver<SocketEvent<D::Message>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let subscription = self.subscribe(move |event: &SocketEvent<D::Message>| {
            let _ = tx.send(event.clone());
        });
        (subscription, rx)
    }

    /// Serialize a payload as JSON text and send it
    ///
    /// Returns `Ok(false)` when the connection is not open: the payload is
    /// dropped, never queued for a later connection.
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<bool> {
        let text = serde_json::to_string(payload)?;
        Ok(self.send_message(WsMessage::Text(text)))
    }

    /// Send a raw frame if the connection is open
    pub fn send_message(&self, message: WsMessage) -> bool {
        let control = self.shared.control.lock();

        if self.shared.state.is_open() {
            if let Some(session) = control.session.as_ref() {
                if session.outbound.send(message).is_ok() {
                    return true;
                }
            }
        }

        warn!("Not connected to {}, dropping outbound message", self.url());
        false
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.shared.state.is_open()
    }

    /// Automatic attempts made since the last successful open
    pub fn retry_attempts(&self) -> usize {
        self.shared.control.lock().attempts
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    pub fn url(&self) -> &str {
        self.shared.config.url()
    }

    pub fn config(&self) -> &ManagerConfig<D> {
        &self.shared.config
    }

    pub fn metrics(&self) -> Metrics {
        let metrics = &self.shared.metrics;
        Metrics {
            messages_received: metrics.messages_received(),
            messages_sent: metrics.messages_sent(),
            decode_failures: metrics.decode_failures(),
            reconnect_count: metrics.reconnect_count(),
            connection_state: self.shared.state.get(),
        }
    }
}

impl<D: MessageDecoder> std::fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.url())
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<D: MessageDecoder> Shared<D> {
    /// Cancel the session and park in Idle with retries exhausted
    fn teardown(&self) -> Option<JoinHandle<()>> {
        let (previous, session) = {
            let mut control = self.control.lock();
            let previous = self.state.get();
            if previous == ConnectionState::Idle && control.session.is_none() {
                return None;
            }

            control.epoch += 1;
            control.attempts = self.config.max_attempts().unwrap_or(usize::MAX);
            self.state.set(ConnectionState::Idle);
            (previous, control.session.take())
        };

        info!("Disconnecting from {} (was {})", self.config.url, previous);

        if previous == ConnectionState::Open {
            self
                .broadcast(&SocketEvent::Status(StatusEnvelope::new(
                    ConnectionStatus::Disconnected,
                    "Disconnected by client",
                )));
        }

        session.map(|session| {
            session.cancel();
            session.task
        })
    }

    fn broadcast(&self, event: &SocketEvent<D::Message>) {
        self.subscribers.dispatch(event);
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.control.lock().epoch == epoch
    }

    /// Record a successful open; returns false if the session is stale
    fn mark_open(&self, epoch: u64) -> bool {
        let mut control = self.control.lock();
        if control.epoch != epoch {
            return false;
        }
        control.attempts = 0;
        self.state.set(ConnectionState::Open);
        true
    }

    /// Mark the start of a retry attempt; returns false if the session is stale
    fn begin_attempt(&self, epoch: u64) -> bool {
        let control = self.control.lock();
        if control.epoch != epoch {
            return false;
        }
        self.state.set(ConnectionState::Connecting);
        true
    }

    /// Decide what happens after a close or a failed open
    fn schedule_retry(&self, epoch: u64) -> RetryDecision {
        let mut control = self.control.lock();
        if control.epoch != epoch {
            return RetryDecision::Stale;
        }

        let strategy = &self.config.reconnect_strategy;
        if strategy.should_reconnect(control.attempts) {
            control.attempts += 1;
            self.metrics.increment_reconnects();
            self.state.set(ConnectionState::PendingRetry);
            RetryDecision::Retry {
                attempt: control.attempts,
                delay: strategy.delay(control.attempts),
            }
        } else {
            self.state.set(ConnectionState::Terminal);
            RetryDecision::Exhausted {
                attempts: control.attempts,
            }
        }
    }

    fn handle_frame(&self, epoch: u64, frame: WsMessage) {
        self.metrics.increment_received();

        match self.config.decoder.decode(&frame) {
            Ok(message) => {
                if self.is_current(epoch) {
                    self.broadcast(&SocketEvent::Message(message));
                }
            }
            Err(e) => {
                self.metrics.increment_decode_failures();
                debug!("Dropping undecodable frame from {}: {}", self.config.url, e);
            }
        }
    }
}

enum RetryDecision {
    Retry { attempt: usize, delay: Duration },
    Exhausted { attempts: usize },
    Stale,
}

/// Session task: open, pump, retry until cancelled or exhausted
async fn run_session<D: MessageDecoder>(
    shared: Arc<Shared<D>>,
    epoch: u64,
    mut cancel: watch::Receiver<bool>,
    mut outbound: mpsc::UnboundedReceiver<WsMessage>,
    retry_now: Arc<Notify>,
) {
    let url = shared.config.url.clone();

    loop {
        let opened = tokio::select! {
            biased;
            _ = cancel.changed() => {
                debug!("Session for {} cancelled while connecting", url);
                return;
            }
            result = tokio::time::timeout(
                shared.config.connect_timeout,
                shared.config.connector.connect(&url),
            ) => match result {
                Ok(result) => result,
                Err(_) => Err(SocketError::Timeout(format!(
                    "opening handshake exceeded {:?}",
                    shared.config.connect_timeout
                ))),
            },
        };

        let status = match opened {
            Ok(mut transport) => {
                if !shared.mark_open(epoch) {
                    transport.close().await;
                    return;
                }

                info!("Connected to {}", url);
                shared.broadcast(&SocketEvent::Status(StatusEnvelope::connected()));

                let exit =
                    message_loop(&shared, epoch, transport.as_mut(), &mut cancel, &mut outbound)
                        .await;

                // Never carry outbound frames across a disconnect
                let mut discarded = 0usize;
                while outbound.try_recv().is_ok() {
                    discarded += 1;
                }
                if discarded > 0 {
                    warn!("Discarded {} unsent message(s) for {}", discarded, url);
                }

                match exit {
                    LoopExit::Cancelled => {
                        transport.close().await;
                        debug!("Session for {} cancelled", url);
                        return;
                    }
                    LoopExit::Closed(reason) => {
                        warn!("Connection to {} lost: {}", url, reason);
                        StatusEnvelope::disconnected()
                    }
                }
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", url, e);
                StatusEnvelope::error(format!("Connection failed: {}", e))
            }
        };

        let decision = shared.schedule_retry(epoch);
        if matches!(decision, RetryDecision::Stale) {
            return;
        }
        shared.broadcast(&SocketEvent::Status(status));

        let delay = match decision {
            RetryDecision::Retry { attempt, delay } => {
                let ceiling = shared
                    .config
                    .max_attempts()
                    .map_or_else(|| "unlimited".to_string(), |max| max.to_string());
                info!(
                    "Reconnecting to {} in {:?} (attempt {}/{})",
                    url, delay, attempt, ceiling
                );
                delay
            }
            RetryDecision::Exhausted { attempts } => {
                error!(
                    "Max reconnection attempts reached for {} ({} attempts)",
                    url, attempts
                );
                shared.broadcast(&SocketEvent::Status(StatusEnvelope::error(
                    "Max reconnection attempts reached",
                )));
                return;
            }
            RetryDecision::Stale => return,
        };

        tokio::select! {
            biased;
            _ = cancel.changed() => {
                debug!("Pending retry for {} cancelled", url);
                return;
            }
            _ = retry_now.notified() => {}
            _ = tokio::time::sleep(delay) => {}
        }

        if !shared.begin_attempt(epoch) {
            return;
        }
    }
}

/// Pump one open connection until it closes or the session is cancelled
async fn message_loop<D: MessageDecoder>(
    shared: &Shared<D>,
    epoch: u64,
    transport: &mut dyn Transport,
    cancel: &mut watch::Receiver<bool>,
    outbound: &mut mpsc::UnboundedReceiver<WsMessage>,
) -> LoopExit {
    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => return LoopExit::Cancelled,

            frame = transport.recv() => match frame {
                Some(Ok(frame)) => shared.handle_frame(epoch, frame),
                Some(Err(e)) => return LoopExit::Closed(e.to_string()),
                None => return LoopExit::Closed("closed by peer".to_string()),
            },

            Some(message) = outbound.recv() => {
                if let Err(e) = transport.send(message).await {
                    return LoopExit::Closed(e.to_string());
                }
                shared.metrics.increment_sent();
            }
        }
    }
}
