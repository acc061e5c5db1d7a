//! Long-lived, self-healing WebSocket client for the gateway.
//!
//! [`GatewayClient`] keeps exactly one authenticated connection alive,
//! multiplexes concurrent requests over it, forwards pushed events to a
//! single handler and supervises liveness through a [`HealthMonitor`].
//!
//! Connection lifecycle:
//! - `start()` spawns the connect loop. It dials `ws://host:port`, waits for
//!   the `connect.challenge` event, answers it with a signed `connect`
//!   request and only then reports the connection as usable.
//! - Any transport failure fails the in-flight requests with
//!   `ConnectionClosed` and re-dials after an exponential backoff.
//! - `stop()` tears everything down permanently; `reconnect()` swaps the
//!   configuration and starts a fresh cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gateway_protocol::{DeviceIdentity, EventFrame, InboundFrame, RequestFrame, METHOD_CONNECT};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use crate::backoff::Backoff;
use crate::config::{gateway_config_path, ClientConfig, ClientSettings};
use crate::error::{ClientError, Result};
use crate::events::{EventDispatcher, EventHandler, GatewayEvent};
use crate::handshake;
use crate::health::{
    BoxFuture, HealthConfig, HealthMonitor, HealthStatus, Probe, RestartHandler, RestartNotifier,
};
use crate::identity::IdentityProvider;
use crate::pending::{Completion, Delivery, PendingRequests};

/// Capacity of the per-connection outbound frame queue.
const OUTBOUND_CAPACITY: usize = 256;

type GatewaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Observable lifecycle of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket and no dial in progress.
    Disconnected,
    /// Opening the WebSocket.
    Dialing,
    /// Socket open, handshake not yet accepted.
    Authenticating,
    /// Handshake accepted; requests may be sent.
    Connected,
    /// `stop()` is tearing the client down.
    ShuttingDown,
}

/// Handle of the socket currently owned by the client.
#[derive(Debug, Clone)]
struct ActiveConnection {
    generation: u64,
    outbound: mpsc::Sender<WsMessage>,
    close: CancellationToken,
}

/// State guarded by the single connection mutex.
#[derive(Debug, Default)]
struct ConnState {
    pending: PendingRequests,
    active: Option<ActiveConnection>,
    connected: bool,
    pong_waiters: HashMap<u64, oneshot::Sender<()>>,
    next_ping: u64,
    next_generation: u64,
}

impl ConnState {
    fn is_active(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    /// Drops the live handle and fails everything waiting on it.
    fn teardown(&mut self, fail: impl FnOnce(&mut PendingRequests) -> usize) -> usize {
        if let Some(active) = self.active.take() {
            active.close.cancel();
        }
        self.connected = false;
        self.pong_waiters.clear();
        fail(&mut self.pending)
    }

    /// Completes the ping whose payload the pong echoes. Pongs that match
    /// no outstanding ping are ignored.
    fn resolve_pong(&mut self, generation: u64, payload: &[u8]) -> bool {
        if !self.is_active(generation) {
            return false;
        }
        let Ok(bytes) = <[u8; 8]>::try_from(payload) else {
            return false;
        };
        match self.pong_waiters.remove(&u64::from_be_bytes(bytes)) {
            Some(waiter) => waiter.send(()).is_ok(),
            None => false,
        }
    }
}

/// Which connection a request may travel on.
#[derive(Debug, Clone, Copy)]
enum Route {
    /// Only an authenticated connection.
    Authenticated,
    /// The given connection, before it is authenticated.
    Handshake(u64),
}

struct Inner {
    settings: ClientSettings,
    config: Mutex<ClientConfig>,
    conn: Mutex<ConnState>,
    backoff: Mutex<Backoff>,
    run: Mutex<Option<CancellationToken>>,
    state: watch::Sender<ConnectionState>,
    events: EventDispatcher,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    identity: Mutex<Option<Arc<DeviceIdentity>>>,
}

/// Builder for [`GatewayClient`].
pub struct GatewayClientBuilder {
    config: ClientConfig,
    settings: ClientSettings,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl GatewayClientBuilder {
    /// Sets timeouts, backoff bounds, health tuning and the client descriptor.
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the source of the device signing key. Without one the client
    /// authenticates with its token only.
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn build(self) -> GatewayClient {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let backoff = Backoff::new(self.settings.initial_backoff, self.settings.max_backoff);
        let health_config = HealthConfig {
            interval: self.settings.health_interval,
            max_fails: self.settings.health_max_fails,
            probe_timeout: self.settings.probe_timeout,
        };

        let inner = Arc::new(Inner {
            settings: self.settings,
            config: Mutex::new(self.config),
            conn: Mutex::new(ConnState::default()),
            backoff: Mutex::new(backoff),
            run: Mutex::new(None),
            state,
            events: EventDispatcher::new(),
            identity_provider: self.identity_provider,
            identity: Mutex::new(None),
        });
        let probe = Arc::new(ClientProbe {
            inner: Arc::clone(&inner),
        });

        GatewayClient {
            inner,
            health: HealthMonitor::new(health_config, probe),
        }
    }
}

/// Supervised RPC client for the gateway.
///
/// Cloning is cheap; all clones drive the same connection.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<Inner>,
    health: HealthMonitor,
}

impl GatewayClient {
    /// Creates a client with default settings and no device identity.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> GatewayClientBuilder {
        GatewayClientBuilder {
            config,
            settings: ClientSettings::default(),
            identity_provider: None,
        }
    }

    /// Spawns the background connect loop. No-op if it is already running
    /// or if the client was stopped; only [`reconnect`](Self::reconnect)
    /// revives a stopped client.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut run = self.inner.run.lock();
        match run.as_ref() {
            Some(token) if token.is_cancelled() => {
                tracing::debug!("gateway client stopped, ignoring start");
                return;
            }
            Some(_) => {
                tracing::debug!("gateway client already running");
                return;
            }
            None => {}
        }

        let token = CancellationToken::new();
        *run = Some(token.clone());
        tracing::info!(url = %self.inner.config.lock().ws_url(), "starting gateway client");
        tokio::spawn(Arc::clone(&self.inner).run_connect_loop(token));
    }

    /// Shuts the client down permanently.
    ///
    /// Closes the connection, fails every pending request with
    /// [`ClientError::ClientStopped`] and stops the health monitor. Calling
    /// it again does nothing.
    pub fn stop(&self) {
        self.health.set_enabled(false);

        // The cancelled token stays in place so a later `start` stays a no-op.
        let token = {
            let mut run = self.inner.run.lock();
            match run.as_ref() {
                Some(token) if token.is_cancelled() => {
                    tracing::debug!("gateway client already stopped");
                    return;
                }
                Some(token) => token.clone(),
                None => run.insert(CancellationToken::new()).clone(),
            }
        };
        self.inner.state.send_replace(ConnectionState::ShuttingDown);
        token.cancel();

        let stopped = self.inner.conn.lock().teardown(PendingRequests::stop_all);
        self.inner.state.send_replace(ConnectionState::Disconnected);
        tracing::info!(failed_requests = stopped, "gateway client stopped");
    }

    /// Replaces the connection parameters and starts a fresh connect cycle.
    ///
    /// In-flight requests fail with [`ClientError::ConnectionClosed`]. The
    /// backoff is reset. Works on a stopped client as well.
    pub fn reconnect(&self, config: ClientConfig) {
        if let Some(token) = self.inner.run.lock().take() {
            token.cancel();
        }

        let failed = self
            .inner
            .conn
            .lock()
            .teardown(|pending| pending.close_all("reconnecting with new configuration"));
        self.inner.state.send_replace(ConnectionState::Disconnected);

        tracing::info!(
            url = %config.ws_url(),
            failed_requests = failed,
            "reconnecting gateway client"
        );
        *self.inner.config.lock() = config;
        self.inner.backoff.lock().on_success();

        self.start();
    }

    /// Snapshot of the current connection parameters.
    pub fn config(&self) -> ClientConfig {
        self.inner.config.lock().clone()
    }

    /// True only once the handshake succeeded on the live connection.
    pub fn is_connected(&self) -> bool {
        self.inner.conn.lock().connected
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Delay the connect loop will wait after the next failure.
    pub fn reconnect_delay(&self) -> Duration {
        self.inner.backoff.lock().current_delay()
    }

    /// Waits until the client is connected or `timeout` elapses.
    pub async fn wait_until_connected(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        let result = tokio::time::timeout(timeout, rx.wait_for(|s| *s == ConnectionState::Connected))
            .await
            .map(|waited| waited.map(|_| ()));
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(ClientError::ClientStopped),
            Err(_) => Err(ClientError::NotConnected),
        }
    }

    /// Sends `method` with the default request timeout.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let timeout = self.inner.settings.request_timeout;
        self.request_with_timeout(method, params, timeout).await
    }

    /// Sends `method` and waits up to `timeout` for its terminal response.
    ///
    /// Returns the response payload, or `Value::Null` if it carried none.
    pub async fn request_with_timeout(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value> {
        self.inner
            .roundtrip(Route::Authenticated, method, params, timeout)
            .await
    }

    /// Sends a WebSocket ping and waits for the pong.
    pub async fn ping(&self, timeout: Duration) -> Result<Duration> {
        self.inner.ping(timeout).await
    }

    /// Installs the event handler, replacing any previous one.
    pub fn set_event_handler<F>(&self, handler: F)
    where
        F: Fn(GatewayEvent) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        self.inner.events.set_handler(handler);
    }

    pub fn clear_event_handler(&self) {
        self.inner.events.clear_handler();
    }

    /// Starts or stops the health probe loop.
    pub fn set_health_check_enabled(&self, enabled: bool) {
        self.health.set_enabled(enabled);
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health.status()
    }

    pub fn set_restart_callback(&self, handler: impl RestartHandler + 'static) {
        self.health.set_restart_handler(Arc::new(handler));
    }

    pub fn set_notify_callback(&self, notifier: impl RestartNotifier + 'static) {
        self.health.set_notifier(Arc::new(notifier));
    }

    /// The health monitor driving this client.
    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config())
            .field("state", &self.state())
            .finish()
    }
}

impl Inner {
    fn set_state(&self, token: &CancellationToken, state: ConnectionState) {
        if !token.is_cancelled() {
            self.state.send_replace(state);
        }
    }

    async fn run_connect_loop(self: Arc<Self>, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }

            let url = self.config.lock().ws_url();
            self.set_state(&token, ConnectionState::Dialing);

            let dial = tokio::select! {
                _ = token.cancelled() => break,
                result = self.dial(&url) => result,
            };

            match dial {
                Ok(socket) => self.run_connection(socket, &token).await,
                Err(e) => tracing::warn!(url = %url, error = %e, "gateway connection failed"),
            }

            if token.is_cancelled() {
                break;
            }
            self.set_state(&token, ConnectionState::Disconnected);

            let (delay, attempt) = {
                let mut backoff = self.backoff.lock();
                let delay = backoff.on_failure();
                (delay, backoff.attempt())
            };
            tracing::info!(attempt, delay = ?delay, "reconnecting to gateway");

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        tracing::debug!("gateway connect loop exited");
    }

    async fn dial(&self, url: &str) -> Result<GatewaySocket> {
        Url::parse(url).map_err(|e| ClientError::DialFailed(format!("invalid URL {}: {}", url, e)))?;
        tracing::debug!(url = %url, "dialing gateway");

        let connect = connect_async(url);
        let (socket, _) = tokio::time::timeout(self.settings.auth_timeout, connect)
            .await
            .map_err(|_| ClientError::DialFailed("connect timed out".to_string()))?
            .map_err(|e| match e {
                WsError::Io(io_err) => ClientError::DialFailed(io_err.to_string()),
                other => ClientError::DialFailed(format!("WebSocket handshake failed: {}", other)),
            })?;
        Ok(socket)
    }

    /// Drives one socket from open to teardown.
    async fn run_connection(self: &Arc<Self>, socket: GatewaySocket, token: &CancellationToken) {
        let (mut sink, mut stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<WsMessage>(OUTBOUND_CAPACITY);
        let close = token.child_token();

        let active = {
            let mut conn = self.conn.lock();
            if token.is_cancelled() {
                return;
            }
            let generation = conn.next_generation;
            conn.next_generation += 1;
            let active = ActiveConnection {
                generation,
                outbound: outbound_tx,
                close: close.clone(),
            };
            if let Some(previous) = conn.active.replace(active.clone()) {
                previous.close.cancel();
            }
            conn.connected = false;
            active
        };
        self.set_state(token, ConnectionState::Authenticating);
        tracing::debug!(generation = active.generation, "gateway socket open, awaiting challenge");

        let writer_close = close.clone();
        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_close.cancelled() => break,
                    msg = outbound_rx.recv() => match msg {
                        Some(msg) => {
                            if let Err(e) = sink.send(msg).await {
                                tracing::warn!(error = %e, "failed to write to gateway socket");
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            writer_close.cancel();
            let _ = sink.close().await;
        });

        let challenge_deadline = tokio::time::sleep(self.settings.auth_timeout);
        tokio::pin!(challenge_deadline);
        let mut challenged = false;

        let reason = loop {
            tokio::select! {
                _ = close.cancelled() => break "connection closed".to_string(),
                _ = &mut challenge_deadline, if !challenged => {
                    tracing::warn!(timeout = ?self.settings.auth_timeout, "no connect challenge from gateway");
                    break "no connect challenge received".to_string();
                }
                msg = stream.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        self.handle_text(&text, &active, &mut challenged);
                    }
                    Some(Ok(WsMessage::Pong(payload))) => {
                        if !self.conn.lock().resolve_pong(active.generation, &payload) {
                            tracing::trace!("ignoring unsolicited pong");
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        break match frame {
                            Some(frame) => format!(
                                "gateway closed connection: {} {}",
                                u16::from(frame.code),
                                frame.reason
                            ),
                            None => "gateway closed connection".to_string(),
                        };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break format!("read error: {}", e),
                    None => break "connection reset".to_string(),
                },
            }
        };

        close.cancel();
        let failed = {
            let mut conn = self.conn.lock();
            if conn.is_active(active.generation) {
                conn.teardown(|pending| pending.close_all(&reason))
            } else {
                0
            }
        };
        let _ = writer.await;

        tracing::info!(
            generation = active.generation,
            reason = %reason,
            failed_requests = failed,
            "gateway connection closed"
        );
    }

    fn handle_text(self: &Arc<Self>, text: &str, active: &ActiveConnection, challenged: &mut bool) {
        let frame = match InboundFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "dropping undecodable frame");
                return;
            }
        };

        match frame {
            InboundFrame::Event(event) if event.is_challenge() => {
                if *challenged {
                    tracing::debug!("ignoring repeated connect challenge");
                    return;
                }
                *challenged = true;
                self.on_challenge(event, active);
            }
            InboundFrame::Event(event) => {
                self.events.dispatch(event);
            }
            InboundFrame::Response(response) => {
                let id = response.id.clone();
                match self.conn.lock().pending.deliver(response) {
                    Delivery::Resolved => {}
                    Delivery::Acknowledged => {
                        tracing::debug!(id = %id, "request accepted, awaiting final response")
                    }
                    Delivery::Unknown => {
                        tracing::debug!(id = %id, "dropping response for unknown request")
                    }
                }
            }
            InboundFrame::Unknown(_) => {
                tracing::debug!("dropping unrecognised frame");
            }
        }
    }

    fn on_challenge(self: &Arc<Self>, event: EventFrame, active: &ActiveConnection) {
        let nonce = match handshake::challenge_nonce(&event) {
            Ok(nonce) => nonce,
            Err(e) => {
                tracing::warn!(error = %e, "invalid connect challenge");
                active.close.cancel();
                return;
            }
        };

        let inner = Arc::clone(self);
        let active = active.clone();
        tokio::spawn(async move { inner.authenticate(active, nonce).await });
    }

    async fn authenticate(self: Arc<Self>, active: ActiveConnection, nonce: String) {
        let result = match self.connect_params(&nonce) {
            Ok(params) => {
                self.roundtrip(
                    Route::Handshake(active.generation),
                    METHOD_CONNECT,
                    params,
                    self.settings.auth_timeout,
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let err = ClientError::AuthenticationFailed(e.to_string());
            tracing::warn!(error = %err, "gateway handshake rejected");
            active.close.cancel();
            return;
        }

        let mut conn = self.conn.lock();
        if conn.is_active(active.generation) && !active.close.is_cancelled() {
            self.backoff.lock().on_success();
            conn.connected = true;
            self.state.send_replace(ConnectionState::Connected);
            tracing::info!(generation = active.generation, "authenticated with gateway");
        }
    }

    fn connect_params(&self, nonce: &str) -> Result<Value> {
        let token = self.resolve_token();
        let identity = self.device_identity();
        let params = handshake::connect_params(
            &self.settings,
            token.as_deref(),
            identity.as_deref(),
            nonce,
            handshake::now_ms(),
        );
        serde_json::to_value(params).map_err(|e| ClientError::SerializationFailed(e.to_string()))
    }

    /// Resolves the auth token, caching one found in the gateway config.
    fn resolve_token(&self) -> Option<String> {
        let config = self.config.lock().clone();
        if let Some(token) = config.token() {
            return Some(token.to_string());
        }

        let path = self
            .settings
            .gateway_config_path
            .clone()
            .unwrap_or_else(gateway_config_path);
        let token = handshake::resolve_token(&config, &path)?;
        let mut live = self.config.lock();
        if live.token().is_none() {
            live.auth_token = Some(token.clone());
        }
        Some(token)
    }

    /// Loads the device identity once and caches it.
    fn device_identity(&self) -> Option<Arc<DeviceIdentity>> {
        if let Some(identity) = self.identity.lock().as_ref() {
            return Some(Arc::clone(identity));
        }
        let provider = self.identity_provider.as_ref()?;

        match provider.load_or_create() {
            Ok(identity) => {
                let identity = Arc::new(identity);
                *self.identity.lock() = Some(Arc::clone(&identity));
                Some(identity)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "device identity unavailable, authenticating with token only");
                None
            }
        }
    }

    async fn roundtrip(
        &self,
        route: Route,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value> {
        let id = Uuid::new_v4().to_string();

        let (outbound, rx) = {
            let mut conn = self.conn.lock();
            let outbound = match route {
                Route::Authenticated if conn.connected => conn.active.as_ref(),
                Route::Authenticated => None,
                Route::Handshake(generation) => conn
                    .active
                    .as_ref()
                    .filter(|active| active.generation == generation),
            }
            .map(|active| active.outbound.clone())
            .ok_or(ClientError::NotConnected)?;
            let rx = conn.pending.register(&id)?;
            (outbound, rx)
        };

        let text = match RequestFrame::new(id.as_str(), method, params).to_json() {
            Ok(text) => text,
            Err(e) => {
                self.conn.lock().pending.remove(&id);
                return Err(ClientError::SerializationFailed(e.to_string()));
            }
        };

        tracing::debug!(id = %id, method = %method, "sending request");
        if let Err(e) = outbound.send(WsMessage::Text(text)).await {
            self.conn.lock().pending.remove(&id);
            return Err(ClientError::SendFailed(e.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Completion::Response(frame))) => {
                if frame.ok {
                    Ok(frame.payload.unwrap_or(Value::Null))
                } else {
                    let error = frame.error.unwrap_or_default();
                    tracing::debug!(id = %id, method = %method, code = %error.code, "gateway returned error");
                    Err(ClientError::GatewayError {
                        code: error.code,
                        message: error.message,
                    })
                }
            }
            Ok(Ok(Completion::Closed(reason))) => Err(ClientError::ConnectionClosed(reason)),
            Ok(Ok(Completion::Stopped)) => Err(ClientError::ClientStopped),
            Ok(Err(_)) => Err(ClientError::ConnectionClosed(
                "response slot dropped".to_string(),
            )),
            Err(_) => {
                self.conn.lock().pending.remove(&id);
                tracing::warn!(id = %id, method = %method, timeout = ?timeout, "request timed out");
                Err(ClientError::RequestTimeout {
                    method: method.to_string(),
                    timeout,
                })
            }
        }
    }

    async fn ping(&self, timeout: Duration) -> Result<Duration> {
        let (id, outbound, rx) = {
            let mut conn = self.conn.lock();
            if !conn.connected {
                return Err(ClientError::NotConnected);
            }
            let outbound = conn
                .active
                .as_ref()
                .map(|active| active.outbound.clone())
                .ok_or(ClientError::NotConnected)?;
            let id = conn.next_ping;
            conn.next_ping = conn.next_ping.wrapping_add(1);
            let (tx, rx) = oneshot::channel();
            conn.pong_waiters.insert(id, tx);
            (id, outbound, rx)
        };

        let started = tokio::time::Instant::now();
        if let Err(e) = outbound.send(WsMessage::Ping(id.to_be_bytes().to_vec())).await {
            self.conn.lock().pong_waiters.remove(&id);
            return Err(ClientError::SendFailed(e.to_string()));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(())) => Ok(started.elapsed()),
            Ok(Err(_)) => Err(ClientError::ConnectionClosed(
                "connection closed before pong".to_string(),
            )),
            Err(_) => {
                self.conn.lock().pong_waiters.remove(&id);
                Err(ClientError::RequestTimeout {
                    method: "ping".to_string(),
                    timeout,
                })
            }
        }
    }
}

/// Probes the gateway through the client's own connection.
struct ClientProbe {
    inner: Arc<Inner>,
}

impl Probe for ClientProbe {
    fn is_connected(&self) -> bool {
        self.inner.conn.lock().connected
    }

    fn ping(&self, timeout: Duration) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            match self.inner.ping(timeout).await {
                Ok(rtt) => {
                    tracing::trace!(rtt = ?rtt, "gateway ping ok");
                    true
                }
                Err(e) => {
                    tracing::debug!(error = %e, "gateway ping failed");
                    false
                }
            }
        })
    }

    fn dial(&self, timeout: Duration) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let (host, port) = {
                let config = self.inner.config.lock();
                (config.host.clone(), config.port)
            };
            match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
                Ok(Ok(_stream)) => true,
                Ok(Err(e)) => {
                    tracing::debug!(host = %host, port, error = %e, "gateway port unreachable");
                    false
                }
                Err(_) => {
                    tracing::debug!(host = %host, port, "gateway dial timed out");
                    false
                }
            }
        })
    }
}
