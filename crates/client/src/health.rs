//! Liveness supervision of the gateway.
//!
//! ## Overview
//!
//! The monitor runs on its own task, independent of the connect loop. On
//! every interval it probes the gateway:
//! 1. A WebSocket ping over the live connection, if there is one
//! 2. Otherwise, or if the ping fails, a bare TCP connect to host:port
//!
//! After `max_fails` consecutive failed probes the counter is reset and the
//! injected [`RestartHandler`] is awaited. The outcome is then handed to the
//! [`RestartNotifier`] on a separate task.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Boxed future returned by the monitor's trait seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default probe interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of consecutive failures before a restart.
pub const DEFAULT_MAX_FAILS: u32 = 3;

/// Default deadline of a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Shortest probe interval the monitor accepts.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Ways of checking whether the gateway is alive.
pub trait Probe: Send + Sync {
    /// Whether an authenticated connection is currently up.
    fn is_connected(&self) -> bool;

    /// Connection-level ping. Resolves to true if a pong arrived in time.
    fn ping(&self, timeout: Duration) -> BoxFuture<'_, bool>;

    /// Raw TCP connect-and-close to the gateway address.
    fn dial(&self, timeout: Duration) -> BoxFuture<'_, bool>;
}

/// Action that restarts the gateway process.
pub trait RestartHandler: Send + Sync {
    fn restart(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

impl<F, Fut> RestartHandler for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn restart(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(self())
    }
}

/// Receives the outcome of every restart attempt.
pub trait RestartNotifier: Send + Sync {
    fn notify(&self, report: RestartReport) -> BoxFuture<'_, ()>;
}

impl<F, Fut> RestartNotifier for F
where
    F: Fn(RestartReport) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn notify(&self, report: RestartReport) -> BoxFuture<'_, ()> {
        Box::pin(self(report))
    }
}

/// Outcome of one restart attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartReport {
    /// Consecutive failed probes that triggered the restart.
    pub failures: u32,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Snapshot of the monitor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub enabled: bool,
    pub fail_count: u32,
    pub max_fails: u32,
    pub last_ok: Option<SystemTime>,
}

/// Result of a single probe cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy { fail_count: u32 },
    /// The threshold was reached. `None` when no restart handler is set.
    Restarted(Option<RestartReport>),
}

/// Health monitor configuration.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub interval: Duration,
    pub max_fails: u32,
    pub probe_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_fails: DEFAULT_MAX_FAILS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct HealthState {
    enabled: bool,
    fail_count: u32,
    last_ok: Option<SystemTime>,
    task: Option<CancellationToken>,
}

struct Shared {
    config: HealthConfig,
    probe: Arc<dyn Probe>,
    state: Mutex<HealthState>,
    restart: RwLock<Option<Arc<dyn RestartHandler>>>,
    notify: RwLock<Option<Arc<dyn RestartNotifier>>>,
}

/// Periodic liveness checker with a restart trigger.
#[derive(Clone)]
pub struct HealthMonitor {
    shared: Arc<Shared>,
}

impl HealthMonitor {
    pub fn new(config: HealthConfig, probe: Arc<dyn Probe>) -> Self {
        let max_fails = config.max_fails.max(1);
        let interval = config.interval.max(MIN_INTERVAL);
        Self {
            shared: Arc::new(Shared {
                config: HealthConfig {
                    interval,
                    max_fails,
                    ..config
                },
                probe,
                state: Mutex::new(HealthState {
                    enabled: false,
                    fail_count: 0,
                    last_ok: None,
                    task: None,
                }),
                restart: RwLock::new(None),
                notify: RwLock::new(None),
            }),
        }
    }

    /// Starts or stops the probe loop. Repeated calls with the same value
    /// are no-ops.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.shared.state.lock();
        if enabled == state.enabled {
            return;
        }
        state.enabled = enabled;

        if enabled {
            let token = CancellationToken::new();
            state.task = Some(token.clone());
            drop(state);

            tracing::info!(
                interval = ?self.shared.config.interval,
                max_fails = self.shared.config.max_fails,
                "starting gateway health monitor"
            );
            let monitor = self.clone();
            tokio::spawn(async move { monitor.run(token).await });
        } else {
            if let Some(token) = state.task.take() {
                token.cancel();
            }
            tracing::info!("gateway health monitor stopped");
        }
    }

    pub fn status(&self) -> HealthStatus {
        let state = self.shared.state.lock();
        HealthStatus {
            enabled: state.enabled,
            fail_count: state.fail_count,
            max_fails: self.shared.config.max_fails,
            last_ok: state.last_ok,
        }
    }

    pub fn set_restart_handler(&self, handler: Arc<dyn RestartHandler>) {
        *self.shared.restart.write() = Some(handler);
    }

    pub fn set_notifier(&self, notifier: Arc<dyn RestartNotifier>) {
        *self.shared.notify.write() = Some(notifier);
    }

    async fn run(&self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.shared.config.interval);
        // Late ticks are delayed, never fired in a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let ProbeOutcome::Restarted(_) = self.check_once().await {
                        // Give the restarted gateway a full interval.
                        ticker.reset();
                    }
                }
            }
        }
        tracing::debug!("health probe loop exited");
    }

    /// Runs one probe cycle and applies its outcome.
    pub async fn check_once(&self) -> ProbeOutcome {
        let probe = &self.shared.probe;
        let timeout = self.shared.config.probe_timeout;

        let healthy = (probe.is_connected() && probe.ping(timeout).await) || probe.dial(timeout).await;

        if healthy {
            let mut state = self.shared.state.lock();
            if state.fail_count > 0 {
                tracing::info!(previous_failures = state.fail_count, "gateway recovered");
            }
            state.fail_count = 0;
            state.last_ok = Some(SystemTime::now());
            return ProbeOutcome::Healthy;
        }

        let failures = {
            let mut state = self.shared.state.lock();
            state.fail_count += 1;
            if state.fail_count < self.shared.config.max_fails {
                tracing::warn!(
                    fail_count = state.fail_count,
                    max_fails = self.shared.config.max_fails,
                    "gateway health probe failed"
                );
                return ProbeOutcome::Unhealthy {
                    fail_count: state.fail_count,
                };
            }
            let failures = state.fail_count;
            state.fail_count = 0;
            failures
        };

        ProbeOutcome::Restarted(self.trigger_restart(failures).await)
    }

    async fn trigger_restart(&self, failures: u32) -> Option<RestartReport> {
        let handler = self.shared.restart.read().clone();
        let Some(handler) = handler else {
            tracing::warn!(failures, "gateway unhealthy but no restart handler is installed");
            return None;
        };

        tracing::error!(failures, "gateway unhealthy, restarting");
        let report = match handler.restart().await {
            Ok(()) => {
                tracing::info!("gateway restart completed");
                RestartReport {
                    failures,
                    succeeded: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "gateway restart failed");
                RestartReport {
                    failures,
                    succeeded: false,
                    error: Some(format!("{:#}", e)),
                }
            }
        };

        let notifier = self.shared.notify.read().clone();
        if let Some(notifier) = notifier {
            let sent = report.clone();
            tokio::spawn(async move { notifier.notify(sent).await });
        }

        Some(report)
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("config", &self.shared.config)
            .field("status", &self.status())
            .finish()
    }
}
