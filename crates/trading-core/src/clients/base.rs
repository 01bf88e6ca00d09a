//! Shared request pipeline for inter-service clients

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::Instrument;

use super::stats::{BreakerSummary, ClientStats, ConnectionStatus, PerformanceSummary};
use crate::config::EngineConfig;
use crate::config::defaults;
use crate::error::{
    CommResult, CommunicationErrorKind, ServiceCommunicationError, TradingError, TradingResult,
};
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
use crate::rpc::{RpcChannel, RpcTransport, ServiceEndpoint, ServiceKind};
use crate::telemetry::metrics::names;
use crate::telemetry::{MetricsPort, MonitorConfig, PerformanceMonitor, RequestSpan};

/// Per-client resilience settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Deadline for one remote call
    pub timeout: Duration,
    /// Deadline for establishing the channel
    pub connection_timeout: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
    pub monitor: MonitorConfig,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: defaults::grpc::request_timeout(),
            connection_timeout: defaults::grpc::connection_timeout(),
            circuit_breaker: CircuitBreakerConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl From<&EngineConfig> for ClientSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout: config.grpc.request_timeout,
            connection_timeout: config.grpc.connection_timeout,
            circuit_breaker: config.circuit_breaker.clone(),
            monitor: config.performance.clone(),
        }
    }
}

/// One logical connection to a remote service.
///
/// Every call goes through [`ServiceClient::execute`]: lazy connect, request
/// span, circuit breaker, deadline, performance recording and error
/// translation. The breaker and monitor belong to this client alone; the
/// optional metrics port is usually shared by every client of the engine.
pub struct ServiceClient {
    kind: ServiceKind,
    endpoint: ServiceEndpoint,
    settings: ClientSettings,
    transport: Arc<dyn RpcTransport>,
    channel: RwLock<Option<Arc<dyn RpcChannel>>>,
    connect_lock: tokio::sync::Mutex<()>,
    breaker: CircuitBreaker,
    monitor: PerformanceMonitor,
    metrics: Option<Arc<dyn MetricsPort>>,
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    last_request_time: RwLock<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.name())
            .field("connected", &self.is_connected())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl ServiceClient {
    pub fn new(
        kind: ServiceKind,
        endpoint: ServiceEndpoint,
        transport: Arc<dyn RpcTransport>,
        settings: ClientSettings,
    ) -> Self {
        let breaker = CircuitBreaker::with_config(kind.name(), settings.circuit_breaker.clone());
        let monitor = PerformanceMonitor::with_config(kind.name(), settings.monitor.clone());

        Self {
            kind,
            endpoint,
            settings,
            transport,
            channel: RwLock::new(None),
            connect_lock: tokio::sync::Mutex::new(()),
            breaker,
            monitor,
            metrics: None,
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            last_request_time: RwLock::new(None),
        }
    }

    /// Report request count, errors and latency of every call to `metrics`
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsPort>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn service_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port
    }

    /// `host:port`
    pub fn address(&self) -> String {
        self.endpoint.address()
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn performance_monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn is_connected(&self) -> bool {
        self.channel.read().is_some()
    }

    /// Open the channel; no-op when already connected
    pub async fn connect(&self) -> CommResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        let _guard = self.connect_lock.lock().await;
        if self.is_connected() {
            return Ok(());
        }

        let connecting = self.transport.connect(self.kind, &self.endpoint);
        let result = match tokio::time::timeout(self.settings.connection_timeout, connecting).await
        {
            Ok(result) => result,
            Err(_) => Err(TradingError::transport(format!(
                "Connection timeout after {}s",
                self.settings.connection_timeout.as_secs_f64()
            ))),
        };

        match result {
            Ok(channel) => {
                *self.channel.write() = Some(channel);
                tracing::info!(
                    service = %self.kind,
                    host = %self.endpoint.host,
                    port = self.endpoint.port,
                    transport = self.transport.name(),
                    "RPC client connected"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    service = %self.kind,
                    host = %self.endpoint.host,
                    port = self.endpoint.port,
                    error = %e,
                    "Failed to connect RPC client"
                );
                Err(ServiceCommunicationError::connection(self.kind.name(), e))
            }
        }
    }

    /// Run one labelled operation through the resilience stack.
    ///
    /// `request_fn` receives the open channel. Its error, or a timeout, counts
    /// as a breaker failure. Breaker rejections never reach `request_fn` and
    /// are not recorded in the performance monitor.
    pub async fn execute<T, F, Fut>(&self, operation: &str, request_fn: F) -> CommResult<T>
    where
        F: FnOnce(Arc<dyn RpcChannel>) -> Fut,
        Fut: Future<Output = TradingResult<T>>,
    {
        self.connect().await?;
        let channel = self.channel.read().clone().ok_or_else(|| {
            ServiceCommunicationError::new(
                CommunicationErrorKind::Connection,
                format!("Client for {} was cleaned up", self.kind),
            )
            .with_service(self.kind.name())
            .with_operation(operation)
        })?;

        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        *self.last_request_time.write() = Some(Utc::now());

        let mut span = RequestSpan::new(
            self.kind.name(),
            &self.endpoint.host,
            self.endpoint.port,
            operation,
        );

        let outcome = self
            .breaker
            .call(move || self.execute_request(request_fn(channel)))
            .instrument(span.span().clone())
            .await;
        let duration = start.elapsed();

        match outcome {
            Ok(result) => {
                self.monitor.record_request(duration, true, operation);
                self.record_red_metrics(operation, duration, None);
                self.successful_requests.fetch_add(1, Ordering::Relaxed);
                span.mark_ok();
                tracing::debug!(
                    service = %self.kind,
                    operation,
                    duration_ms = duration.as_secs_f64() * 1000.0,
                    "RPC request successful"
                );
                Ok(result)
            }
            Err(breaker_error) => {
                let error = match breaker_error {
                    CircuitBreakerError::Open { service } => {
                        ServiceCommunicationError::circuit_open(&service)
                    }
                    CircuitBreakerError::OperationFailed(e) => {
                        self.monitor.record_request(duration, false, operation);
                        match e {
                            TradingError::Communication(inner) => *inner,
                            other => {
                                ServiceCommunicationError::wrap(self.kind.name(), operation, other)
                            }
                        }
                    }
                };

                self.record_red_metrics(operation, duration, Some(error.kind()));
                self.failed_requests.fetch_add(1, Ordering::Relaxed);
                span.mark_error(error.to_string());
                tracing::error!(
                    service = %self.kind,
                    operation,
                    error = %error,
                    "RPC request failed"
                );
                Err(error)
            }
        }
    }

    /// Count the call, its latency and its error kind, then publish the
    /// breaker state. Does nothing without a metrics port.
    fn record_red_metrics(
        &self,
        operation: &str,
        duration: Duration,
        error: Option<CommunicationErrorKind>,
    ) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        let mut labels = vec![
            ("target", self.kind.name().to_string()),
            ("operation", operation.to_string()),
        ];
        metrics.inc_counter(names::RPC_REQUESTS_TOTAL, &labels);
        metrics.observe_histogram(
            names::RPC_REQUEST_DURATION_SECONDS,
            duration.as_secs_f64(),
            &labels,
        );
        if let Some(kind) = error {
            labels.push(("kind", kind.as_str().to_string()));
            metrics.inc_counter(names::RPC_REQUEST_ERRORS_TOTAL, &labels);
        }

        let state = match self.breaker.state() {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        };
        metrics.set_gauge(names::RPC_CIRCUIT_STATE, state, &labels[..1]);
    }

    /// Serialize `request`, invoke `operation` and decode the reply
    pub async fn make_request<Req, Resp>(
        &self,
        operation: &str,
        request: &Req,
    ) -> CommResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_value(request).map_err(|e| {
            ServiceCommunicationError::wrap(self.kind.name(), operation, e.into())
        })?;

        self.execute(operation, move |channel| async move {
            let reply = channel.invoke(operation, payload).await?;
            Ok::<Resp, TradingError>(serde_json::from_value(reply)?)
        })
        .await
    }

    /// Bound the unit of work by the client timeout
    async fn execute_request<T, Fut>(&self, request: Fut) -> TradingResult<T>
    where
        Fut: Future<Output = TradingResult<T>>,
    {
        match tokio::time::timeout(self.settings.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(TradingError::communication(
                ServiceCommunicationError::timeout(self.kind.name(), self.settings.timeout),
            )),
        }
    }

    /// Side-effect free diagnostic snapshot
    pub fn stats(&self) -> ClientStats {
        let breaker = self.breaker.stats();
        let performance = self.monitor.get_metrics();

        ClientStats {
            service: self.kind.name().to_string(),
            address: self.address(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            last_request_time: *self.last_request_time.read(),
            connection_status: if self.is_connected() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            },
            circuit_breaker: BreakerSummary::from(&breaker),
            performance: PerformanceSummary::from(&performance),
            health: self.monitor.get_health_status(),
        }
    }

    /// Close the channel if open; safe to call repeatedly
    pub async fn cleanup(&self) -> CommResult<()> {
        let channel = self.channel.write().take();
        let Some(channel) = channel else {
            return Ok(());
        };

        tracing::info!(service = %self.kind, "Cleaning up RPC client");
        channel.close().await.map_err(|e| {
            ServiceCommunicationError::new(
                CommunicationErrorKind::Unexpected,
                format!("Failed to close channel to {}", self.kind),
            )
            .with_service(self.kind.name())
            .with_operation("cleanup")
            .with_source(e)
        })?;
        tracing::info!(service = %self.kind, "RPC client cleanup completed");
        Ok(())
    }
}
