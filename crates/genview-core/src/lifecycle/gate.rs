//! The gate between construction and rendering.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ViewStateFactory;
use crate::configuration::Configuration;
use crate::error::ConstructionError;
use crate::extension::Plugin;
use crate::token::{RequestToken, TokenSource};

/// What the rendering boundary can observe.
#[derive(Debug)]
pub enum GateStatus<S> {
    /// Nothing requested yet, or torn down.
    Idle,
    /// A construction is pending; render nothing.
    Constructing(RequestToken),
    Ready(Arc<S>),
    /// The latest construction failed; nothing is exposed.
    Failed(ConstructionError),
}

impl<S> Clone for GateStatus<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Constructing(token) => Self::Constructing(*token),
            Self::Ready(state) => Self::Ready(state.clone()),
            Self::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

impl<S> GateStatus<S> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn state(&self) -> Option<&Arc<S>> {
        match self {
            Self::Ready(state) => Some(state),
            _ => None,
        }
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Constructing(_) => "constructing",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Runs view-state constructions and publishes only the latest one's outcome.
///
/// Every [`create`](Self::create) takes a fresh token and clears any
/// previously ready state. When a construction finishes, its result is
/// published only if its token is still the latest; otherwise the result
/// is dropped and the caller gets [`ConstructionError::Superseded`].
/// In-flight constructions are not aborted. A `create` future dropped
/// before it settles leaves the gate `Failed(Cancelled)` if it was the
/// latest request.
pub struct ViewStateGate<F: ViewStateFactory> {
    factory: Arc<F>,
    tokens: TokenSource,
    status: watch::Sender<GateStatus<F::State>>,
    /// Unsettled constructions; `true` once abandoned by teardown.
    pending: Mutex<HashMap<RequestToken, bool>>,
}

impl<F: ViewStateFactory> ViewStateGate<F> {
    pub fn new(factory: Arc<F>) -> Self {
        let (status, _) = watch::channel(GateStatus::Idle);
        Self {
            factory,
            tokens: TokenSource::new(),
            status,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn factory(&self) -> &Arc<F> {
        &self.factory
    }

    /// Construct a view state for `configuration`.
    pub async fn create(
        &self,
        configuration: Arc<Configuration>,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Result<Arc<F::State>, ConstructionError> {
        let token = {
            let mut pending = self.pending.lock();
            let token = self.tokens.issue();
            pending.insert(token, false);
            token
        };
        let mut guard = PendingConstruction {
            gate: self,
            token,
            settled: false,
        };
        self.status.send_if_modified(|status| {
            if !self.tokens.is_current(token) {
                return false;
            }
            *status = GateStatus::Constructing(token);
            true
        });
        info!(
            token = %token,
            assemblies = configuration.assemblies.len(),
            plugins = plugins.len(),
            "view state construction started"
        );

        let result = self.factory.construct(configuration, plugins).await;
        guard.settled = true;
        self.settle(token, result.map(Arc::new))
    }

    /// Publish `result` if `token` is still the latest request.
    fn settle(
        &self,
        token: RequestToken,
        result: Result<Arc<F::State>, ConstructionError>,
    ) -> Result<Arc<F::State>, ConstructionError> {
        let published = self.status.send_if_modified(|status| {
            if !self.tokens.is_current(token) {
                return false;
            }
            *status = match &result {
                Ok(state) => GateStatus::Ready(state.clone()),
                Err(e) => GateStatus::Failed(e.clone()),
            };
            true
        });
        let torn_down = self.pending.lock().remove(&token).unwrap_or(false);

        let outcome = match (published, torn_down) {
            (true, _) => result,
            (false, true) => Err(ConstructionError::TornDown),
            (false, false) => Err(ConstructionError::Superseded),
        };

        match &outcome {
            Ok(_) => info!(token = %token, "view state ready"),
            Err(ConstructionError::Superseded | ConstructionError::TornDown) => {
                debug!(token = %token, "discarding superseded view state")
            }
            Err(e) => warn!(token = %token, error = %e, "view state construction failed"),
        }
        outcome
    }

    /// Whether a fully constructed state is available.
    pub fn is_ready(&self) -> bool {
        self.status.borrow().is_ready()
    }

    /// The ready state, if any. `None` while constructing or after failure.
    pub fn current(&self) -> Option<Arc<F::State>> {
        self.status.borrow().state().cloned()
    }

    pub fn status(&self) -> GateStatus<F::State> {
        self.status.borrow().clone()
    }

    /// Error of the latest construction, if it failed.
    pub fn last_error(&self) -> Option<ConstructionError> {
        match &*self.status.borrow() {
            GateStatus::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GateStatus<F::State>> {
        self.status.subscribe()
    }

    /// Wait until the current construction settles.
    pub async fn wait_ready(&self) -> Result<Arc<F::State>, ConstructionError> {
        let mut rx = self.status.subscribe();
        let status = rx
            .wait_for(|s| matches!(s, GateStatus::Ready(_) | GateStatus::Failed(_)))
            .await
            .map_err(|_| ConstructionError::TornDown)?;
        match &*status {
            GateStatus::Ready(state) => Ok(state.clone()),
            GateStatus::Failed(e) => Err(e.clone()),
            _ => Err(ConstructionError::TornDown),
        }
    }

    /// Drop the current state and abandon pending constructions.
    pub fn teardown(&self) {
        let mut pending = self.pending.lock();
        if let Some(torn_down) = pending.get_mut(&self.tokens.latest()) {
            *torn_down = true;
        }
        self.status.send_modify(|status| {
            self.tokens.invalidate();
            *status = GateStatus::Idle;
        });
        drop(pending);
        debug!("view state gate torn down");
    }
}

/// Settles a construction whose `create` future was dropped early.
struct PendingConstruction<'a, F: ViewStateFactory> {
    gate: &'a ViewStateGate<F>,
    token: RequestToken,
    settled: bool,
}

impl<F: ViewStateFactory> Drop for PendingConstruction<'_, F> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.gate.pending.lock().remove(&self.token);
        let cancelled = self.gate.status.send_if_modified(|status| {
            if !self.gate.tokens.is_current(self.token) {
                return false;
            }
            *status = GateStatus::Failed(ConstructionError::Cancelled);
            true
        });
        if cancelled {
            warn!(token = %self.token, "view state construction cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::oneshot;

    type Reply = Result<(), ConstructionError>;

    /// Finishes each construction when the test releases the channel for
    /// the configuration's first assembly.
    #[derive(Default)]
    struct Controlled {
        pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl Controlled {
        fn hold(&self, assembly: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().insert(assembly.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl ViewStateFactory for Controlled {
        type State = String;

        async fn construct(
            &self,
            configuration: Arc<Configuration>,
            _plugins: Vec<Arc<dyn Plugin>>,
        ) -> Result<String, ConstructionError> {
            let name = configuration.assemblies[0].name.clone();
            let rx = self.pending.lock().remove(&name);
            match rx {
                Some(rx) => rx
                    .await
                    .map_err(|_| ConstructionError::Engine("dropped".into()))?
                    .map(|_| name),
                None => Ok(name),
            }
        }
    }

    fn cfg_a() -> Arc<Configuration> {
        Arc::new(presets::hg38("http://localhost:8080").unwrap())
    }

    fn cfg_b() -> Arc<Configuration> {
        Arc::new(presets::dicty("http://localhost:8080").unwrap())
    }

    #[tokio::test]
    async fn test_not_ready_while_pending() {
        let factory = Arc::new(Controlled::default());
        let release = factory.hold("hg38");
        let gate = Arc::new(ViewStateGate::new(factory));
        assert!(!gate.is_ready());

        let task = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_a(), Vec::new()).await }
        });
        tokio::task::yield_now().await;
        assert!(!gate.is_ready());
        assert!(gate.current().is_none());
        assert_eq!(gate.status().label(), "constructing");

        release.send(Ok(())).unwrap();
        let state = task.await.unwrap().unwrap();
        assert_eq!(state.as_str(), "hg38");
        assert!(gate.is_ready());
        assert_eq!(gate.current().as_deref().map(String::as_str), Some("hg38"));
    }

    #[test]
    fn test_polled_construction_exposes_nothing_until_settled() {
        let factory = Arc::new(Controlled::default());
        let release = factory.hold("hg38");
        let gate = ViewStateGate::new(factory);

        let mut create = tokio_test::task::spawn(gate.create(cfg_a(), Vec::new()));
        tokio_test::assert_pending!(create.poll());
        assert!(!gate.is_ready());
        assert!(gate.current().is_none());

        release.send(Ok(())).unwrap();
        assert!(create.is_woken());
        let state = tokio_test::assert_ready_ok!(create.poll());
        assert_eq!(state.as_str(), "hg38");
        drop(create);
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_last_create_wins() {
        let factory = Arc::new(Controlled::default());
        let release_a = factory.hold("hg38");
        let release_b = factory.hold("Dictyostelium Discoideum");
        let gate = Arc::new(ViewStateGate::new(factory));

        let first = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_a(), Vec::new()).await }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_b(), Vec::new()).await }
        });
        tokio::task::yield_now().await;

        release_b.send(Ok(())).unwrap();
        assert!(second.await.unwrap().is_ok());
        release_a.send(Ok(())).unwrap();
        assert_eq!(first.await.unwrap(), Err(ConstructionError::Superseded));

        assert_eq!(
            gate.current().as_deref().map(String::as_str),
            Some("Dictyostelium Discoideum")
        );
    }

    #[tokio::test]
    async fn test_stale_result_does_not_resurrect_after_newer_pending() {
        let factory = Arc::new(Controlled::default());
        let release_a = factory.hold("hg38");
        let release_b = factory.hold("Dictyostelium Discoideum");
        let gate = Arc::new(ViewStateGate::new(factory));

        let first = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_a(), Vec::new()).await }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_b(), Vec::new()).await }
        });
        tokio::task::yield_now().await;

        // A lands first while B is still pending.
        release_a.send(Ok(())).unwrap();
        assert_eq!(first.await.unwrap(), Err(ConstructionError::Superseded));
        assert!(!gate.is_ready());

        release_b.send(Ok(())).unwrap();
        second.await.unwrap().unwrap();
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_failure_leaves_gate_unavailable() {
        let factory = Arc::new(Controlled::default());
        let release = factory.hold("hg38");
        let gate = ViewStateGate::new(factory);

        let err = ConstructionError::Resolution {
            owner: "assembly hg38 faiLocation".into(),
            uri: "http://localhost:8080/hg38.prefix.fa.gz.fai".into(),
            reason: "404".into(),
        };
        release.send(Err(err.clone())).unwrap();

        assert_eq!(gate.create(cfg_a(), Vec::new()).await, Err(err.clone()));
        assert!(!gate.is_ready());
        assert!(gate.current().is_none());
        assert_eq!(gate.last_error(), Some(err));
    }

    #[tokio::test]
    async fn test_teardown_abandons_pending() {
        let factory = Arc::new(Controlled::default());
        let release = factory.hold("hg38");
        let gate = Arc::new(ViewStateGate::new(factory));

        let task = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_a(), Vec::new()).await }
        });
        tokio::task::yield_now().await;
        gate.teardown();
        release.send(Ok(())).unwrap();

        assert_eq!(task.await.unwrap(), Err(ConstructionError::TornDown));
        assert!(!gate.is_ready());
        assert_eq!(gate.status().label(), "idle");
    }

    #[tokio::test]
    async fn test_teardown_then_newer_create_reports_torn_down() {
        let factory = Arc::new(Controlled::default());
        let release_a = factory.hold("hg38");
        let release_b = factory.hold("Dictyostelium Discoideum");
        let gate = Arc::new(ViewStateGate::new(factory));

        let first = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_a(), Vec::new()).await }
        });
        tokio::task::yield_now().await;
        gate.teardown();
        let second = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_b(), Vec::new()).await }
        });
        tokio::task::yield_now().await;

        release_a.send(Ok(())).unwrap();
        assert_eq!(first.await.unwrap(), Err(ConstructionError::TornDown));
        assert_eq!(gate.status().label(), "constructing");

        release_b.send(Ok(())).unwrap();
        second.await.unwrap().unwrap();
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_cancelled_create_settles_the_gate() {
        let factory = Arc::new(Controlled::default());
        let _release = factory.hold("hg38");
        let gate = ViewStateGate::new(factory);

        let attempt =
            tokio::time::timeout(Duration::from_millis(20), gate.create(cfg_a(), Vec::new())).await;
        assert!(attempt.is_err());
        assert_eq!(gate.status().label(), "failed");
        assert_eq!(gate.last_error(), Some(ConstructionError::Cancelled));
        assert_eq!(gate.wait_ready().await, Err(ConstructionError::Cancelled));

        let state = gate.create(cfg_b(), Vec::new()).await.unwrap();
        assert_eq!(state.as_str(), "Dictyostelium Discoideum");
        assert!(gate.is_ready());
    }

    #[test]
    fn test_dropping_superseded_create_keeps_newer_state() {
        let factory = Arc::new(Controlled::default());
        let _release = factory.hold("hg38");
        let gate = ViewStateGate::new(factory);

        let mut stale = tokio_test::task::spawn(gate.create(cfg_a(), Vec::new()));
        tokio_test::assert_pending!(stale.poll());

        let mut fresh = tokio_test::task::spawn(gate.create(cfg_b(), Vec::new()));
        tokio_test::assert_ready_ok!(fresh.poll());
        drop(stale);

        assert!(gate.is_ready());
        assert_eq!(
            gate.current().as_deref().map(String::as_str),
            Some("Dictyostelium Discoideum")
        );
    }

    #[tokio::test]
    async fn test_wait_ready() {
        let factory = Arc::new(Controlled::default());
        let release = factory.hold("hg38");
        let gate = Arc::new(ViewStateGate::new(factory));
        let mut rx = gate.subscribe();

        let task = tokio::spawn({
            let gate = gate.clone();
            async move { gate.create(cfg_a(), Vec::new()).await }
        });
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().label(), "constructing");

        release.send(Ok(())).unwrap();
        let state = gate.wait_ready().await.unwrap();
        assert_eq!(state.as_str(), "hg38");
        task.await.unwrap().unwrap();
    }
}
