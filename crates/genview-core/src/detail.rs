//! Async feature detail panels.
//!
//! A [`DetailPanel`] fetches supplemental data for a feature and renders it
//! through an explicit load state machine:
//!
//! ```text
//! Idle ──mount──▶ Loading ──ok──▶ Ready(data)
//!                    │
//!                    └──err──▶ Failed(error)
//! ```
//!
//! Mounting another feature while a request is outstanding supersedes it;
//! the stale response is dropped when it lands.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::extension::Component;
use crate::feature::Feature;
use crate::render::RenderNode;
use crate::token::{RequestToken, TokenSource};

pub const LOADING_TEXT: &str = "Loading...";

/// Load state of a detail panel.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(FetchError),
}

impl<T> LoadState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Idle | Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Where a panel's data comes from and how it is shown.
#[async_trait]
pub trait DetailSource: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    /// Heading for the panel.
    fn title(&self) -> &str;

    /// Request parameter derived from the feature.
    fn request_key(&self, feature: &Feature) -> Result<String, FetchError> {
        let key = feature.label();
        if key.trim().is_empty() {
            return Err(FetchError::NoRequestKey);
        }
        Ok(key.to_string())
    }

    async fn fetch(&self, key: &str) -> Result<Self::Output, FetchError>;

    /// Render fetched data. Only called in the `Ready` state.
    fn render_ready(&self, feature: &Feature, data: &Self::Output) -> RenderNode;
}

struct PanelState<T> {
    feature: Option<Feature>,
    key: Option<String>,
    state: LoadState<T>,
}

/// A mountable component backed by a [`DetailSource`].
pub struct DetailPanel<S: DetailSource> {
    source: Arc<S>,
    tokens: TokenSource,
    inner: Mutex<PanelState<S::Output>>,
}

impl<S: DetailSource> DetailPanel<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            tokens: TokenSource::new(),
            inner: Mutex::new(PanelState {
                feature: None,
                key: None,
                state: LoadState::Idle,
            }),
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn state(&self) -> LoadState<S::Output> {
        self.inner.lock().state.clone()
    }

    pub fn feature(&self) -> Option<Feature> {
        self.inner.lock().feature.clone()
    }

    /// Enter `Loading` for `feature` and take a token for its request.
    ///
    /// Returns `None` when no request is needed: either the feature cannot
    /// be keyed (the panel moves to `Failed`), or the same key is already
    /// loading or loaded.
    pub fn begin(&self, feature: Feature) -> Option<(RequestToken, String)> {
        let key = self.source.request_key(&feature);
        let mut inner = self.inner.lock();

        if let Ok(k) = &key {
            let same = inner.key.as_deref() == Some(k.as_str());
            if same && matches!(inner.state, LoadState::Loading | LoadState::Ready(_)) {
                inner.feature = Some(feature);
                return None;
            }
        }

        let token = self.tokens.issue();
        inner.feature = Some(feature);
        match key {
            Ok(key) => {
                inner.key = Some(key.clone());
                inner.state = LoadState::Loading;
                debug!(token = %token, key = %key, "detail request started");
                Some((token, key))
            }
            Err(e) => {
                inner.key = None;
                inner.state = LoadState::Failed(e);
                None
            }
        }
    }

    /// Apply a response. Returns `false` if `token` was superseded and the
    /// result was discarded.
    pub fn complete(&self, token: RequestToken, result: Result<S::Output, FetchError>) -> bool {
        let mut inner = self.inner.lock();
        if !self.tokens.is_current(token) {
            debug!(token = %token, "discarding stale detail response");
            return false;
        }
        inner.state = match result {
            Ok(data) => LoadState::Ready(data),
            Err(e) => {
                warn!(token = %token, error = %e, "detail request failed");
                LoadState::Failed(e)
            }
        };
        true
    }

    /// Forget the current feature; any outstanding response is discarded.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        self.tokens.invalidate();
        inner.feature = None;
        inner.key = None;
        inner.state = LoadState::Idle;
    }
}

#[async_trait]
impl<S: DetailSource> Component for DetailPanel<S> {
    async fn mount(&self, feature: Feature) {
        if let Some((token, key)) = self.begin(feature) {
            let result = self.source.fetch(&key).await;
            self.complete(token, result);
        }
    }

    fn render(&self) -> RenderNode {
        let inner = self.inner.lock();
        match (&inner.state, &inner.feature) {
            (LoadState::Ready(data), Some(feature)) => self.source.render_ready(feature, data),
            (LoadState::Failed(e), _) => RenderNode::Fallback(format!(
                "{} unavailable: {}",
                self.source.title(),
                e
            )),
            _ => RenderNode::Placeholder(LOADING_TEXT.to_string()),
        }
    }
}
