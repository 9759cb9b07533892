//! Default view-state construction: resolve required resources, then
//! assemble the state handed to the engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::ViewStateFactory;
use crate::configuration::{Configuration, Location};
use crate::error::ConstructionError;
use crate::extension::Plugin;
use crate::session::Session;

/// Checks that a location can be read.
#[async_trait]
pub trait ResourceResolver: Send + Sync + 'static {
    async fn resolve(&self, location: &Location) -> Result<(), String>;
}

/// Resolver for `http(s)` URIs and local paths.
///
/// Remote resources are probed with `HEAD`, falling back to a one-byte
/// ranged `GET` for servers that refuse `HEAD`.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: Client,
}

impl HttpResolver {
    pub fn new(timeout: Duration) -> Result<Self, ConstructionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConstructionError::Engine(format!("http client: {}", e)))?;
        Ok(Self { client })
    }

    /// Resolver using the timeout from the environment.
    pub fn from_env() -> Result<Self, ConstructionError> {
        Self::new(Duration::from_secs(crate::config::resolve_timeout_secs()))
    }

    async fn probe(&self, url: &str) -> Result<(), String> {
        let head = self.client.head(url).send().await;
        let status = match head {
            Ok(resp)
                if resp.status() == StatusCode::METHOD_NOT_ALLOWED
                    || resp.status() == StatusCode::NOT_IMPLEMENTED =>
            {
                self.client
                    .get(url)
                    .header(reqwest::header::RANGE, "bytes=0-0")
                    .send()
                    .await
                    .map_err(|e| e.to_string())?
                    .status()
            }
            Ok(resp) => resp.status(),
            Err(e) => return Err(e.to_string()),
        };
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", status.as_u16()))
        }
    }
}

#[async_trait]
impl ResourceResolver for HttpResolver {
    async fn resolve(&self, location: &Location) -> Result<(), String> {
        let address = location.resolved();
        if address.starts_with("http://") || address.starts_with("https://") {
            return self.probe(&address).await;
        }
        let path = address.strip_prefix("file://").unwrap_or(&address);
        tokio::fs::metadata(path)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// The state handed to the engine once construction succeeds.
#[derive(Debug, Clone)]
pub struct EngineViewState {
    pub configuration: Arc<Configuration>,
    /// Starting session; the engine owns and mutates its own copy.
    pub session: Option<Session>,
    /// Installed plugin names, in install order.
    pub plugins: Vec<String>,
}

/// Resolves every required resource concurrently, then builds an
/// [`EngineViewState`]. The first failure (in resource order) fails the
/// construction.
pub struct ResolvingFactory<R: ResourceResolver> {
    resolver: R,
}

impl<R: ResourceResolver> ResolvingFactory<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

#[async_trait]
impl<R: ResourceResolver> ViewStateFactory for ResolvingFactory<R> {
    type State = EngineViewState;

    async fn construct(
        &self,
        configuration: Arc<Configuration>,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Result<EngineViewState, ConstructionError> {
        let resources = configuration.required_resources();
        let checks = resources
            .iter()
            .map(|resource| self.resolver.resolve(&resource.location));
        let results = join_all(checks).await;

        for (resource, result) in resources.iter().zip(results) {
            if let Err(reason) = result {
                return Err(ConstructionError::Resolution {
                    owner: resource.owner.clone(),
                    uri: resource.location.resolved(),
                    reason,
                });
            }
            debug!(owner = %resource.owner, "resource resolved");
        }

        Ok(EngineViewState {
            session: configuration.default_session.clone(),
            plugins: plugins.iter().map(|p| p.name().to_string()).collect(),
            configuration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use parking_lot::Mutex;

    /// Fails any address containing one of `missing`.
    #[derive(Default)]
    struct Listed {
        missing: Vec<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResourceResolver for Listed {
        async fn resolve(&self, location: &Location) -> Result<(), String> {
            let address = location.resolved();
            self.seen.lock().push(address.clone());
            if self.missing.iter().any(|m| address.contains(m)) {
                Err("HTTP 404".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_resolving_factory_builds_state() {
        let factory = ResolvingFactory::new(Listed::default());
        let config = Arc::new(presets::hg38("http://localhost:8080").unwrap());

        let state = factory.construct(config.clone(), Vec::new()).await.unwrap();
        assert!(state.session.is_some());
        assert!(state.plugins.is_empty());
        assert_eq!(factory.resolver().seen.lock().len(), config.required_resources().len());
    }

    #[tokio::test]
    async fn test_missing_resource_fails_with_owner() {
        let factory = ResolvingFactory::new(Listed {
            missing: vec!["hg38_aliases.txt"],
            ..Default::default()
        });
        let config = Arc::new(presets::hg38("http://localhost:8080").unwrap());

        match factory.construct(config, Vec::new()).await {
            Err(ConstructionError::Resolution { owner, uri, reason }) => {
                assert_eq!(owner, "assembly hg38 refNameAliases location");
                assert_eq!(uri, "http://localhost:8080/hg38_aliases.txt");
                assert_eq!(reason, "HTTP 404");
            }
            other => panic!("unexpected {:?}", other.map(|s| s.plugins)),
        }
    }

    #[tokio::test]
    async fn test_http_resolver_local_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fa.fai");
        std::fs::write(&path, "chr1\t100\t6\t60\t61\n").unwrap();

        let resolver = HttpResolver::new(Duration::from_secs(1)).unwrap();
        let present = Location::local_path(path.to_string_lossy().to_string());
        assert!(resolver.resolve(&present).await.is_ok());

        let absent = Location::local_path(dir.path().join("nope.fai").to_string_lossy().to_string());
        assert!(resolver.resolve(&absent).await.is_err());
    }
}
