//! # Application State
//!
//! Engine components wired once at startup and shared by every handler.
//! All stores are in-memory (`parking_lot` locks, never held across
//! `.await`).

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use rcert_anchor::{
    AnchorAdapter, AnchorGuardConfig, GuardedAnchor, HttpAnchorAdapter, HttpAnchorConfig,
    InMemoryLedger,
};
use rcert_batch::{BatchHandle, BatchOrchestrator};
use rcert_cert::{
    CertificateIssuer, InMemoryCertificateStore, InMemoryWorkRepository, IssuancePolicy,
    OwnerOrAdminAuthz, RevocationManager, Verifier,
};
use rcert_core::BatchId;
use rcert_crypto::{CryptoError, EnvSigner, LocalSigner, SignerService};
use thiserror::Error;

use crate::config::{AppConfig, SIGNING_KEY_VAR};
use crate::middleware::metrics::ApiMetrics;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("signing key: {0}")]
    Signing(#[from] CryptoError),
    #[error("anchor adapter: {0}")]
    Anchor(#[from] rcert_anchor::AnchorError),
}

/// Batches by id, in start order.
///
/// Holds at most `capacity` finished batches. Inserting past that evicts
/// the oldest finished ones; running batches are never evicted.
#[derive(Clone)]
pub struct BatchRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    capacity: usize,
}

#[derive(Default)]
struct RegistryInner {
    order: VecDeque<BatchId>,
    handles: HashMap<BatchId, BatchHandle>,
}

impl BatchRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            capacity,
        }
    }

    /// Register `handle`, then evict down to capacity. Returns the number
    /// of batches evicted.
    pub fn insert(&self, handle: BatchHandle) -> usize {
        let mut guard = self.inner.write();
        let RegistryInner { order, handles } = &mut *guard;
        let id = handle.id();
        if handles.insert(id, handle).is_none() {
            order.push_back(id);
        }

        let mut excess = handles.len().saturating_sub(self.capacity);
        let mut evicted = 0;
        order.retain(|id| {
            if excess == 0 {
                return true;
            }
            let finished = handles.get(id).map_or(true, BatchHandle::is_finished);
            if finished {
                handles.remove(id);
                excess -= 1;
                evicted += 1;
            }
            !finished
        });
        evicted
    }

    pub fn get(&self, id: &BatchId) -> Option<BatchHandle> {
        self.inner.read().handles.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub works: Arc<InMemoryWorkRepository>,
    pub certificates: Arc<InMemoryCertificateStore>,
    pub issuer: CertificateIssuer,
    pub issuance: IssuancePolicy,
    pub verifier: Verifier,
    pub revoker: RevocationManager,
    pub orchestrator: BatchOrchestrator,
    pub batches: BatchRegistry,
    pub metrics: ApiMetrics,
    /// `keyId` of the signer, published for offline verification.
    pub key_id: String,
    pub public_key_hex: String,
}

impl AppState {
    /// Default configuration with an ephemeral key and the in-memory
    /// ledger. Intended for tests and local development.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// `config` with an ephemeral key and the in-memory ledger.
    pub fn with_config(config: AppConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new(config.anchor_network.clone()));
        Self::with_signer(config, Arc::new(LocalSigner::generate()), ledger)
    }

    /// Production wiring: signer from `RCERT_SIGNING_KEY_HEX`, HTTP anchor
    /// adapter when `anchor_url` is set.
    ///
    /// An unset signing key falls back to an ephemeral one with a warning;
    /// a malformed key is an error. An unset `AUTH_TOKEN` is logged.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        if config.auth_token.is_none() {
            tracing::warn!(
                "AUTH_TOKEN not set; dashboard routes are unauthenticated and revocation is refused"
            );
        }
        let ledger: Arc<dyn AnchorAdapter> = match &config.anchor_url {
            Some(url) => {
                tracing::info!(url = %url, network = %config.anchor_network, "using HTTP anchor adapter");
                Arc::new(HttpAnchorAdapter::new(HttpAnchorConfig {
                    base_url: url.clone(),
                    network_name: config.anchor_network.clone(),
                    timeout: config.anchor_timeout,
                })?)
            }
            None => {
                tracing::warn!(
                    network = %config.anchor_network,
                    "RCERT_ANCHOR_URL not set; anchoring to the in-memory ledger (no external finality)"
                );
                Arc::new(InMemoryLedger::new(config.anchor_network.clone()))
            }
        };

        match EnvSigner::from_env(SIGNING_KEY_VAR) {
            Ok(signer) => Ok(Self::with_signer(config, Arc::new(signer), ledger)),
            Err(CryptoError::SigningUnavailable(reason)) => {
                tracing::warn!(
                    %reason,
                    "using an ephemeral signing key; certificates will not verify after restart"
                );
                Ok(Self::with_signer(config, Arc::new(LocalSigner::generate()), ledger))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Wire every component around `signer` and `anchor`.
    pub fn with_signer<S>(config: AppConfig, signer: Arc<S>, anchor: Arc<dyn AnchorAdapter>) -> Self
    where
        S: SignerService + 'static,
    {
        let works = Arc::new(InMemoryWorkRepository::new());
        let certificates = Arc::new(InMemoryCertificateStore::new());
        let guard = GuardedAnchor::new(
            anchor,
            AnchorGuardConfig {
                timeout: config.anchor_timeout,
                retry_once: true,
            },
        );

        let issuer = CertificateIssuer::new(signer.clone(), certificates.clone(), works.clone())
            .with_anchor(guard.clone());
        let verifier = Verifier::new(certificates.clone(), works.clone(), signer.clone())
            .with_anchor(guard);
        let revoker = RevocationManager::new(
            certificates.clone(),
            works.clone(),
            Arc::new(OwnerOrAdminAuthz::new(config.admin_actors.iter().cloned())),
        );
        let orchestrator = BatchOrchestrator::new(verifier.clone(), config.batch);
        let batches = BatchRegistry::new(config.batch_retention);

        Self {
            key_id: signer.key_id().to_string(),
            public_key_hex: signer.verifying_key().to_hex(),
            config: Arc::new(config),
            works,
            certificates,
            issuer,
            issuance: IssuancePolicy::default(),
            verifier,
            revoker,
            orchestrator,
            batches,
            metrics: ApiMetrics::new(),
        }
    }

    pub fn batch(&self, id: &BatchId) -> Option<BatchHandle> {
        self.batches.get(id)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
