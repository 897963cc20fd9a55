//! # uhsledger-sentinel
//!
//! The attestation boundary from `spec.md` §4.6: takes a full (client-signed)
//! transaction, runs the static checks that let it reject nonsense before
//! ever touching the replicated state, compacts it, signs the ctx id, and
//! fans the attested ctx out to a coordinator. Does not implement a full
//! value-balance/rangeproof verifier — that deeper check belongs to the
//! external "sentinel transaction validators" collaborator named out of
//! scope in §1.

mod client;
mod error;
mod key;
mod validate;

pub use client::{CoordinatorClient, LocalCoordinatorClient};
pub use error::SentinelError;
pub use key::SentinelKey;
pub use validate::{check_static_validity, compact, FullTx, FullTxInput};

use uhsledger_config::SentinelConfig;
use uhsledger_primitives::Epoch;

/// The status `execute_request` resolves to, mirroring `spec.md` §6's
/// `execute_response.status` enum exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecuteStatus {
    Confirmed,
    Pending,
    StateInvalid,
    StaticInvalid,
}

/// One sentinel: a signing key plus the static-validity bounds it enforces.
#[derive(Debug)]
pub struct Sentinel {
    key: SentinelKey,
    config: SentinelConfig,
}

impl Sentinel {
    pub fn new(key: SentinelKey, config: SentinelConfig) -> Self {
        Sentinel { key, config }
    }

    pub fn public_key(&self) -> uhsledger_primitives::Hash {
        self.key.public()
    }

    /// Runs the full `execute_request` pipeline from spec.md §4.6/§6: static
    /// checks, compaction, self-attestation, then submission through
    /// `coordinator`. A single sentinel can only ever contribute one of the
    /// `attestation_threshold` signatures a shard requires; reaching
    /// threshold in a live deployment means multiple independent sentinels
    /// attest the same ctx id before any of them submits it.
    pub async fn execute_request<C: client::CoordinatorClient + ?Sized>(
        &self,
        tx: FullTx,
        epoch: Epoch,
        coordinator: &C,
    ) -> (ExecuteStatus, Option<SentinelError>) {
        if let Err(e) = check_static_validity(&tx, &self.config) {
            tracing::warn!(error = %e, "sentinel rejected transaction on static checks");
            return (ExecuteStatus::StaticInvalid, Some(e));
        }

        let mut ctx = compact(&tx, epoch);
        ctx.attestations.push(self.key.attest(ctx.id));

        match coordinator.execute(ctx.clone()).await {
            Ok(_) => (ExecuteStatus::Confirmed, None),
            Err(uhsledger_coordinator::CoordinatorError::StateInvalid { .. }) => {
                (ExecuteStatus::StateInvalid, Some(SentinelError::StateInvalid(ctx.id)))
            }
            Err(_) => (ExecuteStatus::Pending, Some(SentinelError::CoordinatorUnreachable(ctx.id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use uhsledger_primitives::{Ctx, Hash, Output};

    use super::*;

    struct StubCoordinator {
        result: Result<bool, uhsledger_coordinator::CoordinatorError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl client::CoordinatorClient for StubCoordinator {
        async fn execute(&self, _ctx: Ctx) -> Result<bool, uhsledger_coordinator::CoordinatorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn sample_tx() -> FullTx {
        FullTx {
            inputs: vec![FullTxInput { uhs_id: Hash::digest(b"u1"), value: 10 }],
            outputs: vec![Output { owner_uhs_id: Hash::digest(b"u2"), value: 10 }],
        }
    }

    #[tokio::test]
    async fn confirmed_on_coordinator_success() {
        let sentinel = Sentinel::new(SentinelKey::from_secret([1u8; 32]), SentinelConfig::DEFAULT);
        let coordinator = StubCoordinator { result: Ok(true), calls: AtomicUsize::new(0) };
        let (status, err) = sentinel.execute_request(sample_tx(), Epoch(1), &coordinator).await;
        assert_eq!(status, ExecuteStatus::Confirmed);
        assert!(err.is_none());
        assert_eq!(coordinator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn static_invalid_never_reaches_coordinator() {
        let sentinel = Sentinel::new(SentinelKey::from_secret([1u8; 32]), SentinelConfig::DEFAULT);
        let coordinator = StubCoordinator { result: Ok(true), calls: AtomicUsize::new(0) };
        let mut bad_tx = sample_tx();
        bad_tx.outputs[0].value = 9;
        let (status, err) = sentinel.execute_request(bad_tx, Epoch(1), &coordinator).await;
        assert_eq!(status, ExecuteStatus::StaticInvalid);
        assert!(matches!(err, Some(SentinelError::BalanceMismatch { .. })));
        assert_eq!(coordinator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn state_invalid_when_coordinator_rejects() {
        let sentinel = Sentinel::new(SentinelKey::from_secret([1u8; 32]), SentinelConfig::DEFAULT);
        let coordinator = StubCoordinator {
            result: Err(uhsledger_coordinator::CoordinatorError::StateInvalid {
                ctx: Hash::ZERO,
                source: uhsledger_locking_shard::LockError::InputUnavailable { ctx: Hash::ZERO, input: Hash::ZERO },
            }),
            calls: AtomicUsize::new(0),
        };
        let (status, err) = sentinel.execute_request(sample_tx(), Epoch(1), &coordinator).await;
        assert_eq!(status, ExecuteStatus::StateInvalid);
        assert!(matches!(err, Some(SentinelError::StateInvalid(_))));
    }

    #[test]
    fn attestation_is_attached_under_this_sentinels_public_key() {
        let sentinel = Sentinel::new(SentinelKey::from_secret([3u8; 32]), SentinelConfig::DEFAULT);
        let tx = sample_tx();
        let mut ctx = compact(&tx, Epoch(0));
        ctx.attestations.push(sentinel.key.attest(ctx.id));
        assert_eq!(ctx.attestations[0].signer, sentinel.public_key());
    }
}
