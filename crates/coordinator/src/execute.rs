use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::RngCore;
use uhsledger_config::RetryPolicy;
use uhsledger_primitives::{Ctx, Hash};
use uhsledger_replog::ReplicatedLog;

use crate::command::{CoordinatorCommand, CoordinatorResponse};
use crate::error::CoordinatorError;
use crate::shard_client::{relevant_shards, ShardClient};
use crate::state_machine::CoordinatorStateMachine;

/// Drives one ctx through the 2PC protocol end to end: prepare, lock every
/// owning shard, commit, apply, discard. Mirrors `coordinator.cpp`'s
/// `execute_transaction` step by step (see spec.md §4.5); the caller only
/// sees a reply once the commit/abort decision is durable (step 5 there).
pub async fn execute_transaction<L>(
    log: &L,
    shards: &[Arc<dyn ShardClient>],
    retry: RetryPolicy,
    ctx: Ctx,
) -> Result<bool, CoordinatorError>
where
    L: ReplicatedLog<CoordinatorStateMachine>,
{
    if !log.is_leader() {
        return Err(CoordinatorError::NotLeader);
    }

    let owning = relevant_shards(&ctx, shards);
    let dtx_id = fresh_dtx_id(log, &ctx).await?;

    let lock_results = lock_all(shards, &owning, dtx_id, &ctx, retry).await;
    let first_rejection = lock_results.iter().find_map(|r| r.clone().err());
    let committed = first_rejection.is_none();

    log.replicate(CoordinatorCommand::Commit { dtx_id, complete: vec![committed] })
        .await
        .map_err(|_| CoordinatorError::Timeout(dtx_id))?;
    apply_all(shards, &owning, dtx_id, &ctx, committed, retry).await;
    discard_all(log, shards, &owning, dtx_id, retry).await?;

    match first_rejection {
        None => Ok(true),
        Some(source) => Err(CoordinatorError::StateInvalid { ctx: ctx.id, source }),
    }
}

/// Picks a random dtx id, regenerating on the astronomically unlikely chance
/// it collides with a dtx already recorded on this coordinator's log.
async fn fresh_dtx_id<L>(log: &L, ctx: &Ctx) -> Result<Hash, CoordinatorError>
where
    L: ReplicatedLog<CoordinatorStateMachine>,
{
    loop {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let dtx_id = Hash::from_bytes(bytes);

        let (_, resp) = log
            .replicate(CoordinatorCommand::Prepare { dtx_id, ctxs: vec![ctx.clone()] })
            .await
            .map_err(|_| CoordinatorError::Timeout(dtx_id))?;
        match resp {
            CoordinatorResponse::Prepared => return Ok(dtx_id),
            CoordinatorResponse::AlreadyRecorded => continue,
            _ => uhsledger_primitives::FatalError::new("coordinator returned unexpected response to Prepare").abort(),
        }
    }
}

/// Fans out `lock_outputs` to every owning shard concurrently — spec.md
/// §4.5 step 2 is "in parallel", same as the original's per-shard RPC
/// dispatch, so a multi-shard dtx pays one round-trip instead of one per
/// shard.
async fn lock_all(
    shards: &[Arc<dyn ShardClient>],
    owning: &[usize],
    dtx_id: Hash,
    ctx: &Ctx,
    retry: RetryPolicy,
) -> Vec<Result<(), uhsledger_locking_shard::LockError>> {
    let calls = owning.iter().map(|&i| async move {
        let results = with_retry(retry, || shards[i].lock_outputs(dtx_id, std::slice::from_ref(ctx))).await;
        results.into_iter().next().expect("lock_outputs returns one result per ctx")
    });
    join_all(calls).await
}

/// Step 4: fans `apply_outputs` out to every owning shard concurrently.
async fn apply_all(shards: &[Arc<dyn ShardClient>], owning: &[usize], dtx_id: Hash, ctx: &Ctx, complete: bool, retry: RetryPolicy) {
    let calls = owning
        .iter()
        .map(|&i| with_retry(retry, move || shards[i].apply_outputs(dtx_id, std::slice::from_ref(ctx), &[complete])));
    join_all(calls).await;
}

async fn discard_all<L>(
    log: &L,
    shards: &[Arc<dyn ShardClient>],
    owning: &[usize],
    dtx_id: Hash,
    retry: RetryPolicy,
) -> Result<(), CoordinatorError>
where
    L: ReplicatedLog<CoordinatorStateMachine>,
{
    // Step 5 precedes step 6: the discard decision must be durable on the
    // log before we start telling shards to forget the dtx, so a crash
    // mid-fan-out always resumes at step 6 on the new leader rather than
    // replaying step 4's apply_outputs.
    log.replicate(CoordinatorCommand::Discard { dtx_id }).await.map_err(|_| CoordinatorError::Timeout(dtx_id))?;
    // Step 6: the per-shard discard RPCs themselves have no ordering
    // constraint between each other, so they also fan out in parallel.
    let calls = owning.iter().map(|&i| with_retry(retry, move || shards[i].discard_dtx(dtx_id)));
    join_all(calls).await;
    Ok(())
}

/// Retries a fallible shard RPC forever with capped exponential backoff, per
/// spec.md §5's "transient shard failures retry forever" rule — the protocol
/// is idempotent end to end, so a retry is always safe.
pub(crate) async fn with_retry<T, F, Fut>(retry: RetryPolicy, mut f: F) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, uhsledger_replog::ReplogError>>,
{
    let mut delay = Duration::ZERO;
    loop {
        match f().await {
            Ok(v) => return v,
            Err(err) => {
                delay = retry.next_delay(delay);
                tracing::warn!(error = %err, delay_ms = delay.as_millis() as u64, "shard unreachable, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
