//! spec.md §8 scenario 5, exercised across the atomizer-controller /
//! atomizer crate boundary: a two-input ctx that only ever attests one
//! input is evicted as `TxError::Incomplete` once its eviction window
//! elapses, and never reaches the replicated atomizer's pending set.

use std::sync::Arc;
use std::time::Duration;

use uhsledger_atomizer::{AtomizerStateMachine, TxError};
use uhsledger_atomizer_controller::{create_controller_task, TxNotify};
use uhsledger_config::AtomizerConfig;
use uhsledger_primitives::{BlockHeight, Ctx, Epoch, Hash, Input, Output};
use uhsledger_replog::{FileSnapshotStore, LocalReplicatedLog};

fn two_input_ctx() -> Ctx {
    Ctx::new(
        vec![Input { id: Hash::from_bytes([1; 32]) }, Input { id: Hash::from_bytes([2; 32]) }],
        vec![Output { owner_uhs_id: Hash::from_bytes([9; 32]), value: 1 }],
        vec![],
        Epoch(0),
    )
}

#[tokio::test(start_paused = true)]
async fn ctx_missing_one_attestation_is_evicted_not_sealed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileSnapshotStore::new(dir.path()).expect("snapshot store"));
    let log = Arc::new(LocalReplicatedLog::new(AtomizerStateMachine::new(4), store));

    let config = AtomizerConfig { spent_cache_depth: 4, eviction_window: 2 };
    let (handle, task) = create_controller_task(log, config, Duration::from_millis(10));
    let mut errors = handle.subscribe_errors();
    let mut blocks = handle.subscribe_blocks();
    tokio::spawn(task);

    let ctx = two_input_ctx();
    handle.notify(TxNotify { ctx: ctx.clone(), attestations: vec![(0, BlockHeight(0))] }).await;

    tokio::time::advance(Duration::from_millis(35)).await;
    assert_eq!(errors.recv().await.unwrap(), TxError::Incomplete(ctx.id));

    // The sealed blocks along the way never contain the never-completed ctx.
    while let Ok(block) = blocks.try_recv() {
        assert!(!block.transactions.iter().any(|t| t.id == ctx.id));
    }
}
