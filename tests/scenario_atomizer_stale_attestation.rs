//! spec.md §8 scenario 4, driven through the replicated atomizer state
//! machine (rather than the bare `Atomizer` the crate's own unit tests use):
//! K=2, height 10, an aggregate whose oldest attestation is height 7 is
//! rejected as out of the spent-cache's provable range.

use std::sync::Arc;

use uhsledger_atomizer::{AtomizerCommand, AtomizerResponse, AtomizerStateMachine, CompleteAggregate, TxError};
use uhsledger_primitives::{BlockHeight, Ctx, Epoch, Hash, Input, Output};
use uhsledger_replog::{FileSnapshotStore, LocalReplicatedLog, ReplicatedLog};

fn ctx_spending(id_byte: u8) -> Ctx {
    Ctx::new(
        vec![Input { id: Hash::from_bytes([id_byte; 32]) }],
        vec![Output { owner_uhs_id: Hash::from_bytes([0xaa; 32]), value: 1 }],
        vec![],
        Epoch(0),
    )
}

#[tokio::test]
async fn stale_attestation_rejected_through_the_replicated_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileSnapshotStore::new(dir.path()).expect("snapshot store"));
    let log = LocalReplicatedLog::new(AtomizerStateMachine::new(2), store);

    for _ in 0..10 {
        log.replicate(AtomizerCommand::MakeBlock).await.unwrap();
    }

    let (_, resp) = log
        .replicate(AtomizerCommand::InsertComplete(vec![CompleteAggregate {
            ctx: ctx_spending(9),
            oldest_attestation: BlockHeight(7),
        }]))
        .await
        .unwrap();

    let AtomizerResponse::Inserted(errors) = resp else { panic!("expected Inserted") };
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], TxError::StxoRange(_)));
}
