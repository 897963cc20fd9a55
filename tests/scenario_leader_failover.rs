//! spec.md §4.5/§8: a coordinator leader crashes after durably recording a
//! commit decision but before driving it into the shards. The newly elected
//! leader's `recover()` must finish the dtx — apply it to every owning shard,
//! then discard it — without the client ever resubmitting.

use std::sync::Arc;

use harness::{sentinel_key, uhs_id, Harness};
use uhsledger_config::RetryPolicy;
use uhsledger_coordinator::{recover, CoordinatorCommand, CoordinatorStateMachine, ShardClient};
use uhsledger_primitives::{Attestation, Ctx, Epoch, Hash, Input, Output, UhsElement};
use uhsledger_replog::{FileSnapshotStore, ReplicaSet, ReplicatedLog};

#[tokio::test]
async fn crash_after_commit_is_completed_by_the_new_leader() {
    let from = uhs_id(1);
    let to = uhs_id(2);
    let h = Harness::new(1, [(from, UhsElement::new(10, Epoch(0)))]);

    let mut stores = Vec::new();
    let mut sms = Vec::new();
    let mut _dirs = Vec::new();
    for _ in 0..3 {
        let dir = tempfile::tempdir().expect("tempdir");
        sms.push(CoordinatorStateMachine::new(1024));
        stores.push(Arc::new(FileSnapshotStore::new(dir.path()).expect("snapshot store")) as Arc<dyn uhsledger_replog::SnapshotStore>);
        _dirs.push(dir);
    }
    let set = ReplicaSet::new(sms, stores);
    let leader = set.handle(0);

    let ctx = Ctx::new(
        vec![Input { id: from }],
        vec![Output { owner_uhs_id: to, value: 10 }],
        vec![Attestation { signer: sentinel_key(1).public(), signature: vec![0] }],
        Epoch(1),
    );
    let dtx_id = Hash::digest(b"failover-dtx");

    // Prepare and commit are durably recorded on the old leader, and the
    // shard has already locked the inputs (step 2 of spec.md §4.5) — only
    // the apply/discard fan-out (steps 4-6) is interrupted by the crash.
    leader.replicate(CoordinatorCommand::Prepare { dtx_id, ctxs: vec![ctx.clone()] }).await.unwrap();
    let lock_results = h.shards[0].lock_outputs(dtx_id, &[ctx.clone()]).await.unwrap();
    assert_eq!(lock_results, vec![Ok(())]);
    leader.replicate(CoordinatorCommand::Commit { dtx_id, complete: vec![true] }).await.unwrap();

    // ...then it crashes before step 4 (apply_outputs) or step 5 (discard) ever run.
    set.resign_leadership();
    assert!(leader.replicate(CoordinatorCommand::Discard { dtx_id }).await.is_err());

    set.force_elect(1);
    let new_leader = set.handle(1);

    recover(&new_leader, &h.shards, RetryPolicy::DEFAULT).await;

    h.shard_log.read_state(|sm| {
        assert!(sm.shard().is_spent(&from), "recovery must finish applying the committed dtx");
        assert!(!sm.shard().is_unspent(&from));
    });
    new_leader.read_state(|sm| {
        assert!(sm.committed_dtxs().is_empty(), "recovery must discard the dtx once every shard has applied it");
    });
}
