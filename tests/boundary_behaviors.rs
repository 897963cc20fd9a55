//! Boundary and edge-case behaviors from spec.md §5/§7 that the concrete
//! scenario tests don't each cover on their own.

use std::sync::Arc;

use harness::{sentinel_key, transfer, uhs_id, Harness};
use uhsledger_config::{RetryPolicy, SentinelConfig};
use uhsledger_coordinator::{execute_transaction, CoordinatorError, CoordinatorStateMachine, ShardClient};
use uhsledger_locking_shard::LockError;
use uhsledger_primitives::{Attestation, Ctx, Epoch, Hash, Input, Output, UhsElement};
use uhsledger_replog::{FileSnapshotStore, ReplicaSet, SnapshotStore};
use uhsledger_sentinel::{ExecuteStatus, FullTx, FullTxInput, LocalCoordinatorClient, Sentinel};

fn attested_with(n: usize, inputs: Vec<Input>, outputs: Vec<Output>) -> Ctx {
    let attestations = (0..n)
        .map(|i| Attestation { signer: Hash::from_bytes([i as u8; 32]), signature: vec![i as u8] })
        .collect();
    Ctx::new(inputs, outputs, attestations, Epoch(1))
}

#[tokio::test]
async fn attestation_threshold_boundary() {
    let input_id = uhs_id(1);
    let h = Harness::new(3, [(input_id, UhsElement::new(10, Epoch(0)))]);
    let shard = &h.shards[0];

    let outputs = vec![Output { owner_uhs_id: uhs_id(2), value: 10 }];
    let below = attested_with(2, vec![Input { id: input_id }], outputs.clone());
    let results = shard.lock_outputs(Hash::digest(b"below"), &[below.clone()]).await.unwrap();
    assert_eq!(
        results,
        vec![Err(LockError::InsufficientAttestations { ctx: below.id, have: 2, required: 3 })]
    );

    let at_threshold = attested_with(3, vec![Input { id: input_id }], outputs);
    let results = shard.lock_outputs(Hash::digest(b"at-threshold"), &[at_threshold]).await.unwrap();
    assert_eq!(results, vec![Ok(())]);
}

#[tokio::test]
async fn discard_dtx_for_a_dtx_id_never_prepared_is_a_no_op() {
    let h = Harness::new(1, Vec::<(Hash, UhsElement)>::new());
    let shard = &h.shards[0];
    shard.discard_dtx(Hash::digest(b"never-prepared")).await.unwrap();
}

#[tokio::test]
async fn sentinel_rejects_inputs_over_the_configured_bound() {
    let cfg = SentinelConfig { max_inputs: 2, max_outputs: 2 };
    let sentinel = Sentinel::new(sentinel_key(1), cfg);
    let h = Harness::new(1, Vec::<(Hash, UhsElement)>::new());
    let coordinator = LocalCoordinatorClient::new(h.coordinator_log.clone(), h.shards.clone(), RetryPolicy::DEFAULT);

    let too_many = FullTx {
        inputs: vec![
            FullTxInput { uhs_id: uhs_id(1), value: 1 },
            FullTxInput { uhs_id: uhs_id(2), value: 1 },
            FullTxInput { uhs_id: uhs_id(3), value: 1 },
        ],
        outputs: vec![Output { owner_uhs_id: uhs_id(9), value: 3 }],
    };
    let (status, err) = sentinel.execute_request(too_many, Epoch(0), &coordinator).await;
    assert_eq!(status, ExecuteStatus::StaticInvalid);
    assert!(matches!(err, Some(uhsledger_sentinel::SentinelError::TooManyInputs { have: 3, max: 2 })));

    let at_bound = transfer(uhs_id(4), 5, uhs_id(5));
    assert!(uhsledger_sentinel::check_static_validity(&at_bound, &cfg).is_ok());
}

#[tokio::test]
async fn a_non_leader_coordinator_replica_rejects_execute() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileSnapshotStore::new(dir.path()).expect("snapshot store")) as Arc<dyn SnapshotStore>;
    let set = ReplicaSet::new(vec![CoordinatorStateMachine::new(8)], vec![store]);
    set.resign_leadership();
    let follower = set.handle(0);

    let h = Harness::new(1, [(uhs_id(1), UhsElement::new(10, Epoch(0)))]);
    let ctx = attested_with(1, vec![Input { id: uhs_id(1) }], vec![Output { owner_uhs_id: uhs_id(2), value: 10 }]);

    let result = execute_transaction(&follower, &h.shards, RetryPolicy::DEFAULT, ctx).await;
    assert!(matches!(result, Err(CoordinatorError::NotLeader)));
}
