//! spec.md §8 scenario 1, end to end: a client transaction enters through a
//! sentinel, passes static checks, and is confirmed by the coordinator
//! against a preseeded locking shard.

use harness::{sentinel_key, transfer, uhs_id, Harness};
use uhsledger_config::{RetryPolicy, SentinelConfig};
use uhsledger_primitives::{Epoch, UhsElement};
use uhsledger_replog::ReplicatedLog;
use uhsledger_sentinel::{ExecuteStatus, Sentinel};

#[tokio::test]
async fn single_transfer_confirms_and_moves_value() {
    let from = uhs_id(1);
    let to = uhs_id(2);
    let h = Harness::new(1, [(from, UhsElement::new(10, Epoch(0)))]);

    let coordinator = uhsledger_sentinel::LocalCoordinatorClient::new(h.coordinator_log.clone(), h.shards.clone(), RetryPolicy::DEFAULT);
    let sentinel = Sentinel::new(sentinel_key(1), SentinelConfig::DEFAULT);

    let (status, err) = sentinel.execute_request(transfer(from, 10, to), Epoch(1), &coordinator).await;
    assert_eq!(status, ExecuteStatus::Confirmed);
    assert!(err.is_none());

    h.shard_log.read_state(|sm| {
        assert!(sm.shard().is_spent(&from));
        assert!(!sm.shard().is_unspent(&from));
        assert_eq!(sm.shard().unspent_value_sum(), 10);
    });
}
