use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

use uhsledger_primitives::Epoch;

use crate::shard::LockingShard;

/// Outcome of one audit tick, matching `LockingShardResponse::Audited`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuditOutcome {
    pub ran: bool,
    pub summary: Option<u128>,
}

/// Runs the periodic audit: if `epoch` falls on the configured interval,
/// computes the unspent-value checksum, appends it to the audit log (if one
/// is configured), and prunes spent elements below `epoch`. Every other
/// epoch is a deliberate no-op, logged at debug level rather than treated as
/// an error — see `DESIGN.md`'s Open Question resolution on non-divisible
/// audit epochs.
pub fn run_audit(shard: &mut LockingShard, epoch: Epoch, interval: u64, log_path: Option<&Path>) -> io::Result<AuditOutcome> {
    if !epoch.is_divisible_by(interval) {
        tracing::debug!(epoch = epoch.0, interval, "epoch not on audit boundary, skipping");
        return Ok(AuditOutcome { ran: false, summary: None });
    }

    let summary = shard.unspent_value_sum();
    if let Some(path) = log_path {
        append_audit_line(path, epoch, summary)?;
    }
    shard.prune(epoch);
    tracing::info!(epoch = epoch.0, summary, "ran shard audit");
    Ok(AuditOutcome { ran: true, summary: Some(summary) })
}

fn append_audit_line(path: &Path, epoch: Epoch, summary: u128) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{} {:x}", epoch.0, summary)
}
