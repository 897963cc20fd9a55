/// A deterministic state machine driven by a [`crate::ReplicatedLog`].
/// Mirrors `state_machine.cpp`'s `commit(log_idx, data)` dispatch: every
/// committed log entry is applied exactly once, in log order, and produces a
/// response the log hands back to whichever caller is waiting on it.
pub trait StateMachine: Send {
    type Command: Send + Sync + Clone + 'static;
    type Response: Send + 'static;

    /// Applies the command committed at `log_index`. Must be deterministic:
    /// given the same sequence of `(log_index, command)` pairs, every replica
    /// must reach the same state and produce the same responses.
    fn apply(&mut self, log_index: u64, cmd: Self::Command) -> Self::Response;

    /// Serializes the full state for a snapshot, paired with the log index
    /// of the last command folded into it.
    fn snapshot(&self) -> Vec<u8>;

    /// Replaces the state machine's state with a previously-saved snapshot.
    fn restore(&mut self, bytes: &[u8]);
}
