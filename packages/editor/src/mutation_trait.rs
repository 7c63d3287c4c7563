/// A recorded edit that can be replayed in both directions.
///
/// An edit is produced by a successful, validated command and carries
/// everything needed to invert it. Replays are infallible: the history only
/// ever replays the most recent edit against the state it left behind, so a
/// failing replay means the document and its history disagree, which is a
/// bug and panics.
pub trait Reversible {
    /// What the edit was applied to.
    type Target;

    /// Restore the target to the state before this edit.
    fn undo(&mut self, target: &mut Self::Target);

    /// Re-apply this edit after it was undone.
    fn redo(&mut self, target: &mut Self::Target);

    /// Command line describing the edit, e.g. `delete book1`.
    fn description(&self) -> String;

    /// True when applying left the target exactly as it was. Such edits
    /// are never recorded.
    fn is_noop(&self) -> bool {
        false
    }
}
