/// Lifecycle of a future instance.
///
/// Every transition happens under the instance mutex and is checked against
/// the current state, so a stale caller fails with
/// [`Error::InvalidState`](crate::Error::InvalidState) instead of corrupting
/// the slot.
///
/// ```text
/// Pending --complete--> Completed --take/read--> Consumed
/// Pending | Completed --destroy--> Destroyed
/// ```
///
/// `Consumed` and `Destroyed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, not yet completed. The slot is empty.
    Pending,
    /// Completed exactly once. The slot holds the value.
    Completed,
    /// The value has been moved out. Terminal.
    Consumed,
    /// Explicitly invalidated. Terminal.
    Destroyed,
}

impl Lifecycle {
    /// Returns true for states no operation can leave.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::Consumed | Lifecycle::Destroyed)
    }
}
