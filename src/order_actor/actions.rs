/// Order operations beyond plain field updates.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Soft transition to `canceled`. Repeating it on a canceled order is a no-op.
    Cancel,
}
