/// LlrbError enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum LlrbError<K>
where
    K: Clone,
{
    /// Fatal case, two consecutive red links on the same path.
    ConsecutiveReds,
    /// Fatal case, a red link hanging as a right child.
    RightLeaningRed,
    /// Fatal case, number of black links differ between left and right
    /// child. The String component can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order, (child, parent).
    SortError(K, K),
    /// Fatal case, a child whose parent back-reference does not point
    /// at the node that owns it.
    BrokenParentLink,
    /// Returned by create() API when key is already present.
    OverwriteKey,
}
