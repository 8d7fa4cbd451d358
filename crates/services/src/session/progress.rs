/// Aggregated view of progress through the question list, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProgress {
    pub total: usize,
    /// 1-based position of the question being shown; 0 for an empty set.
    pub position: usize,
    /// Completion fraction in `[0, 1]`; exactly 0.0 for an empty set.
    pub fraction: f64,
}
