use uuid::Uuid;

/// A versioned record in a local-first collection.
///
/// Every entity the store manages carries a stable identity, a monotonically
/// increasing revision counter, and the id of the device that last wrote it.
/// The revision starts at 1 on creation and goes up by exactly one on every
/// accepted mutation. The device id is only ever a merge tie-breaker, never
/// an ownership check.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable identity, immutable for the record's lifetime.
    fn id(&self) -> Uuid;

    /// Current revision, starting at 1.
    fn revision(&self) -> u64;

    /// Device that last wrote the record.
    fn device_id(&self) -> &str;

    /// Rank used to break equal-revision merge conflicts. Higher wins.
    ///
    /// Records without a lifecycle status have nothing to compare and stay
    /// at 0, falling through to the device-id tie-break.
    fn merge_rank(&self) -> u8 {
        0
    }
}
