use thiserror::Error;

/// Errors reported by arena operations and container accessors.
///
/// Every failure is synchronous and surfaces at the operation that caused
/// it; nothing retries internally. A failed allocation never produces a
/// partially-linked structure, so a caller may retry with a larger buffer
/// or settle for a truncated view.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An allocation request exceeded the remaining arena space.
    #[error("arena space exhausted: {needed} bytes needed, {remaining} remaining")]
    OutOfSpace { needed: usize, remaining: usize },

    /// A container was indexed past its declared size, or a map key was
    /// absent.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// `copy_from` with a destination smaller than the source's used size.
    #[error("destination capacity {capacity} smaller than source used size {used}")]
    DestinationTooSmall { used: u16, capacity: u16 },

    /// A buffer shorter than the record layout it was asked to hold.
    #[error("buffer of {len} bytes too small, {needed} needed")]
    BufferTooSmall { len: usize, needed: usize },

    /// A buffer whose base address is insufficiently aligned.
    #[error("buffer not aligned to {align} bytes")]
    Misaligned { align: usize },

    /// A capacity request beyond what the offset width can address.
    #[error("capacity {requested} exceeds the {max}-byte arena ceiling")]
    CapacityTooLarge { requested: usize, max: usize },

    /// A projection designated a field outside the arena's buffer.
    #[error("projected field lies outside the arena buffer")]
    ForeignField,

    /// An allocation of zero bytes.
    #[error("zero-sized allocation")]
    ZeroSized,
}
