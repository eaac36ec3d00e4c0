use crate::comm::Tag;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommError {
    /// The peer hung up (or never existed) while we were waiting on it.
    #[error("role {peer} disconnected")]
    Disconnected { peer: usize },

    #[error("role {peer} sent {actual} coefficients on {tag}, expected {expected}")]
    LengthMismatch {
        peer: usize,
        tag: Tag,
        expected: usize,
        actual: usize,
    },

    /// A header arrived where coefficients were expected, or the other way around.
    #[error("unexpected frame from role {peer} on {tag}")]
    UnexpectedFrame { peer: usize, tag: Tag },

    #[error("rank {rank} out of range for {size} roles")]
    InvalidRank { rank: usize, size: usize },

    #[error("role {rank} panicked")]
    RolePanicked { rank: usize },

    #[error("a role left instead of reaching the barrier")]
    BarrierAbandoned,
}
