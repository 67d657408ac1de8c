use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// A request for zero bytes. Not a failure, there is simply nothing to hand out.
    ZeroSize,
    /// The request can't be described by any size class.
    TooLarge,
    /// The arena refused to grow.
    OutOfMemory,
    /// The pointer does not name a payload inside this heap.
    InvalidPointer,
    /// The pointer names a block that is already free.
    DoubleFree,
    /// The arena handed to the heap does not have a usable layout.
    CorruptArena,
    /// The heap config failed validation.
    BadConfig,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AllocError::ZeroSize => "zero sized allocation request",
            AllocError::TooLarge => "allocation request exceeds the largest size class",
            AllocError::OutOfMemory => "arena could not grow",
            AllocError::InvalidPointer => "pointer was not allocated by this heap",
            AllocError::DoubleFree => "block is already free",
            AllocError::CorruptArena => "arena layout is not usable",
            AllocError::BadConfig => "invalid heap config",
        };

        f.write_str(msg)
    }
}

impl std::error::Error for AllocError {}

/// The first broken invariant found by [`crate::Heap::verify`].
///
/// Offsets are relative to the arena's low bound.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeapViolation {
    BadPrologue,
    BadEpilogue { offset: usize },
    BadBlockSize { block: usize, size: usize },
    BlockOutOfBounds { block: usize, size: usize },
    TagMismatch { block: usize, header: u32, footer: u32 },
    AdjacentFree { first: usize, second: usize },
    AllocatedInList { block: usize, bucket: usize },
    WrongBucket { block: usize, bucket: usize, expected: Option<usize> },
    BrokenLink { block: usize, bucket: usize },
    UnlistedFree { listed: usize, walked: usize },
}

impl fmt::Display for HeapViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapViolation::BadPrologue => write!(f, "prologue block is damaged"),
            HeapViolation::BadEpilogue { offset } => {
                write!(f, "epilogue at {} is damaged", offset)
            }
            HeapViolation::BadBlockSize { block, size } => {
                write!(f, "block at {} has invalid size {}", block, size)
            }
            HeapViolation::BlockOutOfBounds { block, size } => {
                write!(f, "block at {} of size {} runs past the arena", block, size)
            }
            HeapViolation::TagMismatch {
                block,
                header,
                footer,
            } => write!(
                f,
                "block at {} has header {:#x} but footer {:#x}",
                block, header, footer
            ),
            HeapViolation::AdjacentFree { first, second } => {
                write!(f, "free blocks at {} and {} were not coalesced", first, second)
            }
            HeapViolation::AllocatedInList { block, bucket } => {
                write!(f, "allocated block at {} is listed in bucket {}", block, bucket)
            }
            HeapViolation::WrongBucket {
                block,
                bucket,
                expected,
            } => write!(
                f,
                "block at {} sits in bucket {} but belongs in {:?}",
                block, bucket, expected
            ),
            HeapViolation::BrokenLink { block, bucket } => {
                write!(f, "links around block at {} in bucket {} disagree", block, bucket)
            }
            HeapViolation::UnlistedFree { listed, walked } => write!(
                f,
                "{} free blocks are listed but the heap holds {}",
                listed, walked
            ),
        }
    }
}

impl std::error::Error for HeapViolation {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceError {
    Parse { line: usize, reason: &'static str },
    UnknownId { line: usize, id: usize },
    Corrupted { line: usize, id: usize },
    Inconsistent { line: usize, violation: HeapViolation },
    Alloc { line: usize, error: AllocError },
}

impl TraceError {
    pub fn line(&self) -> usize {
        match self {
            TraceError::Parse { line, .. }
            | TraceError::UnknownId { line, .. }
            | TraceError::Corrupted { line, .. }
            | TraceError::Inconsistent { line, .. }
            | TraceError::Alloc { line, .. } => *line,
        }
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Parse { line, reason } => write!(f, "line {}: {}", line, reason),
            TraceError::UnknownId { line, id } => {
                write!(f, "line {}: id {} is not live", line, id)
            }
            TraceError::Corrupted { line, id } => {
                write!(f, "line {}: payload of id {} was overwritten", line, id)
            }
            TraceError::Inconsistent { line, violation } => {
                write!(f, "line {}: heap check failed: {}", line, violation)
            }
            TraceError::Alloc { line, error } => write!(f, "line {}: {}", line, error),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Inconsistent { violation, .. } => Some(violation),
            TraceError::Alloc { error, .. } => Some(error),
            _ => None,
        }
    }
}
