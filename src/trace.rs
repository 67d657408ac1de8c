//! Replaying allocation traces.
//!
//! A trace starts with four numbers: a suggested heap size, the number of
//! distinct ids, the number of operations, and a weight. Each remaining line
//! is one operation:
//!
//! ```text
//! a <id> <bytes>    allocate
//! r <id> <bytes>    reallocate
//! f <id>            free
//! ```
use crate::allocator::{Arena, Heap, Payload};
use crate::error::TraceError;
use crate::logging;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceOp {
    Alloc { id: usize, size: usize },
    Realloc { id: usize, size: usize },
    Free { id: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    suggested_heap_size: usize,
    num_ids: usize,
    weight: usize,
    // (line, op)
    ops: Vec<(usize, TraceOp)>,
}

/// What a replay observed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReplayStats {
    pub ops: usize,
    /// The most bytes callers had requested at any one time.
    pub peak_requested: usize,
    pub heap_size: usize,
    /// `peak_requested / heap_size`: how well the heap packed the trace.
    pub utilization: f64,
}

#[derive(Copy, Clone)]
struct Live {
    ptr: Payload,
    size: usize,
}

// The byte every live payload is filled with, derived from its id.
fn fill_byte(id: usize) -> u8 {
    (id as u8).wrapping_mul(31).wrapping_add(7)
}

fn parse_number(
    line: usize,
    token: Option<&str>,
    reason: &'static str,
) -> Result<usize, TraceError> {
    token
        .and_then(|token| token.parse().ok())
        .ok_or(TraceError::Parse { line, reason })
}

impl Trace {
    pub fn parse(text: &str) -> Result<Trace, TraceError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let mut header = [0; 4];
        for value in header.iter_mut() {
            let (line, text) = lines.next().ok_or(TraceError::Parse {
                line: 0,
                reason: "trace header is incomplete",
            })?;

            *value = parse_number(line, Some(text), "expected a number")?;
        }

        let [suggested_heap_size, num_ids, num_ops, weight] = header;
        let mut ops = Vec::with_capacity(num_ops.min(1 << 16));

        for (line, text) in lines {
            let mut tokens = text.split_whitespace();
            let kind = tokens.next();
            let id = parse_number(line, tokens.next(), "expected an id")?;

            if id >= num_ids {
                return Err(TraceError::Parse {
                    line,
                    reason: "id is out of range",
                });
            }

            let op = match kind {
                Some("a") => TraceOp::Alloc {
                    id,
                    size: parse_number(line, tokens.next(), "expected a size")?,
                },
                Some("r") => TraceOp::Realloc {
                    id,
                    size: parse_number(line, tokens.next(), "expected a size")?,
                },
                Some("f") => TraceOp::Free { id },
                _ => {
                    return Err(TraceError::Parse {
                        line,
                        reason: "unknown operation",
                    })
                }
            };

            ops.push((line, op));
        }

        if ops.len() != num_ops {
            return Err(TraceError::Parse {
                line: 0,
                reason: "operation count does not match the header",
            });
        }

        Ok(Trace {
            suggested_heap_size,
            num_ids,
            weight,
            ops,
        })
    }

    pub fn suggested_heap_size(&self) -> usize {
        self.suggested_heap_size
    }

    /// Every id in the trace is below this.
    pub fn num_ids(&self) -> usize {
        self.num_ids
    }

    pub fn weight(&self) -> usize {
        self.weight
    }

    pub fn ops(&self) -> impl Iterator<Item = TraceOp> + '_ {
        self.ops.iter().map(|(_, op)| *op)
    }

    /// Runs the trace against `heap`.
    ///
    /// Every live payload is filled with a byte derived from its id and
    /// checked again before it is reallocated or freed, so overlapping blocks
    /// or a bad copy show up as [`TraceError::Corrupted`]. When the heap's
    /// config asks for it, the heap is verified after every operation.
    pub fn replay<A: Arena>(&self, heap: &mut Heap<A>) -> Result<ReplayStats, TraceError> {
        let check = heap.config().check_on_replay;
        let mut live: Vec<Option<Live>> = vec![None; self.num_ids];
        let mut requested = 0;
        let mut peak_requested = 0;

        for &(line, op) in &self.ops {
            match op {
                TraceOp::Alloc { id, size } => {
                    let ptr = heap
                        .try_allocate(size)
                        .map_err(|error| TraceError::Alloc { line, error })?;

                    // An id reused without a free leaks its old block.
                    if let Some(old) = live[id] {
                        requested -= old.size;
                    }

                    fill(heap, ptr, id, size, line)?;
                    live[id] = Some(Live { ptr, size });
                    requested += size;
                }
                TraceOp::Realloc { id, size } => {
                    let old = live[id].ok_or(TraceError::UnknownId { line, id })?;

                    verify(heap, old, id, line)?;

                    let ptr = heap
                        .try_reallocate(Some(old.ptr), size)
                        .map_err(|error| TraceError::Alloc { line, error })?;

                    requested -= old.size;
                    live[id] = match ptr {
                        Some(ptr) => {
                            let kept = Live { ptr, size: old.size.min(size) };

                            verify(heap, kept, id, line)?;
                            fill(heap, ptr, id, size, line)?;
                            requested += size;

                            Some(Live { ptr, size })
                        }
                        None => None,
                    };
                }
                TraceOp::Free { id } => {
                    let old = live[id].ok_or(TraceError::UnknownId { line, id })?;

                    verify(heap, old, id, line)?;
                    heap.release(old.ptr)
                        .map_err(|error| TraceError::Alloc { line, error })?;

                    live[id] = None;
                    requested -= old.size;
                }
            }

            peak_requested = peak_requested.max(requested);

            if check {
                heap.verify()
                    .map_err(|violation| TraceError::Inconsistent { line, violation })?;
            }
        }

        let heap_size = heap.current_size();
        let utilization = peak_requested as f64 / heap_size as f64;

        logging::log_replay_done(self.ops.len(), utilization);

        Ok(ReplayStats {
            ops: self.ops.len(),
            peak_requested,
            heap_size,
            utilization,
        })
    }
}

fn fill<A: Arena>(
    heap: &mut Heap<A>,
    ptr: Payload,
    id: usize,
    size: usize,
    line: usize,
) -> Result<(), TraceError> {
    let payload = heap
        .payload_mut(ptr)
        .map_err(|error| TraceError::Alloc { line, error })?;

    payload[..size].fill(fill_byte(id));

    Ok(())
}

fn verify<A: Arena>(heap: &Heap<A>, live: Live, id: usize, line: usize) -> Result<(), TraceError> {
    let payload = heap
        .payload(live.ptr)
        .map_err(|error| TraceError::Alloc { line, error })?;

    if payload[..live.size].iter().all(|&byte| byte == fill_byte(id)) {
        Ok(())
    } else {
        Err(TraceError::Corrupted { line, id })
    }
}
