use segfit::{Heap, Trace, TraceOp};

mod common;

const SHORT: &str = include_str!("../demos/replay/traces/short.rep");
const BINARY: &str = include_str!("../demos/replay/traces/binary.rep");

#[test]
fn short_trace_replays_cleanly() {
    common::init_logging();

    let trace = Trace::parse(SHORT).unwrap();
    let mut heap = Heap::new().unwrap();
    let stats = trace.replay(&mut heap).unwrap();

    assert_eq!(stats.ops, 12);
    assert_eq!(heap.blocks().len(), 1);
    assert!(heap.check());
}

#[test]
fn binary_trace_reuses_the_freed_holes() {
    common::init_logging();

    let trace = Trace::parse(BINARY).unwrap();
    let mut heap = Heap::new().unwrap();

    assert_eq!(trace.ops().next(), Some(TraceOp::Alloc { id: 0, size: 64 }));

    let stats = trace.replay(&mut heap).unwrap();

    // 4 * (64 + 448) bytes of payload fit comfortably in the first chunk.
    assert_eq!(stats.heap_size, segfit::PREFIX_SIZE + segfit::CHUNK_SIZE);
    assert_eq!(heap.metrics().arena_growths, 1);
    assert!(stats.utilization > 0.4);
}
