use segfit::{AllocError, Arena, Heap, HeapConfig, Payload, VecArena, CHUNK_SIZE, PREFIX_SIZE};

mod common;

fn overlaps(heap: &Heap, a: Payload, b: Payload) -> bool {
    let a_end = a.offset() + heap.usable_size(a).unwrap();
    let b_end = b.offset() + heap.usable_size(b).unwrap();

    a.offset() < b_end && b.offset() < a_end
}

#[test]
fn new_heap_is_consistent() {
    let heap = Heap::new().unwrap();

    assert!(heap.check());
    assert_eq!(heap.low_bound(), 0);
    assert_eq!(heap.high_bound(), heap.current_size());
    assert_eq!(heap.current_size(), PREFIX_SIZE + CHUNK_SIZE);
}

#[test]
fn payloads_are_aligned() {
    let mut heap = Heap::new().unwrap();

    for size in 1..300 {
        let ptr = heap.allocate(size).unwrap();

        assert_eq!(ptr.offset() % 8, 0);
    }

    assert!(heap.check());
}

#[test]
fn live_payloads_never_overlap() {
    common::init_logging();

    let mut heap = Heap::new().unwrap();
    let mut live = vec![];

    for i in 0..200 {
        live.push(heap.allocate(1 + (i * 37) % 500).unwrap());

        if i % 3 == 0 {
            let ptr = live.remove(i % live.len());
            heap.release(ptr).unwrap();
        }
    }

    for (i, &a) in live.iter().enumerate() {
        for &b in &live[i + 1..] {
            assert!(!overlaps(&heap, a, b));
        }
    }

    assert!(heap.check());
}

#[test]
fn coalesced_space_is_refit_without_growing() {
    common::init_logging();

    for order in [[0, 1], [1, 0]] {
        let mut heap = Heap::new().unwrap();
        let blocks = [
            heap.allocate(40).unwrap(),
            heap.allocate(40).unwrap(),
            heap.allocate(40).unwrap(),
        ];
        let size = heap.current_size();

        // Fill the rest of the chunk so the refit can't come from the tail.
        let rest = heap.blocks().last().unwrap().size;
        heap.allocate(rest - 32).unwrap();

        for i in order {
            heap.release(blocks[i]).unwrap();
        }

        assert!(heap.check());

        // A and B were 72 byte blocks each.
        let refit = heap.allocate(144 - 32).unwrap();

        assert_eq!(refit, blocks[0]);
        assert_eq!(heap.current_size(), size);
        assert!(heap.check());
    }
}

#[test]
fn realloc_preserves_data() {
    let mut heap = Heap::new().unwrap();
    let pattern: Vec<u8> = (0..100u8).collect();
    let ptr = heap.allocate(100).unwrap();

    heap.payload_mut(ptr).unwrap()[..100].copy_from_slice(&pattern);

    let ptr = heap.reallocate(Some(ptr), 200).unwrap();
    assert_eq!(&heap.payload(ptr).unwrap()[..100], &pattern[..]);

    let ptr = heap.reallocate(Some(ptr), 50).unwrap();
    assert_eq!(&heap.payload(ptr).unwrap()[..50], &pattern[..50]);

    assert!(heap.check());
}

#[test]
fn realloc_to_zero_makes_space_reusable() {
    let mut heap = Heap::new().unwrap();
    let ptr = heap.allocate(256).unwrap();
    let _next = heap.allocate(16).unwrap();
    let size = heap.current_size();

    assert_eq!(heap.reallocate(Some(ptr), 0), None);
    assert!(heap.check());

    assert_eq!(heap.allocate(256), Some(ptr));
    assert_eq!(heap.current_size(), size);
}

#[test]
fn errors_describe_themselves() {
    assert_eq!(AllocError::OutOfMemory.to_string(), "arena could not grow");
    assert_eq!(AllocError::DoubleFree.to_string(), "block is already free");
}

#[test]
fn runs_out_of_memory_at_the_cap() {
    common::init_logging();

    let config = HeapConfig {
        max_heap_size: 64 * 1024,
        ..HeapConfig::default()
    };
    let mut heap = Heap::with_config(config).unwrap();
    let mut count = 0;

    while heap.allocate(1000).is_some() {
        count += 1;
    }

    assert!(count > 50);
    assert_eq!(heap.arena().max_size(), 64 * 1024);
    assert!(heap.current_size() <= heap.arena().max_size());
    assert_eq!(heap.try_allocate(1000), Err(AllocError::OutOfMemory));
    assert!(heap.check());
}

// An arena that lends out a fixed number of growths before refusing.
struct Rationed {
    inner: VecArena,
    growths_left: usize,
}

impl Arena for Rationed {
    fn grow(&mut self, increment: usize) -> Result<usize, AllocError> {
        if self.growths_left == 0 {
            return Err(AllocError::OutOfMemory);
        }

        self.growths_left -= 1;
        self.inner.grow(increment)
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn bytes(&self) -> &[u8] {
        self.inner.bytes()
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.inner.bytes_mut()
    }
}

#[test]
fn custom_arenas_back_a_heap() {
    common::init_logging();

    let arena = Rationed {
        inner: VecArena::default(),
        growths_left: 2,
    };
    let mut heap = Heap::from_arena(arena, HeapConfig::default()).unwrap();

    // The prefix and the first chunk used both growths.
    assert!(heap.allocate(CHUNK_SIZE / 2).is_some());
    assert_eq!(heap.try_allocate(CHUNK_SIZE), Err(AllocError::OutOfMemory));
    assert_eq!(heap.metrics().failed_allocations, 1);
    assert!(heap.check());
}

#[test]
fn heaps_are_independent() {
    let mut first = Heap::new().unwrap();
    let mut second = Heap::new().unwrap();

    let a = first.allocate(64).unwrap();
    let b = second.allocate(64).unwrap();

    first.payload_mut(a).unwrap().fill(1);
    second.payload_mut(b).unwrap().fill(2);

    assert!(first.payload(a).unwrap().iter().all(|&byte| byte == 1));
    assert!(second.payload(b).unwrap().iter().all(|&byte| byte == 2));
}

#[test]
fn bad_configs_are_refused_before_any_growth() {
    let config = HeapConfig {
        chunk_size: 12,
        ..HeapConfig::default()
    };

    assert!(matches!(Heap::with_config(config), Err(AllocError::BadConfig)));
    assert_eq!(AllocError::BadConfig.to_string(), "invalid heap config");
}
