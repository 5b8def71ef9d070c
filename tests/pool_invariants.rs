//! Property tests for buffer pool bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use blockpool::{BlockId, BufferPool, BufferPoolConfig, MemoryBlockStore, MemoryLog, PinnedBuffer};
use proptest::prelude::*;

const POOL_SIZE: usize = 3;
const BLOCKS: u64 = 6;

#[derive(Debug, Clone)]
enum Op {
    Pin(u64),
    Unpin(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..BLOCKS).prop_map(Op::Pin),
        (0..BLOCKS).prop_map(Op::Unpin),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bookkeeping_holds_for_any_sequence(ops in proptest::collection::vec(op(), 1..40)) {
        let config = BufferPoolConfig::default()
            .with_pool_size(POOL_SIZE)
            .with_block_size(64)
            .with_pin_timeout(Duration::from_millis(1));
        let pool = BufferPool::new(
            config,
            Arc::new(MemoryBlockStore::new(64)),
            Arc::new(MemoryLog::new()),
        );
        let mut held: HashMap<u64, PinnedBuffer<'_>> = HashMap::new();

        for op in ops {
            match op {
                Op::Pin(i) => {
                    let result = pool.pin(&BlockId::new("p", i));
                    // A block we already hold, or a full pool, must be refused.
                    let must_fail = held.contains_key(&i) || held.len() == POOL_SIZE;
                    prop_assert_eq!(result.is_err(), must_fail);
                    if let Ok(pinned) = result {
                        held.insert(i, pinned);
                    }
                }
                Op::Unpin(i) => {
                    if let Some(pinned) = held.remove(&i) {
                        pool.unpin(pinned);
                    }
                }
            }

            let status = pool.status();
            prop_assert_eq!(pool.available() + held.len(), POOL_SIZE);
            prop_assert!(status.resident.len() <= POOL_SIZE);

            let mut blocks: Vec<_> = status.resident.iter().map(|(_, b, _)| b.clone()).collect();
            blocks.sort();
            blocks.dedup();
            prop_assert_eq!(blocks.len(), status.resident.len());

            for (i, pinned) in &held {
                prop_assert_eq!(pool.pin_count(&BlockId::new("p", *i)), Some(1));
                prop_assert_eq!(pinned.block_id(), &BlockId::new("p", *i));
            }
        }
    }
}
