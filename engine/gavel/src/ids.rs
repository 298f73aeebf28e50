use std::sync::atomic::{AtomicU64, Ordering};

use crate::OrderId;

/// Monotonic order-id source shared between the ingress adapters and the
/// engine loop. Lock-free so the submission channel can reply with the
/// assigned id at enqueue time; uniqueness survives restarts because the
/// snapshot records the high-water mark.
#[derive(Debug)]
pub struct OrderIdAllocator {
    next: AtomicU64,
}

impl OrderIdAllocator {
    pub fn starting_at(next: OrderId) -> Self {
        Self { next: AtomicU64::new(next) }
    }

    /// Current value, then post-increment.
    #[inline]
    pub fn allocate(&self) -> OrderId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Next id that would be handed out; this is what snapshots persist.
    #[inline]
    pub fn current(&self) -> OrderId {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn allocation_is_monotonic() {
        let ids = OrderIdAllocator::starting_at(5);
        assert_eq!(ids.allocate(), 5);
        assert_eq!(ids.allocate(), 6);
        assert_eq!(ids.current(), 7);
    }

    #[test]
    fn concurrent_allocation_stays_unique() {
        let ids = Arc::new(OrderIdAllocator::starting_at(1));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let ids = ids.clone();
            handles.push(thread::spawn(move || {
                (0..250).map(|_| ids.allocate()).collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<OrderId> = Vec::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(ids.current(), 1001);
    }
}
