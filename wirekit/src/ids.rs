//! Connection Id Generation
//!
//! Injected capability so that stores and canvas controllers never mint
//! ids from wall-clock time directly; batch-accepting several suggestions
//! in the same millisecond must not collide, and tests need predictable
//! ids.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh connection ids.
pub trait IdGenerator: Send + Sync {
    fn next(&self) -> String;
}

/// Default generator backed by UUID v4.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next(&self) -> String {
        format!("conn-{}", uuid::Uuid::new_v4())
    }
}

/// Deterministic generator for tests: `conn-1`, `conn-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("conn-{n}")
    }
}
