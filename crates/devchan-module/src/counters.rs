use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Kinds of counted device calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Open,
    Close,
    Read,
    Write,
}

/// Per-channel call counters. Monotonic, never reset.
#[derive(Debug, Default)]
pub struct CallCounters {
    opens: AtomicU64,
    closes: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
}

/// Point-in-time copy of [`CallCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub opens: u64,
    pub closes: u64,
    pub reads: u64,
    pub writes: u64,
}

impl CallCounters {
    /// Count one call and return the new total for that kind.
    pub fn record(&self, kind: CallKind) -> u64 {
        self.slot(kind).fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, kind: CallKind) -> u64 {
        self.slot(kind).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            opens: self.get(CallKind::Open),
            closes: self.get(CallKind::Close),
            reads: self.get(CallKind::Read),
            writes: self.get(CallKind::Write),
        }
    }

    fn slot(&self, kind: CallKind) -> &AtomicU64 {
        match kind {
            CallKind::Open => &self.opens,
            CallKind::Close => &self.closes,
            CallKind::Read => &self.reads,
            CallKind::Write => &self.writes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_returns_running_total() {
        let counters = CallCounters::default();
        assert_eq!(counters.record(CallKind::Open), 1);
        assert_eq!(counters.record(CallKind::Open), 2);
        assert_eq!(counters.record(CallKind::Write), 1);
        assert_eq!(
            counters.snapshot(),
            CounterSnapshot {
                opens: 2,
                closes: 0,
                reads: 0,
                writes: 1,
            }
        );
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let counters = CallCounters::default();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        counters.record(CallKind::Read);
                    }
                });
            }
        });
        assert_eq!(counters.get(CallKind::Read), 8000);
    }
}
