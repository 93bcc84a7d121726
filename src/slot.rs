use crate::model::Classification;
use std::sync::Mutex;

/// Single-writer, multi-reader register holding the most recent
/// classification plus a monotonic sequence number. Last write wins; there is
/// no queue and the writer is never blocked beyond the lock itself. Readers
/// get an atomic snapshot, never a half-written pair.
#[derive(Default)]
pub struct ResultSlot {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    latest: Option<Classification>,
    seq: u64,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, result: Classification) {
        let mut inner = self.inner.lock().unwrap();
        inner.seq += 1;
        inner.latest = Some(result);
    }

    /// The most recent result and its sequence number, or `None` before the
    /// first publish. Consumers compare sequence numbers to tell a fresh
    /// result from one they already acted on.
    pub fn read_latest(&self) -> Option<(Classification, u64)> {
        let inner = self.inner.lock().unwrap();
        inner.latest.clone().map(|result| (result, inner.seq))
    }
}
