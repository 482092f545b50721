use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-query cancellation signal (spec §5: "A per-query cancellation token
/// is checked at every suspension point"). Cheap to clone; every clone
/// observes the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
