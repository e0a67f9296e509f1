use std::sync::{atomic::{AtomicBool, Ordering}, Arc};

/// Cooperative cancellation flag, checked by the builder between districts.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    /// Request cancellation; every clone of this token observes it.
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}
