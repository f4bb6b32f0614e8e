//! Progress reporting for batch runs.

/// Observer notified as entities complete.
///
/// Called once per entity, after its record is final, in input order.
/// Implementations must be cheap and non-blocking; the pipeline calls
/// them inline.
pub trait ProgressObserver: Send + Sync {
    /// `completed` entities out of `total` are done; `entity` just
    /// finished.
    fn entity_completed(&self, completed: usize, total: usize, entity: &str);
}

/// Closures work as observers, so callers can wire progress bars or
/// counters without a named type.
impl<F> ProgressObserver for F
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn entity_completed(&self, completed: usize, total: usize, entity: &str) {
        self(completed, total, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        seen: AtomicUsize,
    }

    impl ProgressObserver for Counting {
        fn entity_completed(&self, _completed: usize, _total: usize, _entity: &str) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_struct_observer() {
        let observer = Counting {
            seen: AtomicUsize::new(0),
        };
        observer.entity_completed(1, 3, "Acme");
        observer.entity_completed(2, 3, "Globex");
        assert_eq!(observer.seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_closure_observer() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let observer: Arc<dyn ProgressObserver> = Arc::new(move |done: usize, total: usize, _: &str| {
            assert!(done <= total);
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        observer.entity_completed(1, 1, "Acme");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
