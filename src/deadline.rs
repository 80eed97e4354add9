use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::graph::GraphError;

/// Cooperative cancellation for the long-running clustering loops.
///
/// The algorithms poll the token between iterations, so cancellation takes
/// effect at the next iteration boundary rather than mid-update. A token can
/// be cancelled explicitly from another thread, carry a wall-clock deadline,
/// or both.
#[derive(Debug)]
pub struct CancelToken {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that never fires on its own.
    pub fn new() -> Self {
        CancelToken {
            cancelled: AtomicBool::new(false),
            deadline: None,
        }
    }

    /// A token that fires once the given duration has elapsed.
    pub fn with_deadline(timeout: Duration) -> Self {
        CancelToken {
            cancelled: AtomicBool::new(false),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Returns an error once the token has fired, for use with `?` inside
    /// iteration loops.
    pub fn check(&self) -> Result<(), GraphError> {
        if self.is_cancelled() {
            Err(GraphError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_deadline {
    use std::sync::Arc;
    use std::thread;

    use crate::deadline::*;

    #[test]
    fn test_manual_cancel() {
        let token = Arc::new(CancelToken::new());
        assert!(token.check().is_ok());

        let remote = token.clone();
        let handle = thread::spawn(move || remote.cancel());
        handle.join().unwrap();

        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(GraphError::Cancelled)));
    }

    #[test]
    fn test_deadline_expiry() {
        let token = CancelToken::with_deadline(Duration::from_millis(0));
        thread::sleep(Duration::from_millis(5));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_unexpired_deadline() {
        let token = CancelToken::with_deadline(Duration::from_secs(3600));
        assert!(token.check().is_ok());
    }
}
