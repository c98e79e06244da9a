use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot, process-wide cancellation context.
///
/// Set exactly once by the operator's escape keystroke and never cleared;
/// every retry, run, and supervisor loop checks it at its next suspension
/// boundary and unwinds. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_one_shot_and_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        clone.request();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());

        // Requesting again changes nothing
        token.request();
        assert!(token.is_cancelled());
    }
}
