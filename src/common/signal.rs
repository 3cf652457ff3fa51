use std::sync::{
    atomic::{AtomicBool, Ordering::SeqCst},
    Arc,
};
use tokio::sync::Notify;

/// One-shot signal observable by any number of readers
///
/// Clones share the same state: once the signal is fired
/// every clone observes it, including clones made afterwards.
#[derive(Clone, Debug, Default)]
pub struct Signal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    fired: AtomicBool,
    notify: Notify,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the call that actually fired the signal
    pub(crate) fn fire(&self) -> bool {
        let first = !self.inner.fired.swap(true, SeqCst);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Checks whether the signal has been fired
    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(SeqCst)
    }

    /// Waits until the signal is fired
    ///
    /// Resolves immediately if it already was
    pub async fn fired(&self) {
        loop {
            // registered before the flag check, so a concurrent fire can't be missed
            let notified = self.inner.notify.notified();
            if self.is_fired() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn fire_once() {
        let signal = Signal::new();
        let clone = signal.clone();
        assert!(!clone.is_fired());
        assert!(signal.fire());
        assert!(!clone.fire());
        assert!(clone.is_fired());
    }

    #[tokio::test]
    async fn wakes_every_waiter() {
        let signal = Signal::new();
        let w1 = tokio::spawn({
            let signal = signal.clone();
            async move { signal.fired().await }
        });
        let w2 = tokio::spawn({
            let signal = signal.clone();
            async move { signal.fired().await }
        });
        tokio::task::yield_now().await;

        signal.fire();
        w1.await.unwrap();
        w2.await.unwrap();
    }

    #[tokio::test]
    async fn pending_until_fired() {
        let signal = Signal::new();
        assert!(timeout(Duration::from_millis(20), signal.fired())
            .await
            .is_err());

        signal.fire();
        timeout(Duration::from_millis(20), signal.fired())
            .await
            .expect("already fired signal must resolve");
    }
}
