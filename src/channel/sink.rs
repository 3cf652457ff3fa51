use crate::common::Signal;
use tokio::sync::{
    mpsc::{channel, error::TryRecvError, Receiver as BoundedReceiver, Sender as BoundedSender},
    oneshot, Semaphore,
};

/// Sending half of a listener's message queue
pub(crate) enum Sender<P> {
    Bounded(BoundedSender<P>),
    /// A send completes only after the reader claimed the value
    Rendezvous(BoundedSender<Handoff<P>>),
}

/// Receiving half of a listener's message queue
pub(crate) struct Receiver<P> {
    raw: RawReceiver<P>,
    done: Signal,
}

enum RawReceiver<P> {
    Bounded(BoundedReceiver<P>),
    Rendezvous(BoundedReceiver<Handoff<P>>),
}

/// Value offered to a rendezvous reader
///
/// The sender gives up on the offer by dropping the receiving side of `taken`.
pub(crate) struct Handoff<P> {
    value: P,
    taken: oneshot::Sender<()>,
}

/// Creates a listener queue
///
/// Once `done` fires the reader no longer claims rendezvous offers;
/// values already queued in a bounded queue stay readable.
pub(crate) fn factory<P>(buffer_size: usize, done: Signal) -> (Sender<P>, Receiver<P>) {
    if buffer_size == 0 {
        let (sender, receiver) = channel(1);
        let receiver = Receiver {
            raw: RawReceiver::Rendezvous(receiver),
            done,
        };
        (Sender::Rendezvous(sender), receiver)
    } else {
        let (sender, receiver) = channel(buffer_size.min(Semaphore::MAX_PERMITS));
        let receiver = Receiver {
            raw: RawReceiver::Bounded(receiver),
            done,
        };
        (Sender::Bounded(sender), receiver)
    }
}

impl<P> Sender<P> {
    /// Hands the value to the reader, waiting for queue capacity
    ///
    /// Returns true once the value is queued (bounded) or claimed by the
    /// reader (rendezvous), false if the reader is gone or refused it
    pub(crate) async fn send(&self, value: P) -> bool {
        match self {
            Sender::Bounded(sender) => sender.send(value).await.is_ok(),
            Sender::Rendezvous(sender) => {
                let (taken, claimed) = oneshot::channel();
                if sender.send(Handoff { value, taken }).await.is_err() {
                    return false;
                }
                claimed.await.is_ok()
            }
        }
    }
}

impl<P> Clone for Sender<P> {
    fn clone(&self) -> Self {
        match self {
            Sender::Bounded(sender) => Sender::Bounded(sender.clone()),
            Sender::Rendezvous(sender) => Sender::Rendezvous(sender.clone()),
        }
    }
}

impl<P> Receiver<P> {
    pub(crate) async fn recv(&mut self) -> Option<P> {
        match &mut self.raw {
            RawReceiver::Bounded(receiver) => receiver.recv().await,
            RawReceiver::Rendezvous(receiver) => loop {
                let handoff = receiver.recv().await?;
                if let Some(value) = handoff.claim(&self.done) {
                    return Some(value);
                }
            },
        }
    }

    pub(crate) fn try_recv(&mut self) -> Result<P, TryRecvError> {
        match &mut self.raw {
            RawReceiver::Bounded(receiver) => receiver.try_recv(),
            RawReceiver::Rendezvous(receiver) => loop {
                let handoff = receiver.try_recv()?;
                if let Some(value) = handoff.claim(&self.done) {
                    return Ok(value);
                }
            },
        }
    }
}

impl<P> Handoff<P> {
    /// Takes the value unless the listener is done or the sender gave up
    fn claim(self, done: &Signal) -> Option<P> {
        if done.is_fired() {
            return None;
        }
        let Handoff { value, taken } = self;
        taken.send(()).ok().map(|()| value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn bounded_waits_for_capacity() {
        let (sender, mut receiver) = factory::<i32>(2, Signal::new());
        assert!(sender.send(1).await);
        assert!(sender.send(2).await);
        assert!(timeout(Duration::from_millis(20), sender.send(3))
            .await
            .is_err());

        assert_eq!(receiver.recv().await, Some(1));
        assert!(sender.send(3).await);
        assert_eq!(receiver.recv().await, Some(2));
        assert_eq!(receiver.recv().await, Some(3));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn rendezvous_waits_for_reader() {
        let (sender, mut receiver) = factory::<i32>(0, Signal::new());
        assert!(timeout(Duration::from_millis(20), sender.send(1))
            .await
            .is_err());

        // the abandoned offer of 1 is skipped
        let reader = tokio::spawn(async move { receiver.recv().await });
        assert!(sender.send(2).await);
        assert_eq!(reader.await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn rendezvous_counts_claimed_value() {
        let (sender, mut receiver) = factory::<i32>(0, Signal::new());
        let reader = tokio::spawn(async move {
            let value = receiver.recv().await;
            drop(receiver);
            value
        });

        assert!(sender.send(1).await);
        assert_eq!(reader.await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn done_reader_refuses_offer() {
        let done = Signal::new();
        let (sender, mut receiver) = factory::<i32>(0, done.clone());
        let publisher = tokio::spawn(async move { sender.send(1).await });
        tokio::task::yield_now().await;

        done.fire();
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
        assert!(!publisher.await.unwrap());
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn closed_reader() {
        let (bounded, receiver) = factory::<i32>(4, Signal::new());
        drop(receiver);
        assert!(!bounded.send(1).await);

        let (rendezvous, receiver) = factory::<i32>(0, Signal::new());
        drop(receiver);
        assert!(!rendezvous.send(1).await);
    }
}
