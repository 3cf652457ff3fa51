use super::Broadcaster;
use crate::{
    channel::sink,
    common::Signal,
    emitter::{Emitter, ListenerId},
    error::{Error, Result},
};
use std::sync::Arc;
pub use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;

/// A listener attached to one channel
///
/// Holds the message stream, the done signal and the cancel handle;
/// use [into_parts](Subscription::into_parts) to move them apart.
pub struct Subscription<M> {
    stream: MessageStream<M>,
    done: Signal,
    cancel: CancelHandle<M>,
}

/// Messages published to the channel since the listener was registered
pub struct MessageStream<M> {
    receiver: sink::Receiver<M>,
}

/// Detaches a listener from its channel
pub struct CancelHandle<M> {
    emitter: Arc<Emitter<M>>,
    channel: String,
    listener: ListenerId,
    done: Signal,
}

impl<M: Clone + Send + 'static> Broadcaster<M> {
    /// Registers a listener on the channel
    ///
    /// With `buffer_size > 0` up to that many messages are queued for the
    /// listener; with `0` every publish waits until the listener takes the
    /// message. A full queue makes publishers wait.
    ///
    /// Fails with [Error::ChannelNotRegistered] if the channel is not
    /// registered, the channel is never created here.
    pub fn register_listener(&self, id: &str, buffer_size: usize) -> Result<Subscription<M>> {
        let done = Signal::new();
        let (sender, receiver) = sink::factory(buffer_size, done.clone());
        let emitter = &self.shared.emitter;
        let listener = self
            .shared
            .registry
            .attach(id, || emitter.add_listener(id, sender, done.clone()))
            .ok_or_else(|| Error::ChannelNotRegistered {
                channel: id.to_owned(),
            })?;
        debug!(channel = %id, listener, buffer_size, "listener registered");

        Ok(Subscription {
            stream: MessageStream { receiver },
            done: done.clone(),
            cancel: CancelHandle {
                emitter: Arc::clone(emitter),
                channel: id.to_owned(),
                listener,
                done,
            },
        })
    }
}

impl<M> Subscription<M> {
    /// Receives the next message
    ///
    /// Returns None once the listener is cancelled or its channel is closed
    /// and every queued message was received
    pub async fn recv(&mut self) -> Option<M> {
        self.stream.recv().await
    }

    /// Signal fired when the listener is cancelled or its channel is closed
    pub fn done(&self) -> &Signal {
        &self.done
    }

    /// Cancels the listener, see [CancelHandle::cancel]
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    /// Id of the channel the listener is attached to
    pub fn channel(&self) -> &str {
        &self.cancel.channel
    }

    /// Splits the subscription into its stream, done signal and cancel handle
    pub fn into_parts(self) -> (MessageStream<M>, Signal, CancelHandle<M>) {
        (self.stream, self.done, self.cancel)
    }
}

impl<M> MessageStream<M> {
    /// Receives the next message
    ///
    /// Returns None once the listener is detached and every message queued
    /// before that was received. An unbuffered listener takes nothing after
    /// its done signal fired.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Receives a queued message without waiting
    ///
    /// Fails with [TryRecvError::Empty] if nothing is queued yet and with
    /// [TryRecvError::Disconnected] once the listener is detached and drained.
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }
}

impl<M> CancelHandle<M> {
    /// Detaches the listener from its channel and fires its done signal
    ///
    /// Never blocks. Only the first call on an attached listener has an
    /// effect and returns true; later calls, and calls after the channel
    /// was closed, return false.
    pub fn cancel(&self) -> bool {
        self.emitter.remove_listener(&self.channel, self.listener);
        let cancelled = self.done.fire();
        if cancelled {
            debug!(channel = %self.channel, listener = self.listener, "listener cancelled");
        }
        cancelled
    }

    /// Checks whether the listener is already detached
    pub fn is_cancelled(&self) -> bool {
        self.done.is_fired()
    }
}

impl<M> Clone for CancelHandle<M> {
    fn clone(&self) -> Self {
        Self {
            emitter: Arc::clone(&self.emitter),
            channel: self.channel.clone(),
            listener: self.listener,
            done: self.done.clone(),
        }
    }
}

impl<M> std::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.cancel.channel)
            .field("listener", &self.cancel.listener)
            .field("done", &self.done.is_fired())
            .finish()
    }
}
