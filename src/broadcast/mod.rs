//! # Named channel broadcasting

use crate::{
    channel::Registry,
    common::Signal,
    config::Config,
    emitter::Emitter,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, trace};

mod listener;


pub use listener::*;

/// Fans messages out to the listeners of named channels
///
/// Cloning is cheap, all clones share the same channels and listeners.
/// A reserved default channel (see [Config]) exists from construction on.
pub struct Broadcaster<M> {
    shared: Arc<Shared<M>>,
}

struct Shared<M> {
    config: Config,
    registry: Registry,
    emitter: Arc<Emitter<M>>,
}

impl<M: Clone + Send + 'static> Broadcaster<M> {
    /// Creates a broadcaster with the [default](Config::default) configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a broadcaster and registers its default channel
    pub fn with_config(config: Config) -> Self {
        let registry = Registry::default();
        registry.get_or_insert(&config.default_channel);
        debug!(default_channel = %config.default_channel, "broadcaster initialized");
        Self {
            shared: Arc::new(Shared {
                config,
                registry,
                emitter: Arc::new(Emitter::new()),
            }),
        }
    }

    /// Id of the reserved default channel
    pub fn default_channel(&self) -> &str {
        &self.shared.config.default_channel
    }

    /// Checks whether the channel accepts listeners
    pub fn channel_in_use(&self, id: &str) -> bool {
        self.shared.registry.contains(id)
    }

    /// Registers the channel so listeners may subscribe to it
    ///
    /// Does nothing if the channel is already registered
    pub fn add_channel(&self, id: &str) {
        if self.shared.registry.get_or_insert(id) {
            debug!(channel = %id, "channel added");
        }
    }

    /// Closes the channel
    ///
    /// The channel stops accepting listeners, its close signal fires
    /// and every current listener is evicted: its done signal fires
    /// and its stream ends after the already queued messages.
    /// Closing an unknown or already closed channel is a no-op.
    pub fn close_channel(&self, id: &str) {
        let emitter = &self.shared.emitter;
        let (registered, evicted) = self.shared.registry.detach(id, |signal| {
            let registered = match signal {
                Some(signal) => {
                    signal.fire();
                    true
                }
                None => false,
            };
            (registered, emitter.remove_all_listeners(id))
        });
        for entry in &evicted {
            entry.done.fire();
        }
        if registered || !evicted.is_empty() {
            debug!(channel = %id, evicted = evicted.len(), "channel closed");
        }
    }

    /// Snapshot of the registered channel ids
    pub fn channels(&self) -> HashSet<String> {
        self.shared.registry.ids()
    }

    /// Returns the close signal of a registered channel
    ///
    /// Returns None if the channel is not registered
    pub fn close_notify(&self, id: &str) -> Option<Signal> {
        self.shared.registry.close_signal(id)
    }

    /// Number of listeners currently attached to the channel
    pub fn listener_count(&self, id: &str) -> usize {
        self.shared.emitter.listener_count(id)
    }

    /// Sends the message to the listeners of every given channel
    ///
    /// Each channel gets the message once, even if its id is repeated.
    /// Unknown channels are registered on the way.
    /// Waits while a listener's buffer is full or, for an unbuffered
    /// listener, until the listener takes the message.
    pub async fn send<I>(&self, message: M, ids: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let ids = collect_ids(ids);
        self.fan_out(message, ids, true).await
    }

    /// Same as [send](Self::send) with the default channel added to the targets
    pub async fn send_with_default<I>(&self, message: M, ids: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut ids = collect_ids(ids);
        ids.insert(self.default_channel().to_owned());
        self.fan_out(message, ids, true).await
    }

    /// Sends the message to every registered channel
    pub async fn publish(&self, message: M) {
        let ids = self.channels();
        self.fan_out(message, ids, false).await
    }

    /// Sends the message to every registered channel except the default one
    pub async fn publish_except_default(&self, message: M) {
        let mut ids = self.channels();
        ids.remove(self.default_channel());
        self.fan_out(message, ids, false).await
    }

    async fn fan_out(&self, message: M, ids: HashSet<String>, create: bool) {
        for id in ids {
            if create {
                self.add_channel(&id);
            } else if !self.channel_in_use(&id) {
                // closed after the snapshot was taken
                continue;
            }
            let delivered = self.shared.emitter.emit(&id, message.clone()).await;
            trace!(channel = %id, delivered, "message sent");
        }
    }
}

fn collect_ids<I>(ids: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    ids.into_iter().map(|id| id.as_ref().to_owned()).collect()
}

impl<M: Clone + Send + 'static> Default for Broadcaster<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Broadcaster<M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<M> std::fmt::Debug for Broadcaster<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("default_channel", &self.shared.config.default_channel)
            .field("channels", &self.shared.registry.ids())
            .finish()
    }
}
