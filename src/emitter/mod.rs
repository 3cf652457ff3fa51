//! Per-channel listener lists and message dispatch

use crate::{channel::sink::Sender, common::Signal};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering::Relaxed},
};
use tracing::trace;


pub(crate) type ListenerId = u64;

pub(crate) struct Entry<M> {
    pub(crate) id: ListenerId,
    pub(crate) done: Signal,
    sink: Sender<M>,
}

/// Listeners keyed by channel id, kept in registration order
pub(crate) struct Emitter<M> {
    listeners: RwLock<HashMap<String, Vec<Entry<M>>>>,
    next_id: AtomicU64,
}

impl<M> Emitter<M> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn add_listener(&self, event: &str, sink: Sender<M>, done: Signal) -> ListenerId {
        let id = self.next_id.fetch_add(1, Relaxed);
        let mut listeners = self.listeners.write();
        listeners
            .entry(event.to_owned())
            .or_default()
            .push(Entry { id, done, sink });
        id
    }

    pub(crate) fn remove_listener(&self, event: &str, id: ListenerId) -> Option<Entry<M>> {
        let mut listeners = self.listeners.write();
        let entries = listeners.get_mut(event)?;
        let position = entries.iter().position(|entry| entry.id == id)?;
        let entry = entries.remove(position);
        if entries.is_empty() {
            listeners.remove(event);
        }
        Some(entry)
    }

    pub(crate) fn remove_all_listeners(&self, event: &str) -> Vec<Entry<M>> {
        self.listeners.write().remove(event).unwrap_or_default()
    }

    pub(crate) fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }
}

impl<M: Clone> Emitter<M> {
    /// Delivers the message to every listener of `event` in registration order
    ///
    /// A delivery is abandoned as soon as the listener's done signal fires,
    /// so a cancelled or evicted listener never holds up the publisher.
    /// Listeners whose stream was dropped are removed on the way.
    /// Returns the number of listeners that got the message.
    pub(crate) async fn emit(&self, event: &str, message: M) -> usize {
        let targets: Vec<(ListenerId, Sender<M>, Signal)> = {
            let listeners = self.listeners.read();
            match listeners.get(event) {
                Some(entries) => entries
                    .iter()
                    .map(|entry| (entry.id, entry.sink.clone(), entry.done.clone()))
                    .collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, sink, done) in targets {
            let sent = tokio::select! {
                biased;
                _ = done.fired() => None,
                sent = sink.send(message.clone()) => Some(sent),
            };
            match sent {
                Some(true) => delivered += 1,
                Some(false) => gone.push(id),
                None => {
                    trace!(channel = %event, listener = id, "delivery abandoned, listener detached")
                }
            }
        }

        for id in gone {
            if let Some(entry) = self.remove_listener(event, id) {
                entry.done.fire();
                trace!(channel = %event, listener = id, "dropped listener removed");
            }
        }
        delivered
    }
}
