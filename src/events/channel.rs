//! Event channel implementation using crossbeam-channel.
//!
//! Carries progress events from the reconcile engine to whatever
//! front end is listening.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the reconcile engine.
///
/// A thin wrapper around crossbeam's `Sender` that can be cloned and
/// sent across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// If the receiver is dropped, the event is silently discarded;
    /// progress reporting is always optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from the reconcile engine.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Iterate over events until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for the engine-to-frontend event channel.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    ///
    /// Events are small and row resolution outpaces any terminal, so
    /// unbounded is always the right choice here.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A no-op event sender for running without a UI (or in tests).
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
