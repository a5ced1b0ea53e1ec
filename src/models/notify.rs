// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Change notification for the editing models.
//!
//! Models own a [`Notifier`] and emit an event after each state change that
//! observers care about. Observers hold the receiving end of a channel and
//! drain it when they render, so models never call back into the UI.

use std::sync::mpsc::{channel, Receiver, Sender};

/// Fan-out of events to any number of subscribers.
#[derive(Debug)]
pub struct Notifier<T> {
    subscribers: Vec<Sender<T>>,
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<T: Clone> Notifier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Send `event` to every live subscriber. Subscribers whose receiver has
    /// been dropped are forgotten.
    pub fn emit(&mut self, event: T) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
