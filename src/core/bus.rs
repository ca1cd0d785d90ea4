//! In-process broadcast bus
//!
//! Two kinds of listener hang off the bus:
//!
//! - registered [`Receiver`]s are called directly from `send`, in
//!   registration order, and never miss an intent
//! - [`Subscription`]s read from a ring of `capacity` intents and may lose
//!   the oldest ones when they fall behind
//!
//! Relays and correlated callers register; subscriptions are for passive
//! observers.

use crate::models::intent::Intent;
use std::sync::{Arc, RwLock, Weak};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("no receivers registered for {action}")]
    NoReceivers { action: String },
}

/// Something that reacts to intents delivered by the bus
///
/// `on_receive` runs on the sender's task and must return promptly; any
/// slow work belongs on an executor.
pub trait Receiver: Send + Sync {
    fn on_receive(&self, intent: &Intent);
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    receivers: Vec<(u64, Arc<dyn Receiver>)>,
}

#[derive(Clone)]
pub struct BroadcastBus {
    sender: broadcast::Sender<Arc<Intent>>,
    registry: Arc<RwLock<Registry>>,
}

impl BroadcastBus {
    /// Create a bus whose subscriptions buffer up to `capacity` intents
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    /// Deliver every intent sent from now on to `receiver`
    ///
    /// Delivery stops when the returned registration is dropped.
    pub fn register(&self, receiver: Arc<dyn Receiver>) -> Registration {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let id = registry.next_id;
        registry.next_id += 1;
        registry.receivers.push((id, receiver));
        Registration {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Broadcast an intent, returning how many listeners saw it
    ///
    /// Registered receivers are called before this returns.
    pub fn send(&self, intent: Intent) -> Result<usize, BusError> {
        let intent = Arc::new(intent);

        // Snapshot so a receiver may send or register without deadlocking
        let receivers: Vec<Arc<dyn Receiver>> = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .receivers
            .iter()
            .map(|(_, receiver)| receiver.clone())
            .collect();
        for receiver in &receivers {
            receiver.on_receive(&intent);
        }

        let subscribers = match self.sender.send(intent.clone()) {
            Ok(count) => count,
            Err(_) => 0,
        };

        match receivers.len() + subscribers {
            0 => Err(BusError::NoReceivers {
                action: intent.action.clone(),
            }),
            delivered => Ok(delivered),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Registered receivers plus live subscriptions
    pub fn receiver_count(&self) -> usize {
        let registered = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .receivers
            .len();
        registered + self.sender.receiver_count()
    }
}

/// Handle for a registered receiver; unregisters on drop
pub struct Registration {
    id: u64,
    registry: Weak<RwLock<Registry>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .receivers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

pub struct Subscription {
    receiver: broadcast::Receiver<Arc<Intent>>,
}

impl Subscription {
    /// Next intent, or `None` once every sender is gone
    ///
    /// Lag is logged and skipped over.
    pub async fn recv(&mut self) -> Option<Arc<Intent>> {
        loop {
            match self.receiver.recv().await {
                Ok(intent) => return Some(intent),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged, {} intents dropped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
