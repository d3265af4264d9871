use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::InspectionQueueError;
use crate::models::QueueEvent;

pub type QueueEventSender = broadcast::Sender<String>;
pub type QueueEventReceiver = broadcast::Receiver<String>;

/// Fan-out of queue events to connected clients. Each order gets its own
/// broadcast channel; a global channel carries every event for monitoring
/// consumers.
pub struct QueueNotifierService {
    channels: Arc<RwLock<HashMap<Uuid, QueueEventSender>>>,
    global_sender: QueueEventSender,
}

impl QueueNotifierService {
    pub fn new() -> Self {
        let (global_sender, _) = broadcast::channel(1000);

        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            global_sender,
        }
    }

    /// Subscribe to events for one order. Reuses the order's channel when a
    /// second client connects, so every subscriber sees the same stream.
    pub async fn subscribe(&self, order_id: Uuid) -> QueueEventReceiver {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(order_id)
            .or_insert_with(|| broadcast::channel(100).0);
        debug!("Subscribed queue socket for order {}", order_id);
        sender.subscribe()
    }

    pub async fn remove_channel(&self, order_id: Uuid) {
        let mut channels = self.channels.write().await;
        channels.remove(&order_id);
        debug!("Removed queue channel for order {}", order_id);
    }

    pub fn subscribe_global(&self) -> QueueEventReceiver {
        self.global_sender.subscribe()
    }

    pub async fn publish(
        &self,
        order_id: Uuid,
        event: &QueueEvent,
    ) -> Result<(), InspectionQueueError> {
        let message = serde_json::to_string(event)?;

        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(&order_id) {
                if let Err(e) = sender.send(message.clone()) {
                    // All receivers dropped; the next subscriber starts fresh.
                    warn!("No live queue socket for order {}: {}", order_id, e);
                }
            }
        }

        let global_message = serde_json::json!({
            "type": "queue_event",
            "order_id": order_id,
            "timestamp": Utc::now().to_rfc3339(),
            "data": event
        })
        .to_string();

        if let Err(e) = self.global_sender.send(global_message) {
            debug!("Failed to send to global queue channel: {}", e);
        }

        Ok(())
    }
}

impl Default for QueueNotifierService {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for QueueNotifierService {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            global_sender: self.global_sender.clone(),
        }
    }
}
