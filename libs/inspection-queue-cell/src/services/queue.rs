use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use shared_database::AppointmentStore;
use shared_models::domain::AppointmentStatus;

use crate::error::InspectionQueueError;
use crate::models::{AdmissionOutcome, QueueEntry, QueueEntryState, QueueEvent, QueueStatusResponse};
use crate::services::notifier::QueueNotifierService;

/// In-process virtual inspection queue. Entries live in memory; the
/// appointment store is only touched to mark appointments retryable when
/// their queue entry times out.
pub struct InspectionQueueService {
    entries: RwLock<HashMap<Uuid, Vec<QueueEntry>>>,
    order_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    appointments: Arc<dyn AppointmentStore>,
    notifier: QueueNotifierService,
    inactivity_minutes: i64,
}

impl InspectionQueueService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        notifier: QueueNotifierService,
        inactivity_minutes: i64,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            order_locks: Mutex::new(HashMap::new()),
            appointments,
            notifier,
            inactivity_minutes,
        }
    }

    /// Admit an order into the queue. Repeated calls while an entry is
    /// active return that entry unchanged; a fresh entry is created only
    /// when no active one exists, or when the order's latest appointment
    /// became retry-eligible after the active entry was enqueued.
    pub async fn admit(&self, order_id: Uuid) -> Result<AdmissionOutcome, InspectionQueueError> {
        // One admission at a time per order. Concurrent retries for the
        // same order serialize here instead of racing on the entry list.
        let lock = self.order_lock(order_id).await;
        let _guard = lock.lock().await;

        self.expire_order_entries(order_id).await?;

        let now = Utc::now();
        let active = {
            let entries = self.entries.read().await;
            entries
                .get(&order_id)
                .and_then(|list| list.iter().rev().find(|e| e.state.is_active()).cloned())
        };

        if let Some(active) = active {
            // An entry already in session with an inspector is never superseded.
            let superseded = if active.state == QueueEntryState::Waiting {
                let latest = self.appointments.latest_for_order(order_id).await?;
                latest
                    .as_ref()
                    .map(|a| a.status.is_retry_eligible() && active.enqueued_at <= a.updated_at)
                    .unwrap_or(false)
            } else {
                false
            };

            if !superseded {
                return Ok(AdmissionOutcome {
                    entry: active,
                    created: false,
                });
            }

            // The active entry predates the appointment turning retryable.
            // Retire it so the retry gets a clean countdown.
            self.transition(
                order_id,
                active.id,
                QueueEntryState::Expired { expired_at: now },
            )
            .await;
        }

        let entry = QueueEntry::new(order_id, now, self.inactivity_minutes);
        {
            let mut entries = self.entries.write().await;
            entries.entry(order_id).or_default().push(entry.clone());
        }
        info!(
            "Admitted order {} to inspection queue (entry {}, expires {})",
            order_id, entry.id, entry.expires_at
        );

        Ok(AdmissionOutcome {
            entry,
            created: true,
        })
    }

    /// Latest entry for an order, with derived countdown and, for waiting
    /// entries, the position among all waiting entries queue-wide.
    pub async fn status(&self, order_id: Uuid) -> Result<Option<QueueStatusResponse>, InspectionQueueError> {
        self.expire_order_entries(order_id).await?;

        let now = Utc::now();
        let entries = self.entries.read().await;

        let latest = match entries
            .get(&order_id)
            .and_then(|list| list.iter().max_by_key(|e| e.enqueued_at).cloned())
        {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let position = if latest.state == QueueEntryState::Waiting {
            let ahead = entries
                .values()
                .flatten()
                .filter(|e| e.state == QueueEntryState::Waiting && e.enqueued_at < latest.enqueued_at)
                .count();
            Some(ahead + 1)
        } else {
            None
        };

        Ok(Some(QueueStatusResponse {
            remaining_seconds: latest.remaining_seconds(now),
            entry: latest,
            position,
        }))
    }

    /// Hand the oldest waiting entry to an inspector. Returns `None` when
    /// the queue has nothing waiting.
    pub async fn assign_next(
        &self,
        inspector_id: Uuid,
    ) -> Result<Option<QueueEntry>, InspectionQueueError> {
        self.expire_all_due().await?;

        let candidate = {
            let entries = self.entries.read().await;
            entries
                .values()
                .flatten()
                .filter(|e| e.state == QueueEntryState::Waiting)
                .min_by_key(|e| e.enqueued_at)
                .cloned()
        };

        let candidate = match candidate {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let session_handle = format!("inspection-{}", Uuid::new_v4());
        let next_state = QueueEntryState::Assigned {
            inspector_id,
            session_handle: session_handle.clone(),
        };

        let assigned = self
            .transition(candidate.order_id, candidate.id, next_state)
            .await;

        let assigned = match assigned {
            Some(entry) => entry,
            // Lost the race to the sweeper; the caller should just retry.
            None => return Ok(None),
        };

        info!(
            "Assigned entry {} (order {}) to inspector {}",
            assigned.id, assigned.order_id, inspector_id
        );

        self.notifier
            .publish(
                assigned.order_id,
                &QueueEvent::Assigned {
                    entry_id: assigned.id,
                    order_id: assigned.order_id,
                    inspector_id,
                    session_handle,
                },
            )
            .await?;

        Ok(Some(assigned))
    }

    /// Expire every active entry whose countdown has elapsed. Returns the
    /// number of entries expired. Also invoked lazily from reads, so a
    /// stalled sweeper never leaves stale state visible.
    pub async fn expire_all_due(&self) -> Result<usize, InspectionQueueError> {
        let order_ids: Vec<Uuid> = {
            let entries = self.entries.read().await;
            entries.keys().copied().collect()
        };

        let mut expired = 0;
        for order_id in order_ids {
            expired += self.expire_order_entries(order_id).await?;
        }
        Ok(expired)
    }

    /// Periodic background sweep driving the inactivity timeout.
    pub fn spawn_expiry_sweeper(self: Arc<Self>, interval_seconds: u64) {
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
            loop {
                ticker.tick().await;
                match self.expire_all_due().await {
                    Ok(0) => {}
                    Ok(n) => info!("Expiry sweep retired {} queue entries", n),
                    Err(e) => error!("Expiry sweep failed: {}", e),
                }
            }
        });
    }

    async fn order_lock(&self, order_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.order_locks.lock().await;
        locks
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Expire the order's due entries and mark its latest scheduled
    /// appointment retryable, so the holder can book a new slot.
    async fn expire_order_entries(&self, order_id: Uuid) -> Result<usize, InspectionQueueError> {
        let now = Utc::now();

        let due: Vec<QueueEntry> = {
            let entries = self.entries.read().await;
            entries
                .get(&order_id)
                .map(|list| list.iter().filter(|e| e.is_due(now)).cloned().collect())
                .unwrap_or_default()
        };

        let mut expired = 0;
        for entry in due {
            let next = QueueEntryState::Expired { expired_at: now };
            if self.transition(order_id, entry.id, next).await.is_none() {
                continue;
            }
            expired += 1;
            warn!(
                "Queue entry {} for order {} expired after inactivity",
                entry.id, order_id
            );

            if let Some(latest) = self.appointments.latest_for_order(order_id).await? {
                if latest.status == AppointmentStatus::Scheduled {
                    self.appointments
                        .update_status(latest.id, AppointmentStatus::IneffectiveRetryable)
                        .await?;
                    info!(
                        "Marked appointment {} retryable after queue expiry",
                        latest.id
                    );
                }
            }

            self.notifier
                .publish(
                    order_id,
                    &QueueEvent::Expired {
                        entry_id: entry.id,
                        order_id,
                        expired_at: now,
                    },
                )
                .await?;
        }

        Ok(expired)
    }

    /// Apply a state transition under the write lock, re-reading the
    /// current state so concurrent movers cannot double-apply. Returns the
    /// updated entry, or `None` when the transition is no longer legal.
    async fn transition(
        &self,
        order_id: Uuid,
        entry_id: Uuid,
        next: QueueEntryState,
    ) -> Option<QueueEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(&order_id)?
            .iter_mut()
            .find(|e| e.id == entry_id)?;

        if !entry.state.can_transition_to(&next) {
            return None;
        }
        entry.state = next;
        Some(entry.clone())
    }
}
