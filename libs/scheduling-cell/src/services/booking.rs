use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::{AppointmentStore, CommitOutcome, SlotBucket, TemplateCatalog};
use shared_models::domain::{weekday_number, Appointment, AppointmentStatus};

use crate::error::SchedulingError;
use crate::models::{BookAppointmentRequest, BookedAppointment};
use crate::services::slots::generate_slots;

/// Commits a booking against a freshly regenerated slot list, closing the
/// gap between a client viewing availability and submitting.
#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<dyn TemplateCatalog>,
    appointments: Arc<dyn AppointmentStore>,
}

impl BookingService {
    pub fn new(catalog: Arc<dyn TemplateCatalog>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            catalog,
            appointments,
        }
    }

    pub async fn commit(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookedAppointment, SchedulingError> {
        let template = self
            .catalog
            .template_by_id(request.template_id)
            .await?
            .ok_or(SchedulingError::TemplateNotFound(request.template_id))?;

        // A template that does not serve this weekday cannot produce the
        // requested slot on this date.
        if !template.active || !template.applies_on(weekday_number(request.date)) {
            return Err(SchedulingError::SlotUnavailable {
                date: request.date,
                start_time: request.start_time,
            });
        }

        let occupying = self
            .appointments
            .occupying_for_date(
                template.branch_id,
                template.modality,
                template.inspection_type,
                request.date,
            )
            .await?;

        let slots = generate_slots(&template, &occupying);
        let slot = slots
            .iter()
            .find(|s| s.start == request.start_time)
            .ok_or(SchedulingError::SlotUnavailable {
                date: request.date,
                start_time: request.start_time,
            })?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            order_id: request.order_id,
            template_id: template.id,
            branch_id: template.branch_id,
            modality: template.modality,
            inspection_type: template.inspection_type,
            date: request.date,
            start_time: slot.start,
            end_time: slot.end,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        let bucket = SlotBucket {
            branch_id: template.branch_id,
            modality: template.modality,
            inspection_type: template.inspection_type,
            date: request.date,
            start_time: slot.start,
            interval_minutes: template.interval_minutes,
            capacity_per_interval: template.capacity_per_interval,
        };

        // The recheck above is advisory; the store performs the authoritative
        // counted insert, so two commits racing for the last unit cannot both
        // succeed.
        match self.appointments.insert_scheduled(appointment, &bucket).await? {
            CommitOutcome::Created(appointment) => {
                info!(
                    appointment_id = %appointment.id,
                    order_id = %appointment.order_id,
                    template_id = %template.id,
                    date = %appointment.date,
                    start_time = %appointment.start_time,
                    "Appointment committed"
                );
                Ok(BookedAppointment {
                    appointment,
                    template: (&template).into(),
                })
            }
            CommitOutcome::CapacityExhausted => {
                warn!(
                    template_id = %template.id,
                    date = %request.date,
                    start_time = %request.start_time,
                    "Commit lost the capacity race"
                );
                Err(SchedulingError::SlotUnavailable {
                    date: request.date,
                    start_time: request.start_time,
                })
            }
        }
    }
}
