use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::{
    Appointment, InspectionModality, InspectionType, ScheduleTemplate,
};

/// A bounded-capacity interval derived from a template for one date.
/// Recomputed on every query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub total_capacity: u32,
    pub occupied_count: u32,
    pub available_capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: u32,
    pub capacity_per_interval: u32,
    pub priority: i32,
}

impl From<&ScheduleTemplate> for TemplateSummary {
    fn from(template: &ScheduleTemplate) -> Self {
        Self {
            id: template.id,
            start_time: template.start_time,
            end_time: template.end_time,
            interval_minutes: template.interval_minutes,
            capacity_per_interval: template.capacity_per_interval,
            priority: template.priority,
        }
    }
}

/// One availability result row: a template and its remaining slots for the
/// queried date. Templates with no remaining slots are included with an
/// empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateAvailability {
    pub template: TemplateSummary,
    pub slots: Vec<TimeSlot>,
}

/// All four filters are required; absence is a validation error, not a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub branch_id: Option<Uuid>,
    pub modality: Option<InspectionModality>,
    pub inspection_type: Option<InspectionType>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub template_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub appointment: Appointment,
    pub template: TemplateSummary,
}

#[derive(Debug, Clone, Copy)]
pub struct ValidatedAvailabilityQuery {
    pub branch_id: Uuid,
    pub modality: InspectionModality,
    pub inspection_type: InspectionType,
    pub date: NaiveDate,
}
