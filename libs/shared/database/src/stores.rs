use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use uuid::Uuid;

use shared_models::domain::{
    Appointment, AppointmentStatus, Holiday, InspectionModality, InspectionType, ScheduleTemplate,
};

/// Identity of one bounded-capacity occupancy bucket: a template slot on a
/// concrete date. The shared mutable resource of booking commits.
#[derive(Debug, Clone)]
pub struct SlotBucket {
    pub branch_id: Uuid,
    pub modality: InspectionModality,
    pub inspection_type: InspectionType,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub interval_minutes: u32,
    pub capacity_per_interval: u32,
}

impl SlotBucket {
    pub fn end_time(&self) -> NaiveTime {
        self.start_time + Duration::minutes(self.interval_minutes as i64)
    }

    /// Whether an appointment occupies one capacity unit of this bucket.
    pub fn covers(&self, appointment: &Appointment) -> bool {
        appointment.status.occupies_capacity()
            && appointment.branch_id == self.branch_id
            && appointment.modality == self.modality
            && appointment.inspection_type == self.inspection_type
            && appointment.date == self.date
            && appointment.start_time >= self.start_time
            && appointment.start_time < self.end_time()
    }
}

#[derive(Debug)]
pub enum CommitOutcome {
    Created(Appointment),
    CapacityExhausted,
}

/// Read-only lookup of recurring availability templates.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Active templates for the branch/modality/type triple whose days
    /// pattern contains `weekday` (Monday=1 .. Sunday=7), ordered by
    /// priority descending then start time ascending.
    async fn active_templates(
        &self,
        branch_id: Uuid,
        modality: InspectionModality,
        inspection_type: InspectionType,
        weekday: u8,
    ) -> Result<Vec<ScheduleTemplate>>;

    async fn template_by_id(&self, template_id: Uuid) -> Result<Option<ScheduleTemplate>>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All capacity-occupying appointments for the branch/modality/type on a date.
    async fn occupying_for_date(
        &self,
        branch_id: Uuid,
        modality: InspectionModality,
        inspection_type: InspectionType,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>>;

    /// Counted conditional insert. Implementations must make the
    /// count-then-insert atomic with respect to concurrent commits on the
    /// same bucket; a recheck-then-insert that can oversell is not a valid
    /// implementation of this method.
    async fn insert_scheduled(
        &self,
        appointment: Appointment,
        bucket: &SlotBucket,
    ) -> Result<CommitOutcome>;

    /// Most recently created appointment for an order, regardless of status.
    async fn latest_for_order(&self, order_id: Uuid) -> Result<Option<Appointment>>;

    async fn update_status(&self, appointment_id: Uuid, status: AppointmentStatus) -> Result<()>;
}

/// Holiday data source. Consumed, never computed.
#[async_trait]
pub trait HolidayCalendar: Send + Sync {
    async fn holiday_on(&self, date: NaiveDate) -> Result<Option<Holiday>>;
}
