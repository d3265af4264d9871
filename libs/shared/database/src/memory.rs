//! In-memory store implementations backing the cell test suites and local
//! development without a durable store.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::domain::{
    Appointment, AppointmentStatus, Holiday, InspectionModality, InspectionType, ScheduleTemplate,
};

use crate::stores::{
    AppointmentStore, CommitOutcome, HolidayCalendar, SlotBucket, TemplateCatalog,
};

#[derive(Default)]
pub struct InMemoryTemplateCatalog {
    templates: RwLock<Vec<ScheduleTemplate>>,
}

impl InMemoryTemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, template: ScheduleTemplate) {
        self.templates.write().await.push(template);
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryTemplateCatalog {
    async fn active_templates(
        &self,
        branch_id: Uuid,
        modality: InspectionModality,
        inspection_type: InspectionType,
        weekday: u8,
    ) -> Result<Vec<ScheduleTemplate>> {
        let templates = self.templates.read().await;
        let mut matching: Vec<ScheduleTemplate> = templates
            .iter()
            .filter(|t| {
                t.active
                    && t.branch_id == branch_id
                    && t.modality == modality
                    && t.inspection_type == inspection_type
                    && t.applies_on(weekday)
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.start_time.cmp(&b.start_time))
        });

        Ok(matching)
    }

    async fn template_by_id(&self, template_id: Uuid) -> Result<Option<ScheduleTemplate>> {
        let templates = self.templates.read().await;
        Ok(templates.iter().find(|t| t.id == template_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test seeding; bypasses the capacity check.
    pub async fn insert_unchecked(&self, appointment: Appointment) {
        self.appointments.write().await.push(appointment);
    }

    pub async fn all(&self) -> Vec<Appointment> {
        self.appointments.read().await.clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn occupying_for_date(
        &self,
        branch_id: Uuid,
        modality: InspectionModality,
        inspection_type: InspectionType,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut matching: Vec<Appointment> = appointments
            .iter()
            .filter(|a| {
                a.status.occupies_capacity()
                    && a.branch_id == branch_id
                    && a.modality == modality
                    && a.inspection_type == inspection_type
                    && a.date == date
            })
            .cloned()
            .collect();

        matching.sort_by_key(|a| a.start_time);
        Ok(matching)
    }

    async fn insert_scheduled(
        &self,
        appointment: Appointment,
        bucket: &SlotBucket,
    ) -> Result<CommitOutcome> {
        // Count and insert under one write lock: concurrent commits on the
        // same bucket serialize here, so the capacity bound cannot be oversold.
        let mut appointments = self.appointments.write().await;

        let occupied = appointments.iter().filter(|a| bucket.covers(a)).count() as u32;
        if occupied >= bucket.capacity_per_interval {
            return Ok(CommitOutcome::CapacityExhausted);
        }

        appointments.push(appointment.clone());
        Ok(CommitOutcome::Created(appointment))
    }

    async fn latest_for_order(&self, order_id: Uuid) -> Result<Option<Appointment>> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .filter(|a| a.order_id == order_id)
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn update_status(&self, appointment_id: Uuid, status: AppointmentStatus) -> Result<()> {
        let mut appointments = self.appointments.write().await;
        if let Some(appointment) = appointments.iter_mut().find(|a| a.id == appointment_id) {
            appointment.status = status;
            appointment.updated_at = chrono::Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryHolidayCalendar {
    holidays: RwLock<Vec<Holiday>>,
}

impl InMemoryHolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, holiday: Holiday) {
        self.holidays.write().await.push(holiday);
    }
}

#[async_trait]
impl HolidayCalendar for InMemoryHolidayCalendar {
    async fn holiday_on(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let holidays = self.holidays.read().await;
        Ok(holidays.iter().find(|h| h.date == date).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn holiday_calendar_matches_exact_dates_only() {
        let calendar = InMemoryHolidayCalendar::new();
        let date = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();
        calendar
            .insert(Holiday {
                date,
                name: "Founding Day".to_string(),
            })
            .await;

        let found = calendar.holiday_on(date).await.unwrap();
        assert_eq!(found.unwrap().name, "Founding Day");

        let next_day = NaiveDate::from_ymd_opt(2024, 7, 21).unwrap();
        assert!(calendar.holiday_on(next_day).await.unwrap().is_none());
    }
}
