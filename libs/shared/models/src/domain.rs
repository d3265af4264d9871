use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE SCHEDULING ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionModality {
    InPerson,
    Virtual,
}

impl fmt::Display for InspectionModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionModality::InPerson => write!(f, "in_person"),
            InspectionModality::Virtual => write!(f, "virtual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionType {
    Periodic,
    Transfer,
    Modification,
    Import,
}

impl fmt::Display for InspectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionType::Periodic => write!(f, "periodic"),
            InspectionType::Transfer => write!(f, "transfer"),
            InspectionType::Modification => write!(f, "modification"),
            InspectionType::Import => write!(f, "import"),
        }
    }
}

/// Recurring weekly availability definition for one branch, modality and
/// inspection type. Authored by staff tooling; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub modality: InspectionModality,
    pub inspection_type: InspectionType,
    /// Weekday numbers this template serves, Monday=1 through Sunday=7.
    pub days_pattern: Vec<u8>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: u32,
    pub capacity_per_interval: u32,
    pub priority: i32,
    pub active: bool,
}

impl ScheduleTemplate {
    pub fn applies_on(&self, weekday: u8) -> bool {
        self.days_pattern.contains(&weekday)
    }
}

/// Weekday number of a date: Monday=1 through Sunday=7.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    /// Inspection attempt failed but the order may be re-admitted.
    IneffectiveRetryable,
    IneffectiveTerminal,
}

impl AppointmentStatus {
    /// A non-cancelled appointment holds one unit of its slot's capacity.
    pub fn occupies_capacity(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn is_retry_eligible(&self) -> bool {
        matches!(self, AppointmentStatus::IneffectiveRetryable)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::IneffectiveRetryable => write!(f, "ineffective_retryable"),
            AppointmentStatus::IneffectiveTerminal => write!(f, "ineffective_terminal"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub template_id: Uuid,
    pub branch_id: Uuid,
    pub modality: InspectionModality,
    pub inspection_type: InspectionType,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================================================================
// HOLIDAY CALENDAR (consumed, not computed)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunday_maps_to_weekday_seven() {
        // 2024-06-02 is a Sunday, 2024-06-03 a Monday.
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(weekday_number(sunday), 7);
        assert_eq!(weekday_number(monday), 1);
    }

    #[test]
    fn cancelled_frees_capacity() {
        assert!(!AppointmentStatus::Cancelled.occupies_capacity());
        assert!(AppointmentStatus::Scheduled.occupies_capacity());
        assert!(AppointmentStatus::IneffectiveRetryable.occupies_capacity());
    }
}
