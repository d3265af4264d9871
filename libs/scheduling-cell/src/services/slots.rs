use chrono::{NaiveTime, Timelike};

use shared_models::domain::{Appointment, ScheduleTemplate};

use crate::models::TimeSlot;

/// Derive the remaining bounded-capacity slots of a template given the
/// capacity-occupying appointments already booked against the same
/// branch/modality/type/date tuple.
///
/// Pure and deterministic: identical inputs always yield identical output,
/// so concurrent reads need no coordination. Slots with zero remaining
/// capacity are not emitted, and a trailing interval shorter than
/// `interval_minutes` is dropped.
pub fn generate_slots(template: &ScheduleTemplate, occupying: &[Appointment]) -> Vec<TimeSlot> {
    let interval = template.interval_minutes;
    if interval == 0 {
        return Vec::new();
    }

    let start = minutes_past_midnight(template.start_time);
    let end = minutes_past_midnight(template.end_time);

    let mut slots = Vec::new();
    let mut cursor = start;

    while cursor + interval <= end {
        let slot_start = time_from_minutes(cursor);
        let slot_end = time_from_minutes(cursor + interval);

        let occupied = occupying
            .iter()
            .filter(|a| {
                a.status.occupies_capacity()
                    && a.start_time >= slot_start
                    && a.start_time < slot_end
            })
            .count() as u32;

        let available = template.capacity_per_interval.saturating_sub(occupied);
        if available > 0 {
            slots.push(TimeSlot {
                start: slot_start,
                end: slot_end,
                total_capacity: template.capacity_per_interval,
                occupied_count: occupied,
                available_capacity: available,
            });
        }

        cursor += interval;
    }

    slots
}

fn minutes_past_midnight(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

fn time_from_minutes(minutes: u32) -> NaiveTime {
    // Bounded by the template end time, which is itself a valid time of day.
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).unwrap()
}
