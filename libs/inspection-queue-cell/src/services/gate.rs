use chrono::{DateTime, Datelike, NaiveTime, Utc};

use shared_models::domain::Holiday;

use crate::models::{WindowReason, WindowStatus};

/// Current wall-clock time at the business location. All stores run in a
/// single offset from UTC, so a fixed shift is enough; DST is handled by
/// changing the configured offset.
pub fn business_now(offset_minutes: i32) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::minutes(offset_minutes as i64)
}

/// Decide whether the virtual inspection counter is open at `local_now`.
///
/// Monday through Friday the counter runs 08:00 to 17:00, Saturday 08:00
/// to 12:00, and it never opens on Sundays or published holidays. The end
/// of a window is exclusive: at exactly 17:00 the counter is closed.
pub fn evaluate_window(local_now: DateTime<Utc>, holiday: Option<&Holiday>) -> WindowStatus {
    if let Some(holiday) = holiday {
        return WindowStatus {
            open: false,
            reason: WindowReason::Holiday {
                name: holiday.name.clone(),
            },
        };
    }

    let weekday = local_now.weekday().number_from_monday();
    if weekday == 7 {
        return WindowStatus {
            open: false,
            reason: WindowReason::Sunday,
        };
    }

    let time = local_now.time();
    let opens = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let closes = if weekday == 6 {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    } else {
        NaiveTime::from_hms_opt(17, 0, 0).unwrap()
    };

    if time >= opens && time < closes {
        WindowStatus {
            open: true,
            reason: WindowReason::Open,
        }
    } else {
        WindowStatus {
            open: false,
            reason: WindowReason::OutsideHours,
        }
    }
}
