use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use inspection_queue_cell::{InspectionQueueService, QueueEntryState, QueueNotifierService};
use shared_database::InMemoryAppointmentStore;
use shared_models::domain::{
    Appointment, AppointmentStatus, InspectionModality, InspectionType,
};

struct Fixture {
    appointments: Arc<InMemoryAppointmentStore>,
    notifier: QueueNotifierService,
    service: Arc<InspectionQueueService>,
}

fn fixture(inactivity_minutes: i64) -> Fixture {
    let appointments = Arc::new(InMemoryAppointmentStore::new());
    let notifier = QueueNotifierService::new();
    let service = Arc::new(InspectionQueueService::new(
        appointments.clone(),
        notifier.clone(),
        inactivity_minutes,
    ));
    Fixture {
        appointments,
        notifier,
        service,
    }
}

fn appointment(order_id: Uuid, status: AppointmentStatus) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        order_id,
        template_id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        modality: InspectionModality::Virtual,
        inspection_type: InspectionType::Periodic,
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        status,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn repeated_admission_returns_the_active_entry() {
    let f = fixture(10);
    let order_id = Uuid::new_v4();

    let first = f.service.admit(order_id).await.unwrap();
    assert!(first.created);
    assert_eq!(first.entry.state, QueueEntryState::Waiting);

    let second = f.service.admit(order_id).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.entry.id, first.entry.id);
}

#[tokio::test]
async fn concurrent_admissions_for_one_order_yield_one_entry() {
    let f = fixture(10);
    let order_id = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = f.service.clone();
        handles.push(tokio::spawn(async move { service.admit(order_id).await }));
    }

    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.created {
            created += 1;
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn expiry_marks_latest_appointment_retryable_and_frees_readmission() {
    // Zero inactivity budget: the entry is due the moment it exists.
    let f = fixture(0);
    let order_id = Uuid::new_v4();
    let appt = appointment(order_id, AppointmentStatus::Scheduled);
    let appt_id = appt.id;
    f.appointments.insert_unchecked(appt).await;

    let first = f.service.admit(order_id).await.unwrap();
    assert!(first.created);

    let expired = f.service.expire_all_due().await.unwrap();
    assert_eq!(expired, 1);

    let stored = f.appointments.all().await;
    let updated = stored.iter().find(|a| a.id == appt_id).unwrap();
    assert_eq!(updated.status, AppointmentStatus::IneffectiveRetryable);

    // Expiry is one-shot.
    assert_eq!(f.service.expire_all_due().await.unwrap(), 0);

    // The order can rejoin with a fresh entry.
    let again = f.service.admit(order_id).await.unwrap();
    assert!(again.created);
    assert_ne!(again.entry.id, first.entry.id);
}

#[tokio::test]
async fn retryable_appointment_supersedes_a_stale_entry() {
    let f = fixture(10);
    let order_id = Uuid::new_v4();

    let first = f.service.admit(order_id).await.unwrap();
    assert!(first.created);

    // The appointment turned retryable after the entry was enqueued, so the
    // entry is stale and the retry deserves a fresh countdown.
    f.appointments
        .insert_unchecked(appointment(order_id, AppointmentStatus::IneffectiveRetryable))
        .await;

    let second = f.service.admit(order_id).await.unwrap();
    assert!(second.created);
    assert_ne!(second.entry.id, first.entry.id);

    // The superseded entry is terminal, so only one entry stays active.
    let third = f.service.admit(order_id).await.unwrap();
    assert!(!third.created);
    assert_eq!(third.entry.id, second.entry.id);
}

#[tokio::test]
async fn status_reports_countdown_and_position() {
    let f = fixture(10);
    let first_order = Uuid::new_v4();
    let second_order = Uuid::new_v4();

    f.service.admit(first_order).await.unwrap();
    f.service.admit(second_order).await.unwrap();

    let status = f.service.status(second_order).await.unwrap().unwrap();
    assert_eq!(status.position, Some(2));
    assert!(status.remaining_seconds > 590 && status.remaining_seconds <= 600);

    let missing = f.service.status(Uuid::new_v4()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn assignment_is_first_in_first_out() {
    let f = fixture(10);
    let first_order = Uuid::new_v4();
    let second_order = Uuid::new_v4();
    let inspector = Uuid::new_v4();

    f.service.admit(first_order).await.unwrap();
    f.service.admit(second_order).await.unwrap();

    let first = f.service.assign_next(inspector).await.unwrap().unwrap();
    assert_eq!(first.order_id, first_order);
    assert!(matches!(first.state, QueueEntryState::Assigned { .. }));

    let second = f.service.assign_next(inspector).await.unwrap().unwrap();
    assert_eq!(second.order_id, second_order);

    assert!(f.service.assign_next(inspector).await.unwrap().is_none());
}

#[tokio::test]
async fn assigned_entry_with_budget_left_survives_the_sweep() {
    let f = fixture(10);
    let order_id = Uuid::new_v4();
    let inspector = Uuid::new_v4();

    f.service.admit(order_id).await.unwrap();
    let assigned = f.service.assign_next(inspector).await.unwrap().unwrap();
    assert_eq!(assigned.order_id, order_id);

    assert_eq!(f.service.expire_all_due().await.unwrap(), 0);

    let status = f.service.status(order_id).await.unwrap().unwrap();
    assert!(matches!(status.entry.state, QueueEntryState::Assigned { .. }));
    assert_eq!(status.position, None);
}

#[tokio::test]
async fn due_entries_are_never_assigned() {
    let f = fixture(0);
    let order_id = Uuid::new_v4();
    let inspector = Uuid::new_v4();

    f.service.admit(order_id).await.unwrap();

    // The sweep built into assignment retires the due entry first.
    assert!(f.service.assign_next(inspector).await.unwrap().is_none());

    let status = f.service.status(order_id).await.unwrap().unwrap();
    assert!(matches!(status.entry.state, QueueEntryState::Expired { .. }));
}

#[tokio::test]
async fn assignment_event_reaches_subscribers() {
    let f = fixture(10);
    let order_id = Uuid::new_v4();
    let inspector = Uuid::new_v4();

    let mut receiver = f.notifier.subscribe(order_id).await;

    f.service.admit(order_id).await.unwrap();
    f.service.assign_next(inspector).await.unwrap().unwrap();

    let raw = receiver.recv().await.unwrap();
    let event: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(event["event"], "assigned");
    assert_eq!(event["order_id"], order_id.to_string());
    assert_eq!(event["inspector_id"], inspector.to_string());
}

#[tokio::test]
async fn expiry_event_reaches_subscribers() {
    let f = fixture(0);
    let order_id = Uuid::new_v4();

    let mut receiver = f.notifier.subscribe(order_id).await;

    f.service.admit(order_id).await.unwrap();
    f.service.expire_all_due().await.unwrap();

    let raw = receiver.recv().await.unwrap();
    let event: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(event["event"], "expired");
    assert_eq!(event["order_id"], order_id.to_string());
}
