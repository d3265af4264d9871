use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{
    AppointmentStore, CommitOutcome, HolidayCalendar, RestAppointmentStore, RestHolidayCalendar,
    RestTemplateCatalog, SlotBucket, StoreClient, TemplateCatalog,
};
use shared_models::domain::{
    Appointment, AppointmentStatus, InspectionModality, InspectionType,
};

fn test_config(store_url: String) -> AppConfig {
    AppConfig {
        store_url,
        store_api_key: "test-api-key".to_string(),
        staff_jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
        order_token_secret: "test-order-token-secret".to_string(),
        business_utc_offset_minutes: 0,
        queue_inactivity_minutes: 10,
        queue_sweep_interval_seconds: 30,
    }
}

#[tokio::test]
async fn active_templates_builds_weekday_filter_and_parses_rows() {
    let server = MockServer::start().await;
    let branch_id = Uuid::new_v4();
    let template_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_templates"))
        .and(query_param("branch_id", format!("eq.{}", branch_id)))
        .and(query_param("modality", "eq.virtual"))
        .and(query_param("inspection_type", "eq.periodic"))
        .and(query_param("active", "eq.true"))
        .and(query_param("days_pattern", "cs.{7}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": template_id,
            "branch_id": branch_id,
            "modality": "virtual",
            "inspection_type": "periodic",
            "days_pattern": [1, 2, 3, 4, 5, 7],
            "start_time": "08:00:00",
            "end_time": "12:00:00",
            "interval_minutes": 30,
            "capacity_per_interval": 2,
            "priority": 10,
            "active": true
        }])))
        .mount(&server)
        .await;

    let client = Arc::new(StoreClient::new(&test_config(server.uri())));
    let catalog = RestTemplateCatalog::new(client);

    let templates = catalog
        .active_templates(
            branch_id,
            InspectionModality::Virtual,
            InspectionType::Periodic,
            7,
        )
        .await
        .expect("catalog request should succeed");

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, template_id);
    assert_eq!(templates[0].capacity_per_interval, 2);
    assert!(templates[0].applies_on(7));
}

#[tokio::test]
async fn template_by_id_returns_none_for_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = Arc::new(StoreClient::new(&test_config(server.uri())));
    let catalog = RestTemplateCatalog::new(client);

    let template = catalog
        .template_by_id(Uuid::new_v4())
        .await
        .expect("catalog request should succeed");
    assert!(template.is_none());
}

#[tokio::test]
async fn insert_scheduled_maps_rpc_refusal_to_capacity_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "booked": false,
            "appointment": null
        })))
        .mount(&server)
        .await;

    let client = Arc::new(StoreClient::new(&test_config(server.uri())));
    let store = RestAppointmentStore::new(client);

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        template_id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        modality: InspectionModality::InPerson,
        inspection_type: InspectionType::Periodic,
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };
    let bucket = SlotBucket {
        branch_id: appointment.branch_id,
        modality: appointment.modality,
        inspection_type: appointment.inspection_type,
        date: appointment.date,
        start_time: appointment.start_time,
        interval_minutes: 30,
        capacity_per_interval: 2,
    };

    let outcome = store
        .insert_scheduled(appointment, &bucket)
        .await
        .expect("rpc request should succeed");
    assert_matches!(outcome, CommitOutcome::CapacityExhausted);
}

#[tokio::test]
async fn holiday_on_parses_holiday_row() {
    let server = MockServer::start().await;
    let date = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/holidays"))
        .and(query_param("date", "eq.2024-07-20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "date": "2024-07-20",
            "name": "Independence Day"
        }])))
        .mount(&server)
        .await;

    let client = Arc::new(StoreClient::new(&test_config(server.uri())));
    let calendar = RestHolidayCalendar::new(client);

    let holiday = calendar
        .holiday_on(date)
        .await
        .expect("calendar request should succeed")
        .expect("holiday should be present");
    assert_eq!(holiday.name, "Independence Day");
}
