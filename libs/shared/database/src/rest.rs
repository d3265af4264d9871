use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Client for the durable order/appointment store, a PostgREST-style HTTP API.
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.headers();
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Store authentication error: {}", error_text),
                404 => anyhow!("Store resource not found: {}", error_text),
                _ => anyhow!("Store API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

// ==============================================================================
// REST-BACKED STORE IMPLEMENTATIONS
// ==============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_models::domain::{
    Appointment, AppointmentStatus, Holiday, InspectionModality, InspectionType, ScheduleTemplate,
};

use crate::stores::{
    AppointmentStore, CommitOutcome, HolidayCalendar, SlotBucket, TemplateCatalog,
};

pub struct RestTemplateCatalog {
    client: Arc<StoreClient>,
}

impl RestTemplateCatalog {
    pub fn new(client: Arc<StoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TemplateCatalog for RestTemplateCatalog {
    async fn active_templates(
        &self,
        branch_id: Uuid,
        modality: InspectionModality,
        inspection_type: InspectionType,
        weekday: u8,
    ) -> Result<Vec<ScheduleTemplate>> {
        let path = format!(
            "/rest/v1/schedule_templates?branch_id=eq.{}&modality=eq.{}&inspection_type=eq.{}&active=eq.true&days_pattern=cs.{{{}}}&order=priority.desc,start_time.asc",
            branch_id, modality, inspection_type, weekday
        );
        let result: Vec<Value> = self.client.request(Method::GET, &path, None).await?;

        let templates = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<ScheduleTemplate>, _>>()?;

        Ok(templates)
    }

    async fn template_by_id(&self, template_id: Uuid) -> Result<Option<ScheduleTemplate>> {
        let path = format!("/rest/v1/schedule_templates?id=eq.{}", template_id);
        let result: Vec<Value> = self.client.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

pub struct RestAppointmentStore {
    client: Arc<StoreClient>,
}

impl RestAppointmentStore {
    pub fn new(client: Arc<StoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AppointmentStore for RestAppointmentStore {
    async fn occupying_for_date(
        &self,
        branch_id: Uuid,
        modality: InspectionModality,
        inspection_type: InspectionType,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        let path = format!(
            "/rest/v1/appointments?branch_id=eq.{}&modality=eq.{}&inspection_type=eq.{}&date=eq.{}&status=neq.cancelled&order=start_time.asc",
            branch_id, modality, inspection_type, date
        );
        let result: Vec<Value> = self.client.request(Method::GET, &path, None).await?;

        let appointments = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()?;

        Ok(appointments)
    }

    async fn insert_scheduled(
        &self,
        appointment: Appointment,
        bucket: &SlotBucket,
    ) -> Result<CommitOutcome> {
        // The count and the insert must happen inside one store transaction,
        // so they are delegated to an RPC rather than issued as two requests.
        let body = json!({
            "p_appointment": appointment,
            "p_slot_start": bucket.start_time.format("%H:%M:%S").to_string(),
            "p_slot_end": bucket.end_time().format("%H:%M:%S").to_string(),
            "p_capacity": bucket.capacity_per_interval,
        });

        let result: Value = self
            .client
            .request(Method::POST, "/rest/v1/rpc/book_appointment", Some(body))
            .await?;

        if result["booked"].as_bool() == Some(true) {
            let created: Appointment = serde_json::from_value(result["appointment"].clone())?;
            Ok(CommitOutcome::Created(created))
        } else {
            Ok(CommitOutcome::CapacityExhausted)
        }
    }

    async fn latest_for_order(&self, order_id: Uuid) -> Result<Option<Appointment>> {
        let path = format!(
            "/rest/v1/appointments?order_id=eq.{}&order=created_at.desc&limit=1",
            order_id
        );
        let result: Vec<Value> = self.client.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn update_status(&self, appointment_id: Uuid, status: AppointmentStatus) -> Result<()> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .client
            .request_with_headers(Method::PATCH, &path, Some(body), Some(headers))
            .await?;
        Ok(())
    }
}

pub struct RestHolidayCalendar {
    client: Arc<StoreClient>,
}

impl RestHolidayCalendar {
    pub fn new(client: Arc<StoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HolidayCalendar for RestHolidayCalendar {
    async fn holiday_on(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let path = format!("/rest/v1/holidays?date=eq.{}", date);
        let result: Vec<Value> = self.client.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
