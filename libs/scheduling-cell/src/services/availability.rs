use std::sync::Arc;

use tracing::debug;

use shared_database::{AppointmentStore, TemplateCatalog};
use shared_models::domain::weekday_number;

use crate::error::SchedulingError;
use crate::models::{
    AvailabilityQuery, TemplateAvailability, ValidatedAvailabilityQuery,
};
use crate::services::slots::generate_slots;

/// Read-only availability queries. Stateless: safe for unbounded parallel
/// execution, and two calls with no intervening writes return identical
/// output.
#[derive(Clone)]
pub struct AvailabilityService {
    catalog: Arc<dyn TemplateCatalog>,
    appointments: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(catalog: Arc<dyn TemplateCatalog>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            catalog,
            appointments,
        }
    }

    pub async fn availability_for(
        &self,
        query: AvailabilityQuery,
    ) -> Result<Vec<TemplateAvailability>, SchedulingError> {
        let query = validate(query)?;
        let weekday = weekday_number(query.date);

        let mut templates = self
            .catalog
            .active_templates(
                query.branch_id,
                query.modality,
                query.inspection_type,
                weekday,
            )
            .await?;

        // Presentation ordering only; capacity is unaffected.
        templates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.start_time.cmp(&b.start_time))
        });

        let occupying = self
            .appointments
            .occupying_for_date(
                query.branch_id,
                query.modality,
                query.inspection_type,
                query.date,
            )
            .await?;

        let results: Vec<TemplateAvailability> = templates
            .iter()
            .map(|template| TemplateAvailability {
                template: template.into(),
                slots: generate_slots(template, &occupying),
            })
            .collect();

        debug!(
            branch_id = %query.branch_id,
            date = %query.date,
            templates = results.len(),
            "Computed availability"
        );

        // No remaining capacity is a valid, successful result.
        Ok(results)
    }
}

fn validate(query: AvailabilityQuery) -> Result<ValidatedAvailabilityQuery, SchedulingError> {
    let branch_id = query
        .branch_id
        .ok_or_else(|| SchedulingError::Validation("branch_id is required".to_string()))?;
    let modality = query
        .modality
        .ok_or_else(|| SchedulingError::Validation("modality is required".to_string()))?;
    let inspection_type = query
        .inspection_type
        .ok_or_else(|| SchedulingError::Validation("inspection_type is required".to_string()))?;
    let date = query
        .date
        .ok_or_else(|| SchedulingError::Validation("date is required".to_string()))?;

    Ok(ValidatedAvailabilityQuery {
        branch_id,
        modality,
        inspection_type,
        date,
    })
}
