//! Reservation DTOs

use chrono::{DateTime, Utc};
use rentacar_core::models::ReservationStatus;
use rentacar_core::traits::ReservationFilter;
use rentacar_core::AppError;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::common::{parse_optional, parse_optional_from_str};

/// Reservation request
///
/// The user comes from the token. Without `total_cost` the price is quoted
/// from the car's daily rate.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_interval"))]
pub struct CreateReservationRequest {
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_cost: Option<Decimal>,
}

fn validate_interval(req: &CreateReservationRequest) -> Result<(), ValidationError> {
    if req.start_date >= req.end_date {
        return Err(ValidationError::new("start_date_not_before_end_date"));
    }
    Ok(())
}

/// Reservation listing filters (admin)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationFilterParams {
    pub status: Option<String>,
    pub car_id: Option<String>,
    pub user_id: Option<String>,
}

impl ReservationFilterParams {
    pub fn to_filter(&self) -> Result<ReservationFilter, AppError> {
        Ok(ReservationFilter {
            status: parse_optional(
                self.status.as_deref(),
                "status",
                ReservationStatus::from_str,
            )?,
            car_id: parse_optional_from_str::<Uuid>(self.car_id.as_deref(), "car_id")?,
            user_id: parse_optional_from_str::<Uuid>(self.user_id.as_deref(), "user_id")?,
        })
    }
}
