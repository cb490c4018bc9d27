//! Car inventory DTOs

use chrono::{DateTime, Utc};
use rentacar_core::models::{Car, CarSize, CarStatus, FuelType, Transmission};
use rentacar_core::traits::CarFilter;
use rentacar_core::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::common::{parse_optional, parse_optional_from_str};

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

/// Car creation request (admin)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CarCreateRequest {
    #[validate(length(min = 1, max = 50, message = "Make is required"))]
    pub make: String,

    #[validate(length(min = 1, max = 50, message = "Model is required"))]
    pub model: String,

    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,

    /// petrol, diesel, electric or hybrid
    pub fuel_type: String,

    /// manual or automatic
    pub transmission: String,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub mileage: i32,

    /// small, medium, large, suv or van
    pub size: String,

    #[validate(custom(function = "validate_non_negative"))]
    pub daily_rate: Decimal,

    /// Stored reference to the vehicle image
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
}

impl CarCreateRequest {
    /// Convert to Car entity
    pub fn to_car(&self) -> Result<Car, AppError> {
        let now = Utc::now();
        Ok(Car {
            id: Uuid::new_v4(),
            make: self.make.trim().to_string(),
            model: self.model.trim().to_string(),
            year: self.year,
            fuel_type: required(&self.fuel_type, "fuel_type", FuelType::from_str)?,
            transmission: required(&self.transmission, "transmission", Transmission::from_str)?,
            mileage: self.mileage,
            size: required(&self.size, "size", CarSize::from_str)?,
            daily_rate: self.daily_rate,
            image_url: self.image_url.clone(),
            status: CarStatus::Available,
            created_at: now,
            updated_at: now,
        })
    }
}

fn required<T>(value: &str, field: &str, parse: fn(&str) -> Option<T>) -> Result<T, AppError> {
    parse(value.trim()).ok_or_else(|| AppError::Validation(format!("Invalid {}: {}", field, value)))
}

/// Car update request (admin)
///
/// Only `available` and `maintenance` may be set by hand; `reserved` and
/// `rented` are driven by the reservation workflow.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CarUpdateRequest {
    #[validate(length(min = 1, max = 50))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    pub fuel_type: Option<String>,

    pub transmission: Option<String>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    pub size: Option<String>,

    #[validate(custom(function = "validate_non_negative"))]
    pub daily_rate: Option<Decimal>,

    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    pub status: Option<String>,
}

impl CarUpdateRequest {
    /// Apply the present detail fields to `car`; status is left alone
    pub fn apply(&self, car: &mut Car) -> Result<(), AppError> {
        if let Some(make) = &self.make {
            car.make = make.trim().to_string();
        }
        if let Some(model) = &self.model {
            car.model = model.trim().to_string();
        }
        if let Some(year) = self.year {
            car.year = year;
        }
        if let Some(fuel_type) =
            parse_optional(self.fuel_type.as_deref(), "fuel_type", FuelType::from_str)?
        {
            car.fuel_type = fuel_type;
        }
        if let Some(transmission) = parse_optional(
            self.transmission.as_deref(),
            "transmission",
            Transmission::from_str,
        )? {
            car.transmission = transmission;
        }
        if let Some(mileage) = self.mileage {
            car.mileage = mileage;
        }
        if let Some(size) = parse_optional(self.size.as_deref(), "size", CarSize::from_str)? {
            car.size = size;
        }
        if let Some(rate) = self.daily_rate {
            car.daily_rate = rate;
        }
        if let Some(image_url) = &self.image_url {
            car.image_url = Some(image_url.clone()).filter(|u| !u.is_empty());
        }

        car.updated_at = Utc::now();
        Ok(())
    }

    /// The requested status, if any
    ///
    /// Applied separately from the other fields, under the car lock.
    pub fn requested_status(&self) -> Result<Option<CarStatus>, AppError> {
        parse_optional(self.status.as_deref(), "status", CarStatus::from_str)
    }
}

/// Car listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilterParams {
    pub status: Option<String>,
    pub make: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub size: Option<String>,
    pub min_rate: Option<String>,
    pub max_rate: Option<String>,
}

impl CarFilterParams {
    /// Parse into the repository filter
    pub fn to_filter(&self) -> Result<CarFilter, AppError> {
        let filter = CarFilter {
            status: parse_optional(self.status.as_deref(), "status", CarStatus::from_str)?,
            make: self
                .make
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            fuel_type: parse_optional(self.fuel_type.as_deref(), "fuel_type", FuelType::from_str)?,
            transmission: parse_optional(
                self.transmission.as_deref(),
                "transmission",
                Transmission::from_str,
            )?,
            size: parse_optional(self.size.as_deref(), "size", CarSize::from_str)?,
            min_rate: parse_optional_from_str(self.min_rate.as_deref(), "min_rate")?,
            max_rate: parse_optional_from_str(self.max_rate.as_deref(), "max_rate")?,
        };

        if let (Some(min), Some(max)) = (filter.min_rate, filter.max_rate) {
            if min > max {
                return Err(AppError::Validation(
                    "min_rate must not exceed max_rate".to_string(),
                ));
            }
        }

        Ok(filter)
    }
}

/// Availability query
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityParams {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Availability answer for one car and interval
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub available: bool,
    /// Price of the interval at the car's current rate
    pub quote: Decimal,
    /// Live reservations intersecting the interval
    pub conflicting_reservations: usize,
}
