//! Car model
//!
//! Vehicle inventory entries and their availability status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const SECONDS_PER_DAY: i64 = 86_400;

/// Car availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    /// Free to be booked
    #[default]
    Available,
    /// Held by a confirmed reservation
    Reserved,
    /// Taken out of the fleet by an administrator
    Maintenance,
    /// Currently with a customer
    Rented,
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarStatus::Available => write!(f, "available"),
            CarStatus::Reserved => write!(f, "reserved"),
            CarStatus::Maintenance => write!(f, "maintenance"),
            CarStatus::Rented => write!(f, "rented"),
        }
    }
}

impl CarStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(CarStatus::Available),
            "reserved" => Some(CarStatus::Reserved),
            "maintenance" => Some(CarStatus::Maintenance),
            "rented" => Some(CarStatus::Rented),
            _ => None,
        }
    }

    /// Whether a booking currently holds the car
    pub fn is_booked(&self) -> bool {
        matches!(self, CarStatus::Reserved | CarStatus::Rented)
    }
}

/// Fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelType::Petrol => write!(f, "petrol"),
            FuelType::Diesel => write!(f, "diesel"),
            FuelType::Electric => write!(f, "electric"),
            FuelType::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FuelType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "petrol" | "gasoline" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "electric" => Some(FuelType::Electric),
            "hybrid" => Some(FuelType::Hybrid),
            _ => None,
        }
    }
}

/// Gearbox type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    #[default]
    Manual,
    Automatic,
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transmission::Manual => write!(f, "manual"),
            Transmission::Automatic => write!(f, "automatic"),
        }
    }
}

impl Transmission {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(Transmission::Manual),
            "automatic" => Some(Transmission::Automatic),
            _ => None,
        }
    }
}

/// Vehicle size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CarSize {
    Small,
    #[default]
    Medium,
    Large,
    Suv,
    Van,
}

impl fmt::Display for CarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarSize::Small => write!(f, "small"),
            CarSize::Medium => write!(f, "medium"),
            CarSize::Large => write!(f, "large"),
            CarSize::Suv => write!(f, "suv"),
            CarSize::Van => write!(f, "van"),
        }
    }
}

impl CarSize {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(CarSize::Small),
            "medium" => Some(CarSize::Medium),
            "large" => Some(CarSize::Large),
            "suv" => Some(CarSize::Suv),
            "van" => Some(CarSize::Van),
            _ => None,
        }
    }
}

/// Car entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    /// Unique identifier
    pub id: Uuid,

    /// Manufacturer
    pub make: String,

    /// Model name
    pub model: String,

    /// Model year
    pub year: i32,

    pub fuel_type: FuelType,

    pub transmission: Transmission,

    /// Odometer reading in kilometres
    pub mileage: i32,

    pub size: CarSize,

    /// Price per rental day
    pub daily_rate: Decimal,

    /// Reference to the stored vehicle image
    pub image_url: Option<String>,

    /// Current availability
    pub status: CarStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Number of billable days for an interval (partial days round up, minimum 1)
    pub fn rental_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let seconds = (end - start).num_seconds().max(0);
        ((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
    }

    /// Price of renting this car over `[start, end]`
    pub fn quote(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
        self.daily_rate * Decimal::from(Self::rental_days(start, end))
    }

    /// Display name, e.g. "Toyota Corolla (2022)"
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.year)
    }
}

impl Default for Car {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            make: String::new(),
            model: String::new(),
            year: 2024,
            fuel_type: FuelType::default(),
            transmission: Transmission::default(),
            mileage: 0,
            size: CarSize::default(),
            daily_rate: Decimal::ZERO,
            image_url: None,
            status: CarStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }
}
