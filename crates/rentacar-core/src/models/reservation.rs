//! Car reservation model
//!
//! A user's request to use a specific car over a date interval.
//! The reservation lifecycle:
//! 1. Created by a customer (Pending)
//! 2. Approved by an administrator (Confirmed) or rejected (Cancelled, then deleted)
//! 3. Completed by the reconciliation sweep once its end date has passed

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting administrator decision
    #[default]
    Pending,
    /// Approved; the car is reserved
    Confirmed,
    /// Rejected by an administrator
    Cancelled,
    /// The rental period is over
    Completed,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
            ReservationStatus::Completed => write!(f, "completed"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "completed" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }

    /// Live reservations carry a statistics shadow record
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        )
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Customer who booked
    pub user_id: Uuid,

    /// Booked car
    pub car_id: Uuid,

    /// Start of the rental interval
    pub start_date: DateTime<Utc>,

    /// End of the rental interval
    pub end_date: DateTime<Utc>,

    /// Current status
    pub status: ReservationStatus,

    /// Price agreed at booking time
    pub total_cost: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Create a new pending reservation
    pub fn new(
        user_id: Uuid,
        car_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        total_cost: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            car_id,
            start_date,
            end_date,
            status: ReservationStatus::Pending,
            total_cost,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the interval contains `at` (both ends inclusive)
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }

    /// Whether the interval intersects `[start, end]`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

impl Default for Reservation {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            car_id: Uuid::nil(),
            start_date: now,
            end_date: now + chrono::Duration::days(1),
            status: ReservationStatus::Pending,
            total_cost: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}
