//! Revenue statistics model
//!
//! Shadow record kept in lockstep with a reservation's approval state.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::reservation::Reservation;

/// Payment status mirrored from the reservation
///
/// There is no `completed` value: revenue recognition stops at `confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Confirmed => write!(f, "confirmed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "confirmed" => Some(PaymentStatus::Confirmed),
            "cancelled" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

/// Statistics entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    /// Unique identifier
    pub id: Uuid,

    /// Calendar date of the reservation start
    pub date: NaiveDate,

    /// Revenue copied from the reservation's total cost
    pub revenue: Decimal,

    pub payment_status: PaymentStatus,

    /// Back-reference to the reservation
    pub reservation_id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Statistics {
    /// Build the pending shadow record for a freshly created reservation
    pub fn for_reservation(reservation: &Reservation) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: reservation.start_date.date_naive(),
            revenue: reservation.total_cost,
            payment_status: PaymentStatus::Pending,
            reservation_id: reservation.id,
            created_at: Utc::now(),
        }
    }
}

/// Revenue summed over one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub reservations: i64,
}
