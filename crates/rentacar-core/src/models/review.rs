//! Review model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted rating
pub const MIN_RATING: i16 = 1;

/// Highest accepted rating
pub const MAX_RATING: i16 = 5;

/// Customer review of a car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    /// 1 to 5 stars
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user_id: Uuid, car_id: Uuid, rating: i16, comment: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            car_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// Mean rating over a set of reviews, rounded to two places
pub fn average_rating(reviews: &[Review]) -> Option<Decimal> {
    if reviews.is_empty() {
        return None;
    }

    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let avg = Decimal::from(total) / Decimal::from(reviews.len() as i64);
    Some(avg.round_dp(2))
}
