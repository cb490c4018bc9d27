//! Review DTOs

use rentacar_core::models::{average_rating, Review};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Review submission
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    /// 1 to 5 stars
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Reviews of one car
#[derive(Debug, Clone, Serialize)]
pub struct CarReviewsResponse {
    pub car_id: Uuid,
    pub average_rating: Option<Decimal>,
    pub count: usize,
    pub reviews: Vec<Review>,
}

impl CarReviewsResponse {
    pub fn new(car_id: Uuid, reviews: Vec<Review>) -> Self {
        Self {
            car_id,
            average_rating: average_rating(&reviews),
            count: reviews.len(),
            reviews,
        }
    }
}
