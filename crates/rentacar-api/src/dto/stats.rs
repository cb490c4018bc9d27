//! Revenue statistics DTOs

use chrono::NaiveDate;
use rentacar_core::models::{DailyRevenue, PaymentStatus};
use rentacar_core::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::parse_optional;

/// Date range and payment status filter for revenue queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueParams {
    /// Inclusive start date
    pub from: Option<NaiveDate>,
    /// Inclusive end date
    pub to: Option<NaiveDate>,
    pub payment_status: Option<String>,
}

impl RevenueParams {
    /// Validate the range and parse the status filter
    pub fn parse(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>, Option<PaymentStatus>), AppError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::Validation(
                    "from must not be after to".to_string(),
                ));
            }
        }

        let status = parse_optional(
            self.payment_status.as_deref(),
            "payment_status",
            PaymentStatus::from_str,
        )?;

        Ok((self.from, self.to, status))
    }
}

/// Total revenue over a range
#[derive(Debug, Clone, Serialize)]
pub struct RevenueResponse {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    pub total_revenue: Decimal,
}

/// Revenue per day
#[derive(Debug, Clone, Serialize)]
pub struct DailyRevenueResponse {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub days: Vec<DailyRevenue>,
    pub total_revenue: Decimal,
}

impl DailyRevenueResponse {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>, days: Vec<DailyRevenue>) -> Self {
        let total_revenue = days.iter().map(|d| d.revenue).sum();
        Self {
            from,
            to,
            days,
            total_revenue,
        }
    }
}

/// Fleet and booking overview
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub cars_by_status: BTreeMap<String, i64>,
    pub total_cars: i64,
    pub reservations_by_status: BTreeMap<String, i64>,
    pub total_reservations: i64,
    /// Revenue of approved reservations
    pub confirmed_revenue: Decimal,
}

impl SummaryResponse {
    pub fn new<A, B>(cars: Vec<(A, i64)>, reservations: Vec<(B, i64)>, confirmed_revenue: Decimal) -> Self
    where
        A: ToString,
        B: ToString,
    {
        let cars_by_status: BTreeMap<String, i64> =
            cars.into_iter().map(|(s, n)| (s.to_string(), n)).collect();
        let reservations_by_status: BTreeMap<String, i64> = reservations
            .into_iter()
            .map(|(s, n)| (s.to_string(), n))
            .collect();

        Self {
            total_cars: cars_by_status.values().sum(),
            total_reservations: reservations_by_status.values().sum(),
            cars_by_status,
            reservations_by_status,
            confirmed_revenue,
        }
    }
}
