use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ticket::{default_passengers, default_payment_method};
use super::{sale_record, MonthTag, Pricing};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelBooking {
    pub id: Uuid,
    pub booking_number: String,
    pub hotel_name: String,
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_source: Option<String>,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    pub pricing: Pricing,
    pub currency_id: Uuid,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub month: MonthTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl HotelBooking {
    /// Bookings are reported in the month of check-in.
    pub fn new(
        booking_number: impl Into<String>,
        hotel_name: impl Into<String>,
        guest_name: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        pricing: Pricing,
        currency_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_number: booking_number.into(),
            hotel_name: hotel_name.into(),
            guest_name: guest_name.into(),
            check_in,
            check_out,
            booking_source: None,
            passengers: default_passengers(),
            pricing,
            currency_id,
            payment_method: default_payment_method(),
            notes: None,
            month: MonthTag::from_date(check_in),
            owner: None,
            created_at: Utc::now(),
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }
}

sale_record!(HotelBooking);
