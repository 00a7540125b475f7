use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{sale_record, MonthTag, Pricing};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketSale {
    pub id: Uuid,
    pub ticket_number: String,
    pub pnr: String,
    pub departure: String,
    pub arrival: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_source: Option<String>,
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

impl TicketSale {
    pub fn new(
        ticket_number: impl Into<String>,
        pnr: impl Into<String>,
        departure: impl Into<String>,
        arrival: impl Into<String>,
        pricing: Pricing,
        currency_id: Uuid,
        month: MonthTag,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_number: ticket_number.into(),
            pnr: pnr.into(),
            departure: departure.into(),
            arrival: arrival.into(),
            customer_name: None,
            ticket_source: None,
            passengers: default_passengers(),
            pricing,
            currency_id,
            payment_method: default_payment_method(),
            notes: None,
            month,
            owner: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_customer(mut self, customer_name: impl Into<String>) -> Self {
        self.customer_name = Some(customer_name.into());
        self
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }
}

sale_record!(TicketSale);

pub(crate) fn default_passengers() -> u32 {
    1
}

pub(crate) fn default_payment_method() -> String {
    "cash".into()
}
