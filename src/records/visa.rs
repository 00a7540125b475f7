use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ticket::default_payment_method;
use super::{sale_record, MonthTag, Pricing};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisaSale {
    pub id: Uuid,
    pub visa_type: String,
    #[serde(default)]
    pub duration: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub applicant_name: String,
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

impl VisaSale {
    pub fn new(
        visa_type: impl Into<String>,
        country: impl Into<String>,
        applicant_name: impl Into<String>,
        pricing: Pricing,
        currency_id: Uuid,
        month: MonthTag,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            visa_type: visa_type.into(),
            duration: String::new(),
            country: country.into(),
            source: None,
            applicant_name: applicant_name.into(),
            pricing,
            currency_id,
            payment_method: default_payment_method(),
            notes: None,
            month,
            owner: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }
}

sale_record!(VisaSale);
