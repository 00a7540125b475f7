use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FinancialRecord, Metric, MonthTag};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub currency_id: Uuid,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub month: MonthTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// The month tag is supplied separately: an expense dated in one month may be
    /// booked against another.
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        currency_id: Uuid,
        date: NaiveDate,
        month: MonthTag,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            currency_id,
            date,
            notes: None,
            month,
            owner: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }
}

impl FinancialRecord for Expense {
    fn id(&self) -> Uuid {
        self.id
    }

    fn currency_id(&self) -> Uuid {
        self.currency_id
    }

    fn month(&self) -> MonthTag {
        self.month
    }

    fn owner(&self) -> Option<Uuid> {
        self.owner
    }

    fn amount(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Amount => Some(self.amount),
            _ => None,
        }
    }

    fn metrics(&self) -> &'static [Metric] {
        &[Metric::Amount]
    }
}
