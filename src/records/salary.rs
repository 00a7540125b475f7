use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FinancialRecord, Metric, MonthTag};

/// One salary payment to an employee. The reporting month follows the payment date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Salary {
    pub id: Uuid,
    pub employee_name: String,
    pub job_title: String,
    pub amount: f64,
    pub currency_id: Uuid,
    pub payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Salary {
    pub fn new(
        employee_name: impl Into<String>,
        job_title: impl Into<String>,
        amount: f64,
        currency_id: Uuid,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_name: employee_name.into(),
            job_title: job_title.into(),
            amount,
            currency_id,
            payment_date,
            owner: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Copy of this payment dated on the first day of the following month.
    pub fn next_payment(&self) -> Self {
        let next_month = MonthTag::from_date(self.payment_date).next();
        Self {
            id: Uuid::new_v4(),
            employee_name: self.employee_name.clone(),
            job_title: self.job_title.clone(),
            amount: self.amount,
            currency_id: self.currency_id,
            payment_date: next_month.first_day(),
            owner: self.owner,
            created_at: Utc::now(),
        }
    }
}

impl FinancialRecord for Salary {
    fn id(&self) -> Uuid {
        self.id
    }

    fn currency_id(&self) -> Uuid {
        self.currency_id
    }

    fn month(&self) -> MonthTag {
        MonthTag::from_date(self.payment_date)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_payment_moves_to_first_of_next_month() {
        let salary = Salary::new(
            "John Doe",
            "Accountant",
            5000.0,
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 6, 17).unwrap(),
        );
        let next = salary.next_payment();
        assert_eq!(next.payment_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_ne!(next.id, salary.id);
        assert_eq!(next.amount, salary.amount);
    }

    #[test]
    fn december_payment_rolls_into_january() {
        let salary = Salary::new(
            "John Doe",
            "Accountant",
            5000.0,
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        );
        let next = salary.next_payment();
        assert_eq!(next.payment_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(next.currency_id, salary.currency_id);
        assert_eq!(next.month().to_string(), "2026-01");
    }
}
