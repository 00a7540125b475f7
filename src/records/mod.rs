//! Financial record types: expenses, salaries and the three kinds of sales.

// Shared `FinancialRecord` impl for records priced through `Pricing`.
macro_rules! sale_record {
    ($ty:ty) => {
        impl $crate::records::FinancialRecord for $ty {
            fn id(&self) -> uuid::Uuid {
                self.id
            }

            fn currency_id(&self) -> uuid::Uuid {
                self.currency_id
            }

            fn month(&self) -> $crate::records::MonthTag {
                self.month
            }

            fn owner(&self) -> Option<uuid::Uuid> {
                self.owner
            }

            fn amount(&self, metric: $crate::records::Metric) -> Option<f64> {
                self.pricing.amount(metric)
            }

            fn metrics(&self) -> &'static [$crate::records::Metric] {
                &$crate::records::Metric::SALE
            }
        }
    };
}

pub(crate) use sale_record;

pub mod expense;
pub mod hotel;
pub mod month;
pub mod pricing;
pub mod salary;
pub mod snapshot;
pub mod ticket;
pub mod visa;

pub use expense::Expense;
pub use hotel::HotelBooking;
pub use month::MonthTag;
pub use pricing::Pricing;
pub use salary::Salary;
pub use snapshot::{AmountSnapshot, SnapshotCache, SnapshotEntry};
pub use ticket::TicketSale;
pub use visa::VisaSale;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

/// Monetary field carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Single amount of an expense or salary.
    Amount,
    Purchase,
    Selling,
    Fees,
    Profit,
}

impl Metric {
    pub const SALE: [Metric; 4] = [
        Metric::Purchase,
        Metric::Selling,
        Metric::Fees,
        Metric::Profit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Amount => "amount",
            Metric::Purchase => "purchase",
            Metric::Selling => "selling",
            Metric::Fees => "fees",
            Metric::Profit => "profit",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Expense,
    Salary,
    Ticket,
    Hotel,
    Visa,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Expense,
        RecordKind::Salary,
        RecordKind::Ticket,
        RecordKind::Hotel,
        RecordKind::Visa,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expenses",
            RecordKind::Salary => "salaries",
            RecordKind::Ticket => "tickets",
            RecordKind::Hotel => "hotels",
            RecordKind::Visa => "visas",
        }
    }

    /// Metric summed on dashboards for this kind.
    pub fn headline_metric(&self) -> Metric {
        match self {
            RecordKind::Expense | RecordKind::Salary => Metric::Amount,
            RecordKind::Ticket | RecordKind::Hotel | RecordKind::Visa => Metric::Profit,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordKind {
    type Err = LedgerError;

    /// Accepts the plural section label or its singular form, case-insensitively.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim().to_ascii_lowercase();
        RecordKind::ALL
            .into_iter()
            .find(|kind| {
                let label = kind.label();
                needle == label || Some(needle.as_str()) == label.strip_suffix('s')
            })
            .or(match needle.as_str() {
                "salary" => Some(RecordKind::Salary),
                _ => None,
            })
            .ok_or_else(|| LedgerError::Validation(format!("unknown record kind `{}`", raw)))
    }
}

/// Shape shared by every record the aggregation engine consumes.
pub trait FinancialRecord {
    fn id(&self) -> Uuid;
    fn currency_id(&self) -> Uuid;
    fn month(&self) -> MonthTag;
    fn owner(&self) -> Option<Uuid>;
    fn amount(&self, metric: Metric) -> Option<f64>;
    /// Metrics captured in the conversion snapshot when the record is written.
    fn metrics(&self) -> &'static [Metric];
}

/// Visibility filter applied on top of the owner tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerScope {
    #[default]
    All,
    Owner(Uuid),
}

impl OwnerScope {
    pub fn admits(&self, owner: Option<Uuid>) -> bool {
        match self {
            OwnerScope::All => true,
            OwnerScope::Owner(id) => owner == Some(*id),
        }
    }
}
