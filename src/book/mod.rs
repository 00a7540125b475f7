//! The persisted aggregate: currency table, record collections and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::CurrencyLedger;
use crate::records::{
    Expense, FinancialRecord, HotelBooking, RecordKind, Salary, SnapshotCache, TicketSale,
    VisaSale,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub currencies: CurrencyLedger,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub salaries: Vec<Salary>,
    #[serde(default)]
    pub tickets: Vec<TicketSale>,
    #[serde(default)]
    pub hotels: Vec<HotelBooking>,
    #[serde(default)]
    pub visas: Vec<VisaSale>,
    #[serde(default)]
    pub snapshots: SnapshotCache,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_currencies(name, CurrencyLedger::new())
    }

    /// Book preloaded with the default EGP/USD/SAR/EUR table.
    pub fn seeded(name: impl Into<String>) -> Self {
        Self::with_currencies(name, CurrencyLedger::seeded())
    }

    pub fn with_currencies(name: impl Into<String>, currencies: CurrencyLedger) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            currencies,
            expenses: Vec::new(),
            salaries: Vec::new(),
            tickets: Vec::new(),
            hotels: Vec::new(),
            visas: Vec::new(),
            snapshots: SnapshotCache::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn salary(&self, id: Uuid) -> Option<&Salary> {
        self.salaries.iter().find(|salary| salary.id == id)
    }

    pub fn record_count(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Expense => self.expenses.len(),
            RecordKind::Salary => self.salaries.len(),
            RecordKind::Ticket => self.tickets.len(),
            RecordKind::Hotel => self.hotels.len(),
            RecordKind::Visa => self.visas.len(),
        }
    }

    /// Whether any record still points at `currency_id`.
    pub fn currency_in_use(&self, currency_id: Uuid) -> bool {
        fn uses<R: FinancialRecord>(records: &[R], id: Uuid) -> bool {
            records.iter().any(|record| record.currency_id() == id)
        }
        uses(&self.expenses, currency_id)
            || uses(&self.salaries, currency_id)
            || uses(&self.tickets, currency_id)
            || uses(&self.hotels, currency_id)
            || uses(&self.visas, currency_id)
    }

    /// Drops a record of any kind together with its snapshot.
    pub fn remove_record(&mut self, kind: RecordKind, id: Uuid) -> bool {
        let before = self.record_count(kind);
        match kind {
            RecordKind::Expense => self.expenses.retain(|record| record.id != id),
            RecordKind::Salary => self.salaries.retain(|record| record.id != id),
            RecordKind::Ticket => self.tickets.retain(|record| record.id != id),
            RecordKind::Hotel => self.hotels.retain(|record| record.id != id),
            RecordKind::Visa => self.visas.retain(|record| record.id != id),
        }
        let removed = self.record_count(kind) != before;
        if removed {
            self.snapshots.remove(id);
            self.touch();
        }
        removed
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
