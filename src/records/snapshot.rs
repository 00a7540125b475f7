//! Write-time conversion snapshots.
//!
//! When a record is stored, each of its monetary fields is converted into every
//! well-known currency and kept here, keyed by `(record id, metric, currency)`.
//! Snapshots are point-in-time values: later exchange-rate edits never touch them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::currency::{CurrencyCode, CurrencyLedger};

use super::{FinancialRecord, Metric};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub metric: Metric,
    pub currency: CurrencyCode,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountSnapshot {
    pub source_currency: CurrencyCode,
    pub taken_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

impl AmountSnapshot {
    /// Converts every metric of `record` into `targets` plus the record's own currency.
    /// Returns `None` when the record's currency is unknown to the ledger.
    pub fn capture<R>(record: &R, ledger: &CurrencyLedger, targets: &[CurrencyCode]) -> Option<Self>
    where
        R: FinancialRecord + ?Sized,
    {
        let Some(source) = ledger.get(record.currency_id()) else {
            warn!(record = %record.id(), "snapshot skipped, record currency unknown");
            return None;
        };
        let mut codes: Vec<CurrencyCode> = vec![source.code.clone()];
        for code in targets {
            if codes.contains(code) {
                continue;
            }
            if ledger.by_code(code.as_str()).is_none() {
                warn!(code = %code, "snapshot target currency not defined, skipping");
                continue;
            }
            codes.push(code.clone());
        }

        let mut entries = Vec::new();
        for metric in record.metrics() {
            let Some(amount) = record.amount(*metric) else {
                continue;
            };
            for code in &codes {
                let value = if *code == source.code {
                    amount
                } else {
                    ledger.convert_codes(amount, source.code.as_str(), code.as_str())
                };
                entries.push(SnapshotEntry {
                    metric: *metric,
                    currency: code.clone(),
                    amount: value,
                });
            }
        }
        debug!(record = %record.id(), entries = entries.len(), "captured snapshot");
        Some(Self {
            source_currency: source.code.clone(),
            taken_at: Utc::now(),
            entries,
        })
    }

    pub fn value(&self, metric: Metric, currency: &CurrencyCode) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.metric == metric && entry.currency == *currency)
            .map(|entry| entry.amount)
    }
}

/// Snapshot store attached to a book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotCache {
    #[serde(default)]
    entries: BTreeMap<Uuid, AmountSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record_id: Uuid, snapshot: AmountSnapshot) {
        self.entries.insert(record_id, snapshot);
    }

    pub fn snapshot(&self, record_id: Uuid) -> Option<&AmountSnapshot> {
        self.entries.get(&record_id)
    }

    pub fn get(&self, record_id: Uuid, metric: Metric, currency: &CurrencyCode) -> Option<f64> {
        self.entries
            .get(&record_id)
            .and_then(|snapshot| snapshot.value(metric, currency))
    }

    /// Duplicates the snapshot of `from` under `to` without re-converting anything.
    pub fn copy_forward(&mut self, from: Uuid, to: Uuid) -> bool {
        match self.entries.get(&from).cloned() {
            Some(snapshot) => {
                self.entries.insert(to, snapshot);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, record_id: Uuid) -> Option<AmountSnapshot> {
        self.entries.remove(&record_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{Currency, CurrencyUpdate};
    use crate::records::{Expense, MonthTag, Pricing, TicketSale};
    use chrono::NaiveDate;

    fn ledger() -> CurrencyLedger {
        CurrencyLedger::seeded()
    }

    fn well_known() -> Vec<CurrencyCode> {
        ["EGP", "USD", "EUR", "SAR"]
            .into_iter()
            .map(CurrencyCode::new)
            .collect()
    }

    #[test]
    fn own_currency_keeps_raw_amount() {
        let ledger = ledger();
        let usd = ledger.by_code("USD").unwrap().id;
        let expense = Expense::new(
            "Licence",
            33.333,
            usd,
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            MonthTag::new(2025, 6).unwrap(),
        );
        let snapshot = AmountSnapshot::capture(&expense, &ledger, &well_known()).unwrap();
        assert_eq!(
            snapshot.value(Metric::Amount, &CurrencyCode::new("USD")),
            Some(33.333)
        );
        assert_eq!(
            snapshot.value(Metric::Amount, &CurrencyCode::new("EGP")),
            Some(1599.98)
        );
    }

    #[test]
    fn captures_every_sale_metric() {
        let ledger = ledger();
        let sar = ledger.by_code("SAR").unwrap().id;
        let ticket = TicketSale::new(
            "TICK123",
            "PNR001",
            "Riyadh",
            "Cairo",
            Pricing::new(2000.0, 2500.0, Some(100.0)),
            sar,
            MonthTag::new(2025, 6).unwrap(),
        );
        let snapshot = AmountSnapshot::capture(&ticket, &ledger, &well_known()).unwrap();
        assert_eq!(snapshot.entries.len(), 16);
        assert_eq!(
            snapshot.value(Metric::Profit, &CurrencyCode::new("EGP")),
            Some(5120.0)
        );
    }

    #[test]
    fn snapshot_ignores_later_rate_changes() {
        let mut ledger = ledger();
        let usd = ledger.by_code("USD").unwrap().id;
        let expense = Expense::new(
            "Visa fees",
            10.0,
            usd,
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            MonthTag::new(2025, 6).unwrap(),
        );
        let mut cache = SnapshotCache::new();
        cache.insert(
            expense.id,
            AmountSnapshot::capture(&expense, &ledger, &well_known()).unwrap(),
        );
        ledger
            .update(
                usd,
                CurrencyUpdate {
                    code: "USD".into(),
                    name: "US Dollar".into(),
                    symbol: "$".into(),
                    exchange_rate: 50.0,
                },
            )
            .unwrap();
        assert_eq!(
            cache.get(expense.id, Metric::Amount, &CurrencyCode::new("EGP")),
            Some(480.0)
        );
    }

    #[test]
    fn copy_forward_duplicates_values() {
        let mut ledger = ledger();
        let jpy = ledger
            .insert(Currency::new("JPY", "Yen", "¥", 0.32))
            .unwrap();
        let expense = Expense::new(
            "Gift",
            1000.0,
            jpy,
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            MonthTag::new(2025, 6).unwrap(),
        );
        let mut cache = SnapshotCache::new();
        cache.insert(
            expense.id,
            AmountSnapshot::capture(&expense, &ledger, &well_known()).unwrap(),
        );
        let copy = Uuid::new_v4();
        assert!(cache.copy_forward(expense.id, copy));
        assert_eq!(cache.snapshot(copy), cache.snapshot(expense.id));
        assert!(!cache.copy_forward(Uuid::new_v4(), Uuid::new_v4()));
    }
}
