//! Monthly and yearly totals expressed in the base currency.

use serde::Serialize;
use tracing::{debug, warn};

use crate::currency::{round2, Currency, CurrencyLedger};
use crate::errors::LedgerError;
use crate::records::{FinancialRecord, Metric, MonthTag, OwnerScope, SnapshotCache};

/// Where a converted amount comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valuation {
    /// Convert the raw amount with today's rates.
    Live,
    /// Read the value captured when the record was written.
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountSelector {
    pub metric: Metric,
    pub valuation: Valuation,
}

impl AmountSelector {
    pub fn live(metric: Metric) -> Self {
        Self {
            metric,
            valuation: Valuation::Live,
        }
    }

    pub fn snapshot(metric: Metric) -> Self {
        Self {
            metric,
            valuation: Valuation::Snapshot,
        }
    }
}

/// Read-only view over the data needed to value records in the base currency.
pub struct AggregationContext<'a> {
    ledger: &'a CurrencyLedger,
    snapshots: &'a SnapshotCache,
    base: &'a Currency,
    scope: OwnerScope,
}

impl<'a> AggregationContext<'a> {
    pub fn new(
        ledger: &'a CurrencyLedger,
        snapshots: &'a SnapshotCache,
    ) -> Result<Self, LedgerError> {
        let base = ledger.base().ok_or_else(|| {
            LedgerError::ConfigurationIncomplete("no base currency is defined".into())
        })?;
        Ok(Self {
            ledger,
            snapshots,
            base,
            scope: OwnerScope::All,
        })
    }

    pub fn with_scope(mut self, scope: OwnerScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn base(&self) -> &Currency {
        self.base
    }

    /// Selected amount of `record` in the base currency, `None` when the record does
    /// not carry the metric.
    pub fn value<R>(&self, record: &R, selector: AmountSelector) -> Option<f64>
    where
        R: FinancialRecord + ?Sized,
    {
        let raw = record.amount(selector.metric)?;
        match selector.valuation {
            Valuation::Live => Some(self.ledger.convert(raw, record.currency_id(), self.base.id)),
            Valuation::Snapshot => {
                match self
                    .snapshots
                    .get(record.id(), selector.metric, &self.base.code)
                {
                    Some(value) => Some(value),
                    None => {
                        warn!(
                            record = %record.id(),
                            base = %self.base.code,
                            "no snapshot for base currency, converting live"
                        );
                        Some(self.ledger.convert(raw, record.currency_id(), self.base.id))
                    }
                }
            }
        }
    }
}

/// Sum of the selected amount over records tagged `month`, in the base currency.
pub fn monthly_total<R>(
    records: &[R],
    month: MonthTag,
    selector: AmountSelector,
    ctx: &AggregationContext<'_>,
) -> f64
where
    R: FinancialRecord,
{
    let total: f64 = records
        .iter()
        .filter(|record| record.month() == month && ctx.scope.admits(record.owner()))
        .filter_map(|record| ctx.value(record, selector))
        .sum();
    debug!(%month, metric = %selector.metric, total, "monthly total");
    round2(total)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSeries {
    pub year: i32,
    pub months: Vec<MonthTag>,
    pub totals: Vec<f64>,
}

impl YearSeries {
    pub fn total(&self) -> f64 {
        round2(self.totals.iter().sum())
    }

    pub fn points(&self) -> impl Iterator<Item = (MonthTag, f64)> + '_ {
        self.months.iter().copied().zip(self.totals.iter().copied())
    }
}

/// Twelve monthly totals, January through December of `year`.
pub fn year_series<R>(
    records: &[R],
    year: i32,
    selector: AmountSelector,
    ctx: &AggregationContext<'_>,
) -> YearSeries
where
    R: FinancialRecord,
{
    let months = MonthTag::months_of_year(year);
    let totals = months
        .iter()
        .map(|month| monthly_total(records, *month, selector, ctx))
        .collect();
    YearSeries {
        year,
        months,
        totals,
    }
}
