use serde::Serialize;

use crate::aggregation::{
    monthly_total, year_series, AggregationContext, AmountSelector, Valuation, YearSeries,
};
use crate::book::Book;
use crate::currency::{round2, CurrencyCode};
use crate::records::{MonthTag, OwnerScope, RecordKind};

use super::ServiceResult;

/// Month figures shown on the agency dashboard, all in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub month: MonthTag,
    pub base_currency: CurrencyCode,
    pub total_expenses: f64,
    pub total_salaries: f64,
    pub ticket_profit: f64,
    pub hotel_profit: f64,
    pub visa_profit: f64,
    /// Sale profits minus expenses and salaries.
    pub net: f64,
    pub series: Vec<CategorySeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub kind: RecordKind,
    pub series: YearSeries,
}

impl DashboardSummary {
    pub fn total_profit(&self) -> f64 {
        round2(self.ticket_profit + self.hotel_profit + self.visa_profit)
    }

    pub fn series_for(&self, kind: RecordKind) -> Option<&YearSeries> {
        self.series
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| &entry.series)
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Headline total of one record kind for `month`: amounts for expenses and
    /// salaries, profit for sales.
    pub fn monthly_total(
        book: &Book,
        kind: RecordKind,
        month: MonthTag,
        scope: OwnerScope,
        valuation: Valuation,
    ) -> ServiceResult<f64> {
        let ctx = AggregationContext::new(&book.currencies, &book.snapshots)?.with_scope(scope);
        Ok(Self::category_total(book, kind, month, valuation, &ctx))
    }

    pub fn series(
        book: &Book,
        kind: RecordKind,
        year: i32,
        scope: OwnerScope,
        valuation: Valuation,
    ) -> ServiceResult<YearSeries> {
        let ctx = AggregationContext::new(&book.currencies, &book.snapshots)?.with_scope(scope);
        Ok(Self::category_series(book, kind, year, valuation, &ctx))
    }

    pub fn dashboard(
        book: &Book,
        month: MonthTag,
        year: i32,
        scope: OwnerScope,
        valuation: Valuation,
    ) -> ServiceResult<DashboardSummary> {
        let ctx = AggregationContext::new(&book.currencies, &book.snapshots)?.with_scope(scope);
        let total = |kind| Self::category_total(book, kind, month, valuation, &ctx);
        let total_expenses = total(RecordKind::Expense);
        let total_salaries = total(RecordKind::Salary);
        let ticket_profit = total(RecordKind::Ticket);
        let hotel_profit = total(RecordKind::Hotel);
        let visa_profit = total(RecordKind::Visa);
        let net = round2(ticket_profit + hotel_profit + visa_profit - total_expenses - total_salaries);
        let series = RecordKind::ALL
            .into_iter()
            .map(|kind| CategorySeries {
                kind,
                series: Self::category_series(book, kind, year, valuation, &ctx),
            })
            .collect();
        Ok(DashboardSummary {
            month,
            base_currency: ctx.base().code.clone(),
            total_expenses,
            total_salaries,
            ticket_profit,
            hotel_profit,
            visa_profit,
            net,
            series,
        })
    }

    fn category_total(
        book: &Book,
        kind: RecordKind,
        month: MonthTag,
        valuation: Valuation,
        ctx: &AggregationContext<'_>,
    ) -> f64 {
        let selector = AmountSelector {
            metric: kind.headline_metric(),
            valuation,
        };
        match kind {
            RecordKind::Expense => monthly_total(&book.expenses, month, selector, ctx),
            RecordKind::Salary => monthly_total(&book.salaries, month, selector, ctx),
            RecordKind::Ticket => monthly_total(&book.tickets, month, selector, ctx),
            RecordKind::Hotel => monthly_total(&book.hotels, month, selector, ctx),
            RecordKind::Visa => monthly_total(&book.visas, month, selector, ctx),
        }
    }

    fn category_series(
        book: &Book,
        kind: RecordKind,
        year: i32,
        valuation: Valuation,
        ctx: &AggregationContext<'_>,
    ) -> YearSeries {
        let selector = AmountSelector {
            metric: kind.headline_metric(),
            valuation,
        };
        match kind {
            RecordKind::Expense => year_series(&book.expenses, year, selector, ctx),
            RecordKind::Salary => year_series(&book.salaries, year, selector, ctx),
            RecordKind::Ticket => year_series(&book.tickets, year, selector, ctx),
            RecordKind::Hotel => year_series(&book.hotels, year, selector, ctx),
            RecordKind::Visa => year_series(&book.visas, year, selector, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::RecordService;
    use crate::records::{Expense, HotelBooking, Pricing, Salary, TicketSale};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn populated_book() -> Book {
        let mut book = Book::seeded("Agency");
        let targets: Vec<CurrencyCode> = ["EGP", "USD"].into_iter().map(CurrencyCode::new).collect();
        let egp = book.currencies.by_code("EGP").unwrap().id;
        let usd = book.currencies.by_code("USD").unwrap().id;
        let june = MonthTag::new(2025, 6).unwrap();
        RecordService::add_expense(
            &mut book,
            Expense::new("Rent", 1000.0, egp, date(2025, 6, 1), june),
            &targets,
        )
        .unwrap();
        RecordService::add_salary(
            &mut book,
            Salary::new("Mona", "Agent", 50.0, usd, date(2025, 6, 28)),
            &targets,
        )
        .unwrap();
        RecordService::add_ticket(
            &mut book,
            TicketSale::new(
                "T-1",
                "PNR1",
                "CAI",
                "JED",
                Pricing::new(100.0, 150.0, Some(10.0)),
                usd,
                june,
            ),
            &targets,
        )
        .unwrap();
        RecordService::add_hotel(
            &mut book,
            HotelBooking::new(
                "H-1",
                "Nile View",
                "Guest",
                date(2025, 7, 3),
                date(2025, 7, 6),
                Pricing::new(2000.0, 2600.0, None),
                egp,
            ),
            &targets,
        )
        .unwrap();
        book
    }

    #[test]
    fn dashboard_sums_each_category_in_base() {
        let book = populated_book();
        let summary = SummaryService::dashboard(
            &book,
            MonthTag::new(2025, 6).unwrap(),
            2025,
            OwnerScope::All,
            Valuation::Live,
        )
        .unwrap();
        assert_eq!(summary.base_currency.as_str(), "EGP");
        assert_eq!(summary.total_expenses, 1000.0);
        assert_eq!(summary.total_salaries, 2400.0);
        assert_eq!(summary.ticket_profit, 1920.0);
        assert_eq!(summary.hotel_profit, 0.0);
        assert_eq!(summary.net, -1480.0);
        assert_eq!(summary.series.len(), 5);
        let hotels = summary.series_for(RecordKind::Hotel).unwrap();
        assert_eq!(hotels.totals[6], 600.0);
    }

    #[test]
    fn snapshot_and_live_agree_before_rate_changes() {
        let book = populated_book();
        let june = MonthTag::new(2025, 6).unwrap();
        for kind in RecordKind::ALL {
            let live =
                SummaryService::monthly_total(&book, kind, june, OwnerScope::All, Valuation::Live)
                    .unwrap();
            let cached = SummaryService::monthly_total(
                &book,
                kind,
                june,
                OwnerScope::All,
                Valuation::Snapshot,
            )
            .unwrap();
            assert_eq!(live, cached, "{kind}");
        }
    }

    #[test]
    fn series_requires_a_base_currency() {
        let book = Book::new("Empty");
        assert!(SummaryService::series(
            &book,
            RecordKind::Expense,
            2025,
            OwnerScope::All,
            Valuation::Live
        )
        .is_err());
    }
}
