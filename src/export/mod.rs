//! Tabular month exports handed to spreadsheet or PDF writers.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::aggregation::{AggregationContext, AmountSelector, Valuation};
use crate::book::Book;
use crate::currency::CurrencyLedger;
use crate::errors::LedgerError;
use crate::records::{FinancialRecord, MonthTag, OwnerScope, RecordKind};

/// One scalar value of an exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn optional(value: Option<&String>) -> Self {
        Cell::Text(value.cloned().unwrap_or_default())
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Integer(value) => value.to_string(),
            Cell::Number(value) => format!("{:.2}", value),
            Cell::Date(value) => value.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub month: MonthTag,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column-aligned plain text rendering.
    pub fn render_text(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::render).collect())
            .collect();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &rendered {
            for (idx, value) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(idx) {
                    *width = (*width).max(value.chars().count());
                }
            }
        }
        let line = |values: &[String]| {
            values
                .iter()
                .zip(&widths)
                .map(|(value, width)| format!("{:<width$}", value, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };
        let mut out = vec![format!("{} ({})", self.title, self.month), line(&self.headers)];
        out.extend(rendered.iter().map(|row| line(row)));
        out.join("\n")
    }
}

/// Builds the table of `section` for `month`, with an extra column holding the
/// headline amount in the base currency, valued the same way as the reports.
pub fn build_table(
    book: &Book,
    section: RecordKind,
    month: MonthTag,
    scope: OwnerScope,
    valuation: Valuation,
) -> Result<ExportTable, LedgerError> {
    let ctx = AggregationContext::new(&book.currencies, &book.snapshots)?.with_scope(scope);
    let base_header = format!("Amount ({})", ctx.base().code);
    let writer = RowWriter {
        ledger: &book.currencies,
        ctx,
        selector: AmountSelector {
            metric: section.headline_metric(),
            valuation,
        },
    };

    let (headers, rows): (Vec<&str>, Vec<Vec<Cell>>) = match section {
        RecordKind::Expense => (
            vec!["ID", "Name", "Amount", "Currency", "Date", "Notes", "Month-Year"],
            visible(&book.expenses, month, scope)
                .map(|e| {
                    writer.row(
                        e,
                        vec![
                            Cell::text(e.name.clone()),
                            Cell::Number(e.amount),
                            writer.code(e.currency_id),
                            Cell::Date(e.date),
                            Cell::optional(e.notes.as_ref()),
                            Cell::text(e.month.to_string()),
                        ],
                    )
                })
                .collect(),
        ),
        RecordKind::Salary => (
            vec!["ID", "Name", "Job Title", "Salary", "Currency", "Payment Date"],
            visible(&book.salaries, month, scope)
                .map(|s| {
                    writer.row(
                        s,
                        vec![
                            Cell::text(s.employee_name.clone()),
                            Cell::text(s.job_title.clone()),
                            Cell::Number(s.amount),
                            writer.code(s.currency_id),
                            Cell::Date(s.payment_date),
                        ],
                    )
                })
                .collect(),
        ),
        RecordKind::Ticket => (
            vec![
                "ID", "Ticket No.", "PNR", "From", "To", "Passengers", "Purchase", "Selling",
                "Profit", "Currency", "Month-Year",
            ],
            visible(&book.tickets, month, scope)
                .map(|t| {
                    writer.row(
                        t,
                        vec![
                            Cell::text(t.ticket_number.clone()),
                            Cell::text(t.pnr.clone()),
                            Cell::text(t.departure.clone()),
                            Cell::text(t.arrival.clone()),
                            Cell::Integer(i64::from(t.passengers)),
                            Cell::Number(t.pricing.purchase),
                            Cell::Number(t.pricing.selling),
                            Cell::Number(t.pricing.profit),
                            writer.code(t.currency_id),
                            Cell::text(t.month.to_string()),
                        ],
                    )
                })
                .collect(),
        ),
        RecordKind::Hotel => (
            vec![
                "ID", "Booking No.", "Hotel", "Guest", "Check-in", "Check-out", "Nights",
                "Purchase", "Selling", "Profit", "Currency", "Month-Year",
            ],
            visible(&book.hotels, month, scope)
                .map(|h| {
                    writer.row(
                        h,
                        vec![
                            Cell::text(h.booking_number.clone()),
                            Cell::text(h.hotel_name.clone()),
                            Cell::text(h.guest_name.clone()),
                            Cell::Date(h.check_in),
                            Cell::Date(h.check_out),
                            Cell::Integer(h.nights()),
                            Cell::Number(h.pricing.purchase),
                            Cell::Number(h.pricing.selling),
                            Cell::Number(h.pricing.profit),
                            writer.code(h.currency_id),
                            Cell::text(h.month.to_string()),
                        ],
                    )
                })
                .collect(),
        ),
        RecordKind::Visa => (
            vec![
                "ID", "Visa Type", "Country", "Applicant", "Duration", "Purchase", "Selling",
                "Profit", "Currency", "Month-Year",
            ],
            visible(&book.visas, month, scope)
                .map(|v| {
                    writer.row(
                        v,
                        vec![
                            Cell::text(v.visa_type.clone()),
                            Cell::text(v.country.clone()),
                            Cell::text(v.applicant_name.clone()),
                            Cell::text(v.duration.clone()),
                            Cell::Number(v.pricing.purchase),
                            Cell::Number(v.pricing.selling),
                            Cell::Number(v.pricing.profit),
                            writer.code(v.currency_id),
                            Cell::text(v.month.to_string()),
                        ],
                    )
                })
                .collect(),
        ),
    };

    let mut headers: Vec<String> = headers.into_iter().map(String::from).collect();
    headers.push(base_header);
    Ok(ExportTable {
        title: title_case(section.label()),
        month,
        headers,
        rows,
    })
}

struct RowWriter<'a> {
    ledger: &'a CurrencyLedger,
    ctx: AggregationContext<'a>,
    selector: AmountSelector,
}

impl RowWriter<'_> {
    fn code(&self, currency_id: Uuid) -> Cell {
        Cell::text(
            self.ledger
                .get(currency_id)
                .map(|currency| currency.code.to_string())
                .unwrap_or_default(),
        )
    }

    /// Prepends the record id and appends the headline amount in base.
    fn row<R: FinancialRecord>(&self, record: &R, cells: Vec<Cell>) -> Vec<Cell> {
        let mut row = Vec::with_capacity(cells.len() + 2);
        row.push(Cell::text(record.id().to_string()));
        row.extend(cells);
        row.push(match self.ctx.value(record, self.selector) {
            Some(value) => Cell::Number(value),
            None => Cell::text(""),
        });
        row
    }
}

fn visible<'a, R: FinancialRecord>(
    records: &'a [R],
    month: MonthTag,
    scope: OwnerScope,
) -> impl Iterator<Item = &'a R> + 'a {
    records
        .iter()
        .filter(move |record| record.month() == month && scope.admits(record.owner()))
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
