use tracing::{info, warn};
use uuid::Uuid;

use crate::book::Book;
use crate::currency::CurrencyCode;
use crate::records::{
    AmountSnapshot, Expense, FinancialRecord, HotelBooking, Pricing, RecordKind, Salary,
    TicketSale, VisaSale,
};

use super::{ServiceError, ServiceResult};

/// Writes records into a book. Every write captures the conversion snapshot for
/// `targets`, the configured well-known currencies.
pub struct RecordService;

impl RecordService {
    pub fn add_expense(
        book: &mut Book,
        expense: Expense,
        targets: &[CurrencyCode],
    ) -> ServiceResult<Uuid> {
        Self::validate_amount(expense.amount)?;
        Self::require_name(&expense.name, "Expense name")?;
        Self::capture(book, &expense, targets)?;
        let id = expense.id;
        book.expenses.push(expense);
        Self::committed(book, RecordKind::Expense, id);
        Ok(id)
    }

    pub fn add_salary(
        book: &mut Book,
        salary: Salary,
        targets: &[CurrencyCode],
    ) -> ServiceResult<Uuid> {
        Self::validate_amount(salary.amount)?;
        Self::require_name(&salary.employee_name, "Employee name")?;
        Self::capture(book, &salary, targets)?;
        let id = salary.id;
        book.salaries.push(salary);
        Self::committed(book, RecordKind::Salary, id);
        Ok(id)
    }

    pub fn add_ticket(
        book: &mut Book,
        ticket: TicketSale,
        targets: &[CurrencyCode],
    ) -> ServiceResult<Uuid> {
        Self::validate_pricing(&ticket.pricing)?;
        Self::require_name(&ticket.ticket_number, "Ticket number")?;
        if ticket.passengers == 0 {
            return Err(ServiceError::Invalid(
                "A ticket needs at least one passenger".into(),
            ));
        }
        Self::capture(book, &ticket, targets)?;
        let id = ticket.id;
        book.tickets.push(ticket);
        Self::committed(book, RecordKind::Ticket, id);
        Ok(id)
    }

    pub fn add_hotel(
        book: &mut Book,
        booking: HotelBooking,
        targets: &[CurrencyCode],
    ) -> ServiceResult<Uuid> {
        Self::validate_pricing(&booking.pricing)?;
        Self::require_name(&booking.hotel_name, "Hotel name")?;
        if booking.check_out < booking.check_in {
            return Err(ServiceError::Invalid(
                "Check-out cannot be before check-in".into(),
            ));
        }
        Self::capture(book, &booking, targets)?;
        let id = booking.id;
        book.hotels.push(booking);
        Self::committed(book, RecordKind::Hotel, id);
        Ok(id)
    }

    pub fn add_visa(
        book: &mut Book,
        visa: VisaSale,
        targets: &[CurrencyCode],
    ) -> ServiceResult<Uuid> {
        Self::validate_pricing(&visa.pricing)?;
        Self::require_name(&visa.visa_type, "Visa type")?;
        Self::capture(book, &visa, targets)?;
        let id = visa.id;
        book.visas.push(visa);
        Self::committed(book, RecordKind::Visa, id);
        Ok(id)
    }

    /// Repeats a salary on the first day of the following month. The snapshot of the
    /// original payment is carried over as-is; a payment recorded without one gets a
    /// fresh capture for `targets`.
    pub fn pay_again(
        book: &mut Book,
        salary_id: Uuid,
        targets: &[CurrencyCode],
    ) -> ServiceResult<Uuid> {
        let next = book
            .salary(salary_id)
            .map(Salary::next_payment)
            .ok_or_else(|| ServiceError::NotFound(format!("Salary {}", salary_id)))?;
        let id = next.id;
        if !book.snapshots.copy_forward(salary_id, id) {
            warn!(salary = %salary_id, "original salary has no snapshot, capturing a new one");
            Self::capture(book, &next, targets)?;
        }
        info!(
            from = %salary_id,
            to = %id,
            payment_date = %next.payment_date,
            "salary paid again"
        );
        book.salaries.push(next);
        book.touch();
        Ok(id)
    }

    pub fn remove(book: &mut Book, kind: RecordKind, id: Uuid) -> ServiceResult<()> {
        if book.remove_record(kind, id) {
            info!(%kind, %id, "record removed");
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("{} record {}", kind, id)))
        }
    }

    fn capture<R>(book: &mut Book, record: &R, targets: &[CurrencyCode]) -> ServiceResult<()>
    where
        R: FinancialRecord,
    {
        let snapshot = AmountSnapshot::capture(record, &book.currencies, targets)
            .ok_or_else(|| ServiceError::Invalid("Selected currency does not exist".into()))?;
        book.snapshots.insert(record.id(), snapshot);
        Ok(())
    }

    fn committed(book: &mut Book, kind: RecordKind, id: Uuid) {
        book.touch();
        info!(%kind, %id, "record added");
    }

    fn validate_amount(amount: f64) -> ServiceResult<()> {
        if amount.is_finite() && amount >= 0.0 {
            Ok(())
        } else {
            Err(ServiceError::Invalid(format!(
                "Amount must be a non-negative number, got {}",
                amount
            )))
        }
    }

    fn validate_pricing(pricing: &Pricing) -> ServiceResult<()> {
        if pricing.values().iter().all(|value| value.is_finite())
            && pricing.purchase >= 0.0
            && pricing.selling >= 0.0
            && pricing.fees >= 0.0
        {
            Ok(())
        } else {
            Err(ServiceError::Invalid(
                "Purchase, selling and fees must be non-negative numbers".into(),
            ))
        }
    }

    fn require_name(value: &str, field: &str) -> ServiceResult<()> {
        if value.trim().is_empty() {
            Err(ServiceError::Invalid(format!("{} is required", field)))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyUpdate;
    use crate::records::{Metric, MonthTag};
    use chrono::NaiveDate;

    fn well_known() -> Vec<CurrencyCode> {
        ["EGP", "USD", "EUR", "SAR"]
            .into_iter()
            .map(CurrencyCode::new)
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expense_write_captures_snapshot() {
        let mut book = Book::seeded("Agency");
        let usd = book.currencies.by_code("USD").unwrap().id;
        let id = RecordService::add_expense(
            &mut book,
            Expense::new("Printer", 10.0, usd, date(2025, 6, 2), MonthTag::new(2025, 6).unwrap()),
            &well_known(),
        )
        .unwrap();
        assert_eq!(book.expenses.len(), 1);
        assert_eq!(
            book.snapshots.get(id, Metric::Amount, &CurrencyCode::new("EGP")),
            Some(480.0)
        );
        assert_eq!(
            book.snapshots.get(id, Metric::Amount, &CurrencyCode::new("USD")),
            Some(10.0)
        );
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let mut book = Book::seeded("Agency");
        let result = RecordService::add_expense(
            &mut book,
            Expense::new("Ghost", 1.0, Uuid::new_v4(), date(2025, 6, 2), MonthTag::new(2025, 6).unwrap()),
            &well_known(),
        );
        assert!(matches!(result, Err(ServiceError::Invalid(_))));
        assert!(book.expenses.is_empty());
        assert!(book.snapshots.is_empty());
    }

    #[test]
    fn negative_amounts_and_bad_stays_are_rejected() {
        let mut book = Book::seeded("Agency");
        let egp = book.currencies.by_code("EGP").unwrap().id;
        assert!(RecordService::add_expense(
            &mut book,
            Expense::new("Refund", -5.0, egp, date(2025, 6, 2), MonthTag::new(2025, 6).unwrap()),
            &well_known(),
        )
        .is_err());
        let booking = HotelBooking::new(
            "HB-1",
            "Nile View",
            "Guest",
            date(2025, 6, 10),
            date(2025, 6, 8),
            Pricing::new(100.0, 150.0, None),
            egp,
        );
        assert!(RecordService::add_hotel(&mut book, booking, &well_known()).is_err());
    }

    #[test]
    fn pay_again_copies_snapshot_unchanged() {
        let mut book = Book::seeded("Agency");
        let usd = book.currencies.by_code("USD").unwrap().id;
        let original = RecordService::add_salary(
            &mut book,
            Salary::new("Mona", "Agent", 100.0, usd, date(2025, 12, 1)),
            &well_known(),
        )
        .unwrap();
        book.currencies
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
        let repeated = RecordService::pay_again(&mut book, original, &well_known()).unwrap();
        let salary = book.salary(repeated).unwrap();
        assert_eq!(salary.payment_date, date(2026, 1, 1));
        assert_eq!(salary.amount, 100.0);
        assert_eq!(salary.currency_id, usd);
        assert_eq!(
            book.snapshots.get(repeated, Metric::Amount, &CurrencyCode::new("EGP")),
            Some(4800.0)
        );
    }

    #[test]
    fn pay_again_unknown_salary_is_not_found() {
        let mut book = Book::seeded("Agency");
        assert!(matches!(
            RecordService::pay_again(&mut book, Uuid::new_v4(), &well_known()),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn remove_reports_missing_records() {
        let mut book = Book::seeded("Agency");
        let egp = book.currencies.by_code("EGP").unwrap().id;
        let visa = VisaSale::new(
            "Tourist",
            "France",
            "Omar",
            Pricing::new(3000.0, 3500.0, Some(50.0)),
            egp,
            MonthTag::new(2025, 6).unwrap(),
        );
        let id = RecordService::add_visa(&mut book, visa, &well_known()).unwrap();
        RecordService::remove(&mut book, RecordKind::Visa, id).unwrap();
        assert!(matches!(
            RecordService::remove(&mut book, RecordKind::Visa, id),
            Err(ServiceError::NotFound(_))
        ));
    }
}
