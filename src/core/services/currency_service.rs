use uuid::Uuid;

use crate::book::Book;
use crate::currency::{Currency, CurrencyUpdate};

use super::{ServiceError, ServiceResult};

pub struct CurrencyService;

impl CurrencyService {
    pub fn add(book: &mut Book, currency: Currency) -> ServiceResult<Uuid> {
        let id = book.currencies.insert(currency)?;
        book.touch();
        Ok(id)
    }

    pub fn edit(book: &mut Book, id: Uuid, changes: CurrencyUpdate) -> ServiceResult<()> {
        if book.currencies.get(id).is_none() {
            return Err(ServiceError::NotFound(format!("Currency {}", id)));
        }
        book.currencies.update(id, changes)?;
        book.touch();
        Ok(())
    }

    /// Deletes a currency that is neither the base nor referenced by any record.
    pub fn remove(book: &mut Book, id: Uuid) -> ServiceResult<Currency> {
        let code = Self::get(book, id)?.code.clone();
        if book.currency_in_use(id) {
            return Err(ServiceError::Invalid(format!(
                "Currency `{}` is used by existing records",
                code
            )));
        }
        let removed = book.currencies.remove(id)?;
        book.touch();
        Ok(removed)
    }

    pub fn set_base(book: &mut Book, id: Uuid) -> ServiceResult<()> {
        Self::get(book, id)?;
        book.currencies.set_base(id)?;
        book.touch();
        Ok(())
    }

    pub fn get(book: &Book, id: Uuid) -> ServiceResult<&Currency> {
        book.currencies
            .get(id)
            .ok_or_else(|| ServiceError::NotFound(format!("Currency {}", id)))
    }

    pub fn find<'a>(book: &'a Book, code: &str) -> ServiceResult<&'a Currency> {
        book.currencies
            .by_code(code)
            .ok_or_else(|| ServiceError::NotFound(format!("Currency `{}`", code.trim())))
    }

    pub fn list(book: &Book) -> Vec<&Currency> {
        book.currencies.list().iter().collect()
    }

    /// Strict conversion by code: unlike the ledger, unknown codes are an error here.
    pub fn convert(book: &Book, amount: f64, from: &str, to: &str) -> ServiceResult<f64> {
        if !amount.is_finite() {
            return Err(ServiceError::Invalid("Amount must be a finite number".into()));
        }
        let source = Self::find(book, from)?.id;
        let target = Self::find(book, to)?.id;
        Ok(book.currencies.convert(amount, source, target))
    }

    pub fn format(book: &Book, amount: f64, code: &str) -> String {
        book.currencies.format_display_code(amount, code)
    }
}
