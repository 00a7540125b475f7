//! Currency table and pivot-based conversion.
//!
//! Every exchange rate is expressed as "units of the pivot currency per one unit of
//! this currency". Converting `amount` from `A` to `B` is therefore
//! `amount * rate(A) / rate(B)`, rounded to two decimals. The pivot itself always
//! counts as rate `1.0`, whatever value is stored on its row.

mod format;

pub use format::{format_amount, format_number};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::LedgerError;

/// ISO 4217 style three letter code, always stored upper-case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 3 && self.0.chars().all(|c| c.is_ascii_uppercase())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Currency {
    pub id: Uuid,
    pub code: CurrencyCode,
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    pub exchange_rate: f64,
    #[serde(default)]
    pub is_base: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        exchange_rate: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: CurrencyCode::new(code),
            name: name.into(),
            symbol: symbol.into(),
            exchange_rate,
            is_base: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn as_base(mut self) -> Self {
        self.is_base = true;
        self
    }
}

/// Editable subset of a currency row.
#[derive(Debug, Clone)]
pub struct CurrencyUpdate {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub exchange_rate: f64,
}

/// Single source of truth for currency metadata and the conversion function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyLedger {
    #[serde(default)]
    currencies: Vec<Currency>,
    /// Currency the rates are quoted in. Fixed when the table is created and kept
    /// when the base flag moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pivot: Option<CurrencyCode>,
}

impl CurrencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Travel-agency defaults: Egyptian pound as base with USD, SAR and EUR quoted in EGP.
    pub fn seeded() -> Self {
        Self {
            currencies: vec![
                Currency::new("EGP", "Egyptian Pound", "ج.م", 1.0).as_base(),
                Currency::new("USD", "US Dollar", "$", 48.0),
                Currency::new("SAR", "Saudi Riyal", "﷼", 12.8),
                Currency::new("EUR", "Euro", "€", 52.0),
            ],
            pivot: Some(CurrencyCode::new("EGP")),
        }
    }

    pub fn with_pivot(mut self, pivot: Option<CurrencyCode>) -> Self {
        self.set_pivot(pivot);
        self
    }

    /// Replaces the pivot code. `None` leaves the stored pivot in place.
    pub fn set_pivot(&mut self, pivot: Option<CurrencyCode>) {
        if let Some(code) = pivot {
            if self.pivot.as_ref() != Some(&code) {
                info!(pivot = %code, "conversion pivot set");
            }
            self.pivot = Some(code);
        }
    }

    pub fn pivot_code(&self) -> Option<&CurrencyCode> {
        self.pivot.as_ref()
    }

    pub fn list(&self) -> &[Currency] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Currency> {
        self.currencies.iter().find(|currency| currency.id == id)
    }

    pub fn by_code(&self, code: &str) -> Option<&Currency> {
        self.currencies
            .iter()
            .find(|currency| currency.code.as_str().eq_ignore_ascii_case(code.trim()))
    }

    pub fn base(&self) -> Option<&Currency> {
        self.currencies.iter().find(|currency| currency.is_base)
    }

    /// Row the rates are quoted against. Tables saved without a pivot code fall back
    /// to the base-flagged row.
    pub fn pivot(&self) -> Option<&Currency> {
        match &self.pivot {
            Some(code) => self.by_code(code.as_str()),
            None => self.base(),
        }
    }

    /// Adds a currency after validating its code and rate. A row flagged as base
    /// takes the flag away from every other row, and the first one also becomes the
    /// pivot.
    pub fn insert(&mut self, currency: Currency) -> Result<Uuid, LedgerError> {
        validate_code(&currency.code)?;
        validate_rate(currency.exchange_rate)?;
        if self.by_code(currency.code.as_str()).is_some() {
            return Err(LedgerError::Validation(format!(
                "currency `{}` already exists",
                currency.code
            )));
        }
        let id = currency.id;
        let becomes_base = currency.is_base;
        info!(code = %currency.code, rate = currency.exchange_rate, "currency added");
        self.currencies.push(currency);
        if becomes_base {
            self.set_base(id)?;
        }
        Ok(id)
    }

    pub fn update(&mut self, id: Uuid, changes: CurrencyUpdate) -> Result<(), LedgerError> {
        let code = CurrencyCode::new(changes.code);
        validate_code(&code)?;
        validate_rate(changes.exchange_rate)?;
        if self
            .currencies
            .iter()
            .any(|currency| currency.code == code && currency.id != id)
        {
            return Err(LedgerError::Validation(format!(
                "currency `{}` already exists",
                code
            )));
        }
        let currency = self
            .currencies
            .iter_mut()
            .find(|currency| currency.id == id)
            .ok_or_else(|| LedgerError::InvalidRef(format!("currency {} not found", id)))?;
        if self.pivot.as_ref() == Some(&currency.code) {
            self.pivot = Some(code.clone());
        }
        currency.code = code;
        currency.name = changes.name;
        currency.symbol = changes.symbol;
        currency.exchange_rate = changes.exchange_rate;
        currency.updated_at = Utc::now();
        info!(code = %currency.code, rate = currency.exchange_rate, "currency updated");
        Ok(())
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Currency, LedgerError> {
        let index = self
            .currencies
            .iter()
            .position(|currency| currency.id == id)
            .ok_or_else(|| LedgerError::InvalidRef(format!("currency {} not found", id)))?;
        if self.currencies[index].is_base {
            return Err(LedgerError::Validation(
                "cannot delete the base currency".into(),
            ));
        }
        if self.pivot.as_ref() == Some(&self.currencies[index].code) {
            return Err(LedgerError::Validation(format!(
                "cannot delete `{}`, exchange rates are quoted in it",
                self.currencies[index].code
            )));
        }
        let removed = self.currencies.remove(index);
        info!(code = %removed.code, "currency removed");
        Ok(removed)
    }

    /// Moves the base flag to `id` in one step: every row is rewritten so exactly one
    /// stays flagged. Rates are not rescaled, so the pivot stays where it is.
    pub fn set_base(&mut self, id: Uuid) -> Result<(), LedgerError> {
        if self.get(id).is_none() {
            return Err(LedgerError::InvalidRef(format!("currency {} not found", id)));
        }
        if self.pivot.is_none() {
            self.pivot = self
                .base()
                .or_else(|| self.get(id))
                .map(|currency| currency.code.clone());
        }
        let now = Utc::now();
        for currency in &mut self.currencies {
            let flag = currency.id == id;
            if currency.is_base != flag {
                currency.is_base = flag;
                currency.updated_at = now;
            }
        }
        info!(%id, "base currency changed");
        Ok(())
    }

    /// Rate for `code`, or `1.0` when the code is unknown.
    pub fn exchange_rate(&self, code: &str) -> f64 {
        match self.by_code(code) {
            Some(currency) => currency.exchange_rate,
            None => {
                warn!(code, "exchange rate requested for unknown currency");
                1.0
            }
        }
    }

    pub fn convert(&self, amount: f64, from: Uuid, to: Uuid) -> f64 {
        if from == to {
            return amount;
        }
        let (Some(source), Some(target)) = (self.get(from), self.get(to)) else {
            warn!(%from, %to, "conversion with unknown currency, amount left unchanged");
            return amount;
        };
        self.convert_between(amount, source, target)
    }

    pub fn convert_codes(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from.trim().eq_ignore_ascii_case(to.trim()) {
            return amount;
        }
        let (Some(source), Some(target)) = (self.by_code(from), self.by_code(to)) else {
            warn!(from, to, "conversion with unknown currency, amount left unchanged");
            return amount;
        };
        self.convert_between(amount, source, target)
    }

    /// Converts into the base-flagged currency.
    pub fn amount_in_base(&self, amount: f64, currency_id: Uuid) -> f64 {
        match self.base() {
            Some(base) => self.convert(amount, currency_id, base.id),
            None => {
                warn!("no base currency defined, amount left unchanged");
                amount
            }
        }
    }

    fn convert_between(&self, amount: f64, source: &Currency, target: &Currency) -> f64 {
        if source.id == target.id {
            return amount;
        }
        let Some(pivot) = self.pivot() else {
            warn!("pivot currency missing, amount left unchanged");
            return amount;
        };
        let in_pivot = amount * pivot_rate(source, pivot);
        let converted = in_pivot / pivot_rate(target, pivot);
        debug!(
            from = %source.code,
            to = %target.code,
            amount,
            converted,
            "converted amount"
        );
        round2(converted)
    }

    /// `"{symbol} {amount}"` when a symbol is set, `"{amount} {code}"` otherwise.
    pub fn format_display(&self, amount: f64, currency_id: Uuid) -> String {
        match self.get(currency_id) {
            Some(currency) => render_display(amount, currency),
            None => {
                warn!(%currency_id, "formatting with unknown currency");
                format_amount(amount)
            }
        }
    }

    pub fn format_display_code(&self, amount: f64, code: &str) -> String {
        match self.by_code(code) {
            Some(currency) => render_display(amount, currency),
            None => format_amount(amount),
        }
    }

    /// Startup check that the pivot and every well-known currency are present.
    pub fn check_configuration(&self, well_known: &[CurrencyCode]) -> Result<(), LedgerError> {
        if self.pivot().is_none() {
            let wanted = self
                .pivot
                .as_ref()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "base".into());
            return Err(LedgerError::ConfigurationIncomplete(format!(
                "pivot currency `{}` is not defined",
                wanted
            )));
        }
        let missing: Vec<&str> = well_known
            .iter()
            .filter(|code| self.by_code(code.as_str()).is_none())
            .map(|code| code.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::ConfigurationIncomplete(format!(
                "missing well-known currencies: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

fn pivot_rate(currency: &Currency, pivot: &Currency) -> f64 {
    if currency.id == pivot.id {
        1.0
    } else {
        currency.exchange_rate
    }
}

fn render_display(amount: f64, currency: &Currency) -> String {
    if currency.symbol.trim().is_empty() {
        format!("{} {}", format_amount(amount), currency.code)
    } else {
        format!("{} {}", currency.symbol, format_amount(amount))
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn validate_rate(rate: f64) -> Result<(), LedgerError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "exchange rate must be a positive number, got {}",
            rate
        )))
    }
}

fn validate_code(code: &CurrencyCode) -> Result<(), LedgerError> {
    if code.is_well_formed() {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "currency code `{}` must be three letters",
            code
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn egp_usd_eur() -> (CurrencyLedger, Uuid, Uuid, Uuid) {
        let mut ledger = CurrencyLedger::new();
        let egp = ledger
            .insert(Currency::new("EGP", "Egyptian Pound", "", 1.0).as_base())
            .unwrap();
        let usd = ledger
            .insert(Currency::new("USD", "US Dollar", "$", 48.0))
            .unwrap();
        let eur = ledger
            .insert(Currency::new("EUR", "Euro", "€", 52.0))
            .unwrap();
        (ledger, egp, usd, eur)
    }

    #[test]
    fn identity_conversion_is_untouched() {
        let (ledger, _, usd, _) = egp_usd_eur();
        assert_eq!(ledger.convert(12.345, usd, usd), 12.345);
    }

    #[test]
    fn converts_through_pivot_with_pinned_convention() {
        let (ledger, egp, usd, eur) = egp_usd_eur();
        assert_eq!(ledger.convert(100.0, egp, usd), 2.08);
        assert_eq!(ledger.convert(50.0, usd, egp), 2400.0);
        assert_eq!(ledger.convert(48.0, usd, eur), 44.31);
    }

    #[test]
    fn unknown_currency_returns_input() {
        let (ledger, egp, _, _) = egp_usd_eur();
        assert_eq!(ledger.convert(10.0, egp, Uuid::new_v4()), 10.0);
        assert_eq!(ledger.convert_codes(10.0, "EGP", "JPY"), 10.0);
    }

    #[test]
    fn missing_pivot_returns_input() {
        let (ledger, egp, usd, _) = egp_usd_eur();
        let ledger = ledger.with_pivot(Some(CurrencyCode::new("GBP")));
        assert_eq!(ledger.convert(100.0, egp, usd), 100.0);
    }

    #[test]
    fn rejects_non_positive_rates() {
        let mut ledger = CurrencyLedger::new();
        let err = ledger
            .insert(Currency::new("XYZ", "Broken", "", 0.0))
            .expect_err("zero rate must fail");
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger
            .insert(Currency::new("XYZ", "Broken", "", -3.0))
            .is_err());
        assert!(ledger
            .insert(Currency::new("XYZ", "Broken", "", f64::NAN))
            .is_err());
    }

    #[test]
    fn set_base_keeps_a_single_flag() {
        let (mut ledger, egp, usd, _) = egp_usd_eur();
        ledger.set_base(usd).unwrap();
        let flagged: Vec<_> = ledger.list().iter().filter(|c| c.is_base).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, usd);
        assert!(!ledger.get(egp).unwrap().is_base);
    }

    #[test]
    fn moving_the_base_keeps_rates_quoted_in_the_pivot() {
        let (mut ledger, egp, usd, _) = egp_usd_eur();
        ledger.set_base(usd).unwrap();
        assert_eq!(ledger.pivot().unwrap().id, egp);
        assert_eq!(ledger.convert(100.0, egp, usd), 2.08);
        assert_eq!(ledger.amount_in_base(4800.0, egp), 100.0);
    }

    #[test]
    fn pivot_follows_a_code_rename_and_cannot_be_removed() {
        let (mut ledger, egp, usd, _) = egp_usd_eur();
        ledger.set_base(usd).unwrap();
        let err = ledger.remove(egp).expect_err("pivot is in use");
        assert!(err.to_string().contains("quoted"));
        ledger
            .update(
                egp,
                CurrencyUpdate {
                    code: "EGX".into(),
                    name: "Pound".into(),
                    symbol: String::new(),
                    exchange_rate: 1.0,
                },
            )
            .unwrap();
        assert_eq!(ledger.pivot_code().unwrap().as_str(), "EGX");
        assert_eq!(ledger.convert_codes(50.0, "USD", "EGX"), 2400.0);
    }

    #[test]
    fn tables_saved_without_a_pivot_pin_it_before_the_base_moves() {
        let (ledger, egp, usd, _) = egp_usd_eur();
        let mut json = serde_json::to_value(&ledger).unwrap();
        json.as_object_mut().unwrap().remove("pivot");
        let mut legacy: CurrencyLedger = serde_json::from_value(json).unwrap();
        assert!(legacy.pivot_code().is_none());
        assert_eq!(legacy.pivot().unwrap().id, egp);
        legacy.set_base(usd).unwrap();
        assert_eq!(legacy.pivot_code().unwrap().as_str(), "EGP");
        assert_eq!(legacy.convert(100.0, egp, usd), 2.08);
    }

    #[test]
    fn base_currency_cannot_be_removed() {
        let (mut ledger, egp, usd, _) = egp_usd_eur();
        assert!(ledger.remove(egp).is_err());
        assert_eq!(ledger.remove(usd).unwrap().code.as_str(), "USD");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn unknown_rate_defaults_to_one() {
        let (ledger, _, _, _) = egp_usd_eur();
        assert_eq!(ledger.exchange_rate("usd"), 48.0);
        assert_eq!(ledger.exchange_rate("JPY"), 1.0);
    }

    #[test]
    fn configuration_check_reports_missing_codes() {
        let (ledger, _, _, _) = egp_usd_eur();
        let err = ledger
            .check_configuration(&[CurrencyCode::new("USD"), CurrencyCode::new("SAR")])
            .expect_err("SAR is missing");
        assert!(err.to_string().contains("SAR"));
    }
}
