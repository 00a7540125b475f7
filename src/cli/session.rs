use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::aggregation::Valuation;
use crate::book::Book;
use crate::config::{Config, ConfigManager};
use crate::core::services::{
    CurrencyService, ExportService, RecordService, SummaryService,
};
use crate::currency::{format_amount, Currency, CurrencyCode, CurrencyUpdate};
use crate::errors::CliError;
use crate::records::{
    Expense, HotelBooking, MonthTag, OwnerScope, Pricing, RecordKind, Salary, TicketSale,
    VisaSale,
};
use crate::storage::{JsonStorage, StorageBackend};
use crate::utils::PathResolver;

use super::output;
use super::Command;

const FIELD_WIDTH: usize = 16;

/// Resolved data directory, configuration and book name for one invocation.
pub struct Session {
    storage: JsonStorage,
    config: Config,
    book_name: String,
    valuation: Valuation,
}

impl Session {
    pub fn open(
        home: Option<PathBuf>,
        book: Option<String>,
        snapshot: bool,
    ) -> Result<Self, CliError> {
        let base = PathResolver::resolve_base(home);
        let config = ConfigManager::with_base_dir(base.clone())?.load()?;
        let storage = JsonStorage::new(Some(base), None)?;
        let book_name = book.unwrap_or_else(|| config.default_book.clone());
        debug!(book = %book_name, root = %storage.base_dir().display(), "session opened");
        Ok(Self {
            storage,
            config,
            book_name,
            valuation: if snapshot {
                Valuation::Snapshot
            } else {
                Valuation::Live
            },
        })
    }

    pub fn execute(&self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Init { name, force } => self.init(name, force),
            Command::Currencies => self.currencies(),
            Command::AddCurrency {
                code,
                name,
                rate,
                symbol,
                base,
            } => self.mutate(|book| {
                let mut currency = Currency::new(code, name, symbol, rate);
                if base {
                    currency = currency.as_base();
                }
                let label = currency.code.clone();
                CurrencyService::add(book, currency)?;
                Ok(format!("Currency {} added", label))
            }),
            Command::EditCurrency {
                code,
                name,
                symbol,
                rate,
                new_code,
            } => self.mutate(|book| {
                let current = CurrencyService::find(book, &code)?;
                let id = current.id;
                let changes = CurrencyUpdate {
                    code: new_code.unwrap_or_else(|| current.code.to_string()),
                    name: name.unwrap_or_else(|| current.name.clone()),
                    symbol: symbol.unwrap_or_else(|| current.symbol.clone()),
                    exchange_rate: rate.unwrap_or(current.exchange_rate),
                };
                CurrencyService::edit(book, id, changes)?;
                Ok(format!("Currency {} updated", code.trim().to_uppercase()))
            }),
            Command::RemoveCurrency { code } => self.mutate(|book| {
                let id = CurrencyService::find(book, &code)?.id;
                let removed = CurrencyService::remove(book, id)?;
                Ok(format!("Currency {} removed", removed.code))
            }),
            Command::SetBase { code } => self.mutate(|book| {
                let id = CurrencyService::find(book, &code)?.id;
                CurrencyService::set_base(book, id)?;
                Ok(format!("Base currency is now {}", code.trim().to_uppercase()))
            }),
            Command::Convert { amount, from, to } => {
                let book = self.load_book()?;
                let converted = CurrencyService::convert(&book, amount, &from, &to)?;
                output::raw(format!(
                    "{} = {}",
                    CurrencyService::format(&book, amount, &from),
                    CurrencyService::format(&book, converted, &to)
                ));
                Ok(())
            }
            Command::AddExpense {
                name,
                amount,
                currency,
                date,
                month,
                notes,
            } => self.mutate(|book| {
                let currency_id = CurrencyService::find(book, &currency)?.id;
                let date = date.unwrap_or_else(today);
                let month = month_or(month.as_deref(), date)?;
                let mut expense = Expense::new(name, amount, currency_id, date, month);
                if let Some(notes) = notes {
                    expense = expense.with_notes(notes);
                }
                let id = RecordService::add_expense(book, expense, &self.targets())?;
                Ok(format!("Expense {} recorded for {}", id, month))
            }),
            Command::AddSalary {
                employee,
                job_title,
                amount,
                currency,
                date,
            } => self.mutate(|book| {
                let currency_id = CurrencyService::find(book, &currency)?.id;
                let salary = Salary::new(
                    employee,
                    job_title,
                    amount,
                    currency_id,
                    date.unwrap_or_else(today),
                );
                let id = RecordService::add_salary(book, salary, &self.targets())?;
                Ok(format!("Salary {} recorded", id))
            }),
            Command::PayAgain { salary_id } => self.mutate(|book| {
                let id = RecordService::pay_again(book, salary_id, &self.targets())?;
                let date = book
                    .salary(id)
                    .map(|salary| salary.payment_date.to_string())
                    .unwrap_or_default();
                Ok(format!("Salary {} paid again on {}", id, date))
            }),
            Command::AddTicket {
                ticket_number,
                pnr,
                from,
                to,
                purchase,
                selling,
                currency,
                fees,
                month,
                customer,
                passengers,
            } => self.mutate(|book| {
                let currency_id = CurrencyService::find(book, &currency)?.id;
                let month = month_or(month.as_deref(), today())?;
                let mut ticket = TicketSale::new(
                    ticket_number,
                    pnr,
                    from,
                    to,
                    Pricing::new(purchase, selling, fees),
                    currency_id,
                    month,
                );
                if let Some(customer) = customer {
                    ticket = ticket.with_customer(customer);
                }
                if let Some(passengers) = passengers {
                    ticket.passengers = passengers;
                }
                let profit = ticket.pricing.profit;
                let id = RecordService::add_ticket(book, ticket, &self.targets())?;
                Ok(format!(
                    "Ticket {} recorded, profit {}",
                    id,
                    CurrencyService::format(book, profit, &currency)
                ))
            }),
            Command::AddHotel {
                booking_number,
                hotel,
                guest,
                check_in,
                check_out,
                purchase,
                selling,
                currency,
                fees,
            } => self.mutate(|book| {
                let currency_id = CurrencyService::find(book, &currency)?.id;
                let booking = HotelBooking::new(
                    booking_number,
                    hotel,
                    guest,
                    check_in,
                    check_out,
                    Pricing::new(purchase, selling, fees),
                    currency_id,
                );
                let nights = booking.nights();
                let id = RecordService::add_hotel(book, booking, &self.targets())?;
                Ok(format!("Hotel booking {} recorded ({} nights)", id, nights))
            }),
            Command::AddVisa {
                visa_type,
                country,
                applicant,
                purchase,
                selling,
                currency,
                fees,
                duration,
                month,
            } => self.mutate(|book| {
                let currency_id = CurrencyService::find(book, &currency)?.id;
                let month = month_or(month.as_deref(), today())?;
                let mut visa = VisaSale::new(
                    visa_type,
                    country,
                    applicant,
                    Pricing::new(purchase, selling, fees),
                    currency_id,
                    month,
                );
                if let Some(duration) = duration {
                    visa = visa.with_duration(duration);
                }
                let id = RecordService::add_visa(book, visa, &self.targets())?;
                Ok(format!("Visa sale {} recorded for {}", id, month))
            }),
            Command::RemoveRecord { kind, id } => self.mutate(|book| {
                let kind: RecordKind = kind
                    .parse()
                    .map_err(|_| CliError::Input(format!("unknown record kind `{}`", kind)))?;
                RecordService::remove(book, kind, id)?;
                Ok(format!("Removed {} record {}", kind, id))
            }),
            Command::Dashboard { month, year } => self.dashboard(month, year),
            Command::Series { category, year } => self.series(&category, year),
            Command::Export {
                section,
                month,
                json,
            } => {
                let book = self.load_book()?;
                let table = ExportService::table(
                    &book,
                    &section,
                    &month,
                    OwnerScope::All,
                    self.valuation,
                )?;
                if json {
                    output::raw(serde_json::to_string_pretty(&table)?);
                } else if table.is_empty() {
                    output::info(format!("No {} for {}", table.title.to_lowercase(), table.month));
                } else {
                    output::raw(table.render_text());
                }
                Ok(())
            }
            Command::Backup { note } => {
                let book = self.load_book()?;
                self.storage
                    .backup(&book, &self.book_name, note.as_deref())?;
                output::success("Backup written");
                Ok(())
            }
            Command::Backups => {
                let backups = self.storage.list_backups(&self.book_name)?;
                if backups.is_empty() {
                    output::info("No backups yet");
                }
                for backup in backups {
                    output::raw(backup);
                }
                Ok(())
            }
            Command::Restore { backup } => {
                let book = self.storage.restore(&self.book_name, &backup)?;
                output::success(format!("Restored `{}` from {}", book.name, backup));
                Ok(())
            }
        }
    }

    fn init(&self, name: Option<String>, force: bool) -> Result<(), CliError> {
        if self.storage.exists(&self.book_name) && !force {
            return Err(CliError::Input(format!(
                "book `{}` already exists; pass --force to recreate it",
                self.book_name
            )));
        }
        let mut book = Book::seeded(name.unwrap_or_else(|| self.book_name.clone()));
        let wanted = CurrencyCode::new(self.config.base_currency.as_str());
        match book.currencies.by_code(wanted.as_str()).map(|c| (c.id, c.is_base)) {
            Some((id, false)) => CurrencyService::set_base(&mut book, id)?,
            Some((_, true)) => {}
            None => warn!(code = %wanted, "configured base currency is not in the default table"),
        }
        self.storage.save(&book, &self.book_name)?;
        output::success(format!(
            "Book `{}` created with {} currencies",
            self.book_name,
            book.currencies.len()
        ));
        Ok(())
    }

    fn currencies(&self) -> Result<(), CliError> {
        let book = self.load_book()?;
        output::section("Currencies");
        for currency in CurrencyService::list(&book) {
            let marker = if currency.is_base { " (base)" } else { "" };
            output::field(
                currency.code.as_str(),
                format!(
                    "{} {} rate {}{}",
                    currency.name,
                    currency.symbol,
                    currency.exchange_rate,
                    marker
                ),
                FIELD_WIDTH,
            );
        }
        Ok(())
    }

    fn dashboard(&self, month: Option<String>, year: Option<i32>) -> Result<(), CliError> {
        let book = self.load_book()?;
        let month = month_or(month.as_deref(), today())?;
        let year = year.unwrap_or_else(|| self.config.reporting_year());
        let summary =
            SummaryService::dashboard(&book, month, year, OwnerScope::All, self.valuation)?;
        let money = |value: f64| CurrencyService::format(&book, value, summary.base_currency.as_str());

        output::section(format!("Dashboard {}", summary.month));
        output::field("Expenses", money(summary.total_expenses), FIELD_WIDTH);
        output::field("Salaries", money(summary.total_salaries), FIELD_WIDTH);
        output::field("Ticket profit", money(summary.ticket_profit), FIELD_WIDTH);
        output::field("Hotel profit", money(summary.hotel_profit), FIELD_WIDTH);
        output::field("Visa profit", money(summary.visa_profit), FIELD_WIDTH);
        output::field("Net", money(summary.net), FIELD_WIDTH);

        output::section(format!("Year {}", year));
        for entry in &summary.series {
            let totals: Vec<String> = entry.series.totals.iter().map(|v| format_amount(*v)).collect();
            output::field(entry.kind.label(), totals.join(" | "), FIELD_WIDTH);
        }
        Ok(())
    }

    fn series(&self, category: &str, year: Option<i32>) -> Result<(), CliError> {
        let kind: RecordKind = category
            .parse()
            .map_err(|_| CliError::Input(format!("unknown category `{}`", category)))?;
        let book = self.load_book()?;
        let year = year.unwrap_or_else(|| self.config.reporting_year());
        let series = SummaryService::series(&book, kind, year, OwnerScope::All, self.valuation)?;
        output::section(format!("{} {}", kind.label(), year));
        for (month, total) in series.points() {
            output::field(&month.to_string(), format_amount(total), FIELD_WIDTH);
        }
        output::field("Total", format_amount(series.total()), FIELD_WIDTH);
        Ok(())
    }

    /// Loads the book, applies a configured pivot and warns when the currency table
    /// misses the pivot or a well-known currency.
    fn load_book(&self) -> Result<Book, CliError> {
        let mut book = self.storage.load(&self.book_name)?;
        book.currencies.set_pivot(self.config.pivot_code());
        if let Err(err) = book.currencies.check_configuration(&self.targets()) {
            output::warning(&err);
        }
        Ok(book)
    }

    fn mutate<F>(&self, apply: F) -> Result<(), CliError>
    where
        F: FnOnce(&mut Book) -> Result<String, CliError>,
    {
        let mut book = self.load_book()?;
        let message = apply(&mut book)?;
        self.storage.save(&book, &self.book_name)?;
        output::success(message);
        Ok(())
    }

    fn targets(&self) -> Vec<CurrencyCode> {
        self.config.well_known_codes()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn month_or(raw: Option<&str>, date: NaiveDate) -> Result<MonthTag, CliError> {
    match raw {
        Some(raw) => Ok(MonthTag::parse_lenient(raw)?),
        None => Ok(MonthTag::from_date(date)),
    }
}
