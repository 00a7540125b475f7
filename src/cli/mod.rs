//! Command-line front end over the bookkeeping services.

pub mod output;
mod session;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::errors::CliError;

pub use session::Session;

#[derive(Debug, Parser)]
#[command(name = "agency_books_cli", version, about = "Multi-currency books for a travel agency")]
pub struct Cli {
    /// Data directory (defaults to $AGENCY_BOOKS_HOME or ~/.agency_books)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Book to operate on (defaults to the configured book)
    #[arg(short, long, global = true)]
    pub book: Option<String>,

    /// Value reports with write-time snapshots instead of current rates
    #[arg(long, global = true)]
    pub snapshot: bool,

    /// Plain output without colors
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the book with the default currency table
    Init {
        /// Display name of the book
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing book
        #[arg(long)]
        force: bool,
    },
    /// List currencies and their rates
    Currencies,
    /// Define a new currency
    AddCurrency {
        code: String,
        name: String,
        /// Units of the pivot currency per one unit of this currency
        rate: f64,
        #[arg(long, default_value = "")]
        symbol: String,
        /// Make it the base currency
        #[arg(long)]
        base: bool,
    },
    /// Change the name, symbol, code or rate of a currency
    EditCurrency {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        rate: Option<f64>,
        #[arg(long = "new-code")]
        new_code: Option<String>,
    },
    /// Delete a currency that no record uses
    RemoveCurrency { code: String },
    /// Mark a currency as the base
    SetBase { code: String },
    /// Convert an amount between two currencies
    #[command(allow_negative_numbers = true)]
    Convert { amount: f64, from: String, to: String },
    /// Record an expense
    AddExpense {
        name: String,
        amount: f64,
        currency: String,
        /// Expense date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Reporting month, YYYY-MM (defaults to the date's month)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record a salary payment
    AddSalary {
        employee: String,
        job_title: String,
        amount: f64,
        currency: String,
        /// Payment date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Repeat a salary on the first day of the next month
    PayAgain { salary_id: Uuid },
    /// Record a ticket sale
    AddTicket {
        ticket_number: String,
        pnr: String,
        from: String,
        to: String,
        purchase: f64,
        selling: f64,
        currency: String,
        #[arg(long)]
        fees: Option<f64>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        passengers: Option<u32>,
    },
    /// Record a hotel booking
    AddHotel {
        booking_number: String,
        hotel: String,
        guest: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
        purchase: f64,
        selling: f64,
        currency: String,
        #[arg(long)]
        fees: Option<f64>,
    },
    /// Record a visa sale
    AddVisa {
        visa_type: String,
        country: String,
        applicant: String,
        purchase: f64,
        selling: f64,
        currency: String,
        #[arg(long)]
        fees: Option<f64>,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        month: Option<String>,
    },
    /// Delete a record; `export` lists the ids
    RemoveRecord {
        /// expenses, salaries, tickets, hotels or visas
        kind: String,
        id: Uuid,
    },
    /// Monthly totals in the base currency
    Dashboard {
        /// YYYY-MM or MM-YYYY (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
        /// Year of the series (defaults to the configured reporting year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Twelve monthly totals of one category
    Series {
        /// expenses, salaries, tickets, hotels or visas
        category: String,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Rows of one section for a month
    Export {
        section: String,
        month: String,
        /// Print JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Write a timestamped backup of the book
    Backup {
        #[arg(long)]
        note: Option<String>,
    },
    /// List backups, newest first
    Backups,
    /// Replace the book with one of its backups
    Restore { backup: String },
}

pub fn run_cli() -> Result<(), CliError> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    output::set_preferences(output::OutputPreferences { plain: cli.plain });
    let session = Session::open(cli.home, cli.book, cli.snapshot)?;
    session.execute(cli.command)
}
