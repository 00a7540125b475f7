use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// `YYYY-MM` grouping key used for monthly reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthTag {
    year: i32,
    month: u32,
}

impl MonthTag {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(LedgerError::Validation(format!(
                "invalid month {:04}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`, also accepting the `MM-YYYY` form used by export links.
    pub fn parse_lenient(raw: &str) -> Result<Self, LedgerError> {
        let trimmed = raw.trim();
        if let Ok(tag) = trimmed.parse::<MonthTag>() {
            return Ok(tag);
        }
        match trimmed.split_once('-') {
            Some((month, year)) if is_digits(month, 2) && is_digits(year, 4) => {
                let month = month.parse::<u32>().map_err(|_| invalid(raw))?;
                let year = year.parse::<i32>().map_err(|_| invalid(raw))?;
                Self::new(year, month)
            }
            _ => Err(invalid(raw)),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Following month, December rolling into January of the next year.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn months_of_year(year: i32) -> Vec<MonthTag> {
        (1..=12).map(|month| MonthTag { year, month }).collect()
    }
}

fn invalid(raw: &str) -> LedgerError {
    LedgerError::Validation(format!("`{}` is not a YYYY-MM month", raw.trim()))
}

impl fmt::Display for MonthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthTag {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed.split_once('-').ok_or_else(|| invalid(s))?;
        if !is_digits(year, 4) || !is_digits(month, 2) {
            return Err(invalid(s));
        }
        let year = year.parse::<i32>().map_err(|_| invalid(s))?;
        let month = month.parse::<u32>().map_err(|_| invalid(s))?;
        Self::new(year, month)
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

impl TryFrom<String> for MonthTag {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthTag> for String {
    fn from(value: MonthTag) -> Self {
        value.to_string()
    }
}
