#![doc(test(attr(deny(warnings))))]

//! Agency Books keeps a travel agency's expenses, salaries and ticket, hotel and visa
//! sales in any currency, and reports them normalized to one base currency.

pub mod aggregation;
pub mod book;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod export;
pub mod records;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Agency Books tracing initialized.");
    });
}
