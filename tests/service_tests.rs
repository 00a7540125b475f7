mod common;

use agency_books::aggregation::Valuation;
use agency_books::core::services::{
    CurrencyService, ExportService, RecordService, ServiceError, SummaryService,
};
use agency_books::currency::{Currency, CurrencyUpdate};
use agency_books::export::Cell;
use agency_books::records::{
    Expense, HotelBooking, MonthTag, OwnerScope, Pricing, RecordKind, TicketSale,
};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn new_currency_is_snapshotted_only_when_well_known() {
    let mut book = common::seeded_book();
    let aed = CurrencyService::add(&mut book, Currency::new("aed", "Dirham", "د.إ", 13.1)).unwrap();
    let ticket = TicketSale::new(
        "TK-77",
        "QX12",
        "Dubai",
        "Cairo",
        Pricing::new(1000.0, 1200.0, None),
        aed,
        MonthTag::new(2025, 5).unwrap(),
    );
    let id = RecordService::add_ticket(&mut book, ticket, &common::well_known()).unwrap();
    let snapshot = book.snapshots.snapshot(id).unwrap();
    // Own currency plus the four well-known ones, for each of the four sale metrics.
    assert_eq!(snapshot.entries.len(), 20);
    assert_eq!(snapshot.source_currency.as_str(), "AED");
}

#[test]
fn dashboard_nets_profits_against_costs() {
    let mut book = common::seeded_book();
    let egp = book.currencies.by_code("EGP").unwrap().id;
    let eur = book.currencies.by_code("EUR").unwrap().id;
    RecordService::add_hotel(
        &mut book,
        HotelBooking::new(
            "BK-1",
            "Sea Breeze",
            "Laila",
            date(2025, 8, 30),
            date(2025, 9, 2),
            Pricing::new(200.0, 260.0, Some(10.0)),
            eur,
        ),
        &common::well_known(),
    )
    .unwrap();
    RecordService::add_expense(
        &mut book,
        Expense::new(
            "Electricity",
            600.0,
            egp,
            date(2025, 8, 5),
            MonthTag::new(2025, 8).unwrap(),
        ),
        &common::well_known(),
    )
    .unwrap();
    let august = MonthTag::new(2025, 8).unwrap();
    let summary =
        SummaryService::dashboard(&book, august, 2025, OwnerScope::All, Valuation::Snapshot)
            .unwrap();
    assert_eq!(summary.hotel_profit, 2600.0);
    assert_eq!(summary.total_expenses, 600.0);
    assert_eq!(summary.net, 2000.0);
    assert_eq!(summary.total_profit(), 2600.0);
    assert_eq!(summary.series_for(RecordKind::Hotel).unwrap().totals[7], 2600.0);
    assert_eq!(summary.series_for(RecordKind::Hotel).unwrap().totals[8], 0.0);
}

#[test]
fn export_rows_match_the_requested_month() {
    let mut book = common::seeded_book();
    let usd = book.currencies.by_code("USD").unwrap().id;
    for month in ["2025-04", "2025-05"] {
        RecordService::add_ticket(
            &mut book,
            TicketSale::new(
                "TK",
                "PNR",
                "Cairo",
                "Paris",
                Pricing::new(400.0, 450.0, None),
                usd,
                month.parse().unwrap(),
            )
            .with_customer("Nour"),
            &common::well_known(),
        )
        .unwrap();
    }
    let table =
        ExportService::table(&book, "tickets", "05-2025", OwnerScope::All, Valuation::Live)
            .unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.headers.len(), table.rows[0].len());
    assert_eq!(table.rows[0].last(), Some(&Cell::Number(2400.0)));
}

#[test]
fn deleting_a_used_currency_is_refused() {
    let mut book = common::seeded_book();
    let usd = book.currencies.by_code("USD").unwrap().id;
    RecordService::add_ticket(
        &mut book,
        TicketSale::new(
            "TK",
            "PNR",
            "Cairo",
            "Rome",
            Pricing::new(1.0, 2.0, None),
            usd,
            MonthTag::new(2025, 1).unwrap(),
        ),
        &common::well_known(),
    )
    .unwrap();
    assert!(matches!(
        CurrencyService::remove(&mut book, usd),
        Err(ServiceError::Invalid(_))
    ));
}

#[test]
fn snapshot_export_matches_snapshot_totals_after_a_rate_edit() {
    let mut book = common::seeded_book();
    let usd = book.currencies.by_code("USD").unwrap().id;
    let june = MonthTag::new(2025, 6).unwrap();
    RecordService::add_expense(
        &mut book,
        Expense::new("Flights desk", 25.0, usd, date(2025, 6, 4), june),
        &common::well_known(),
    )
    .unwrap();
    CurrencyService::edit(
        &mut book,
        usd,
        CurrencyUpdate {
            code: "USD".into(),
            name: "US Dollar".into(),
            symbol: "$".into(),
            exchange_rate: 50.0,
        },
    )
    .unwrap();

    let snapshot_total = SummaryService::monthly_total(
        &book,
        RecordKind::Expense,
        june,
        OwnerScope::All,
        Valuation::Snapshot,
    )
    .unwrap();
    assert_eq!(snapshot_total, 1200.0);

    let frozen =
        ExportService::table(&book, "expenses", "2025-06", OwnerScope::All, Valuation::Snapshot)
            .unwrap();
    assert_eq!(frozen.rows[0].last(), Some(&Cell::Number(snapshot_total)));

    let live =
        ExportService::table(&book, "expenses", "2025-06", OwnerScope::All, Valuation::Live)
            .unwrap();
    assert_eq!(live.rows[0].last(), Some(&Cell::Number(1250.0)));
}

#[test]
fn moving_the_base_keeps_live_and_snapshot_totals_aligned() {
    let mut book = common::seeded_book();
    let egp = book.currencies.by_code("EGP").unwrap().id;
    let usd = book.currencies.by_code("USD").unwrap().id;
    let june = MonthTag::new(2025, 6).unwrap();
    RecordService::add_expense(
        &mut book,
        Expense::new("Rent", 4800.0, egp, date(2025, 6, 1), june),
        &common::well_known(),
    )
    .unwrap();
    CurrencyService::set_base(&mut book, usd).unwrap();

    assert_eq!(CurrencyService::convert(&book, 100.0, "EGP", "USD").unwrap(), 2.08);
    let total = |valuation| {
        SummaryService::monthly_total(&book, RecordKind::Expense, june, OwnerScope::All, valuation)
            .unwrap()
    };
    assert_eq!(total(Valuation::Live), 100.0);
    assert_eq!(total(Valuation::Snapshot), 100.0);
}
