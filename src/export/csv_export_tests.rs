#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn seeded_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    let cat = db.insert_category(&Category::new("Food".into())).unwrap();
    let party = db.insert_party(&Party::new("Deli, Ltd".into())).unwrap();

    let mut lunch = AccountEntry::new(
        "Lunch".into(),
        dec!(12.5),
        EntryType::Cash,
        TransactionType::Expense,
        cat,
    );
    lunch.transaction_date = date_to_millis(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    lunch.party_id = Some(party);
    lunch.description = Some("soup \"of the day\"".into());
    let id = db.insert_entry(&lunch).unwrap();
    db.insert_attachment(&Attachment::new(id, "/r/lunch.jpg".into()))
        .unwrap();

    let mut refund = AccountEntry::new(
        "Refund".into(),
        dec!(3),
        EntryType::Bank,
        TransactionType::Income,
        cat,
    );
    refund.transaction_date = date_to_millis(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    db.insert_entry(&refund).unwrap();
    db
}

fn read_back(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);
    rdr.records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_export_writes_header_and_rows() {
    let db = seeded_db();
    let entries = db.get_all_entries(&EntryFilter::default()).unwrap();

    let mut out = Vec::new();
    let count = write_entries(&mut out, &entries).unwrap();
    assert_eq!(count, 2);

    let rows = read_back(&out);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "id");
    assert_eq!(rows[0].len(), 11);

    // newest first
    let lunch = &rows[2];
    assert_eq!(lunch[1], "2024-06-03");
    assert_eq!(lunch[2], "Lunch");
    assert_eq!(lunch[3], "soup \"of the day\"");
    assert_eq!(lunch[4], "12.50");
    assert_eq!(lunch[5], "CASH");
    assert_eq!(lunch[6], "EXPENSE");
    assert_eq!(lunch[7], "Food");
    assert_eq!(lunch[8], "Deli, Ltd");
    assert_eq!(lunch[9], "");
    assert_eq!(lunch[10], "1");

    assert_eq!(rows[1][2], "Refund");
    assert_eq!(rows[1][8], "");
}

#[test]
fn test_export_to_file_respects_filter() {
    let db = seeded_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("july.csv");

    let (start, end) = Period::Month(YearMonth::new(2024, 7).unwrap())
        .range()
        .unwrap();
    let count = export_entries_csv(&db, &EntryFilter::between(start, end), &path).unwrap();
    assert_eq!(count, 1);

    let rows = read_back(&std::fs::read(&path).unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][2], "Refund");
}

#[test]
fn test_export_empty_selection() {
    let db = Database::open_in_memory().unwrap();
    let mut out = Vec::new();
    let entries = db.get_all_entries(&EntryFilter::default()).unwrap();
    assert_eq!(write_entries(&mut out, &entries).unwrap(), 0);
    assert_eq!(read_back(&out).len(), 1);
}
