#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── EntryType / TransactionType ───────────────────────────────

#[test]
fn test_entry_type_parse() {
    assert_eq!(EntryType::parse("cash"), Some(EntryType::Cash));
    assert_eq!(EntryType::parse("BANK"), Some(EntryType::Bank));
    assert_eq!(EntryType::parse(" other "), Some(EntryType::Other));
    assert_eq!(EntryType::parse("card"), None);
}

#[test]
fn test_transaction_type_roundtrip() {
    for t in TransactionType::all() {
        assert_eq!(TransactionType::parse(t.as_str()), Some(*t));
    }
    for t in EntryType::all() {
        assert_eq!(EntryType::parse(t.as_str()), Some(*t));
    }
}

#[test]
fn test_entry_income_expense() {
    let income = AccountEntry::new(
        "Salary".into(),
        dec!(100),
        EntryType::Bank,
        TransactionType::Income,
        1,
    );
    assert!(income.is_income());
    assert!(!income.is_expense());

    let transfer = AccountEntry {
        transaction_type: TransactionType::Transfer,
        ..income
    };
    assert!(!transfer.is_income());
    assert!(!transfer.is_expense());
}

#[test]
fn test_entry_new_defaults() {
    let entry = AccountEntry::new(
        "Rent".into(),
        dec!(1200),
        EntryType::Cash,
        TransactionType::Expense,
        7,
    );
    assert!(entry.id.is_none());
    assert_eq!(entry.category_id, 7);
    assert!(entry.party_id.is_none());
    assert!(entry.bank_id.is_none());
    assert_eq!(entry.created_at, entry.updated_at);
    assert!(entry.transaction_date > 0);
}

// ── Attachment ────────────────────────────────────────────────

#[test]
fn test_attachment_derives_name_and_mime() {
    let a = Attachment::new(3, "/receipts/2024/lunch.JPG".into());
    assert_eq!(a.file_name.as_deref(), Some("lunch.JPG"));
    assert_eq!(a.mime_type.as_deref(), Some("image/jpeg"));
    assert!(a.is_image());

    let b = Attachment::new(3, "/receipts/invoice.pdf".into());
    assert!(!b.is_image());

    let c = Attachment::new(3, "notes".into());
    assert!(c.mime_type.is_none());
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_display_names() {
    assert_eq!(format!("{}", Party::new("Alice".into())), "Alice");
    assert_eq!(format!("{}", Bank::new("HDFC".into())), "HDFC");
    assert_eq!(format!("{}", TransactionType::Expense), "EXPENSE");
}

// ── Filters & paging ──────────────────────────────────────────

#[test]
fn test_filter_count() {
    assert_eq!(EntryFilter::default().count(), 0);
    let f = EntryFilter {
        category_ids: vec![1, 2],
        party_id: Some(4),
        ..EntryFilter::between(0, 10)
    };
    assert_eq!(f.count(), 4);
}

#[test]
fn test_filter_blank_title_is_ignored() {
    assert!(EntryFilter::default().with_title("   ").title_query.is_none());
    assert_eq!(
        EntryFilter::default().with_title(" rent ").title_query.as_deref(),
        Some("rent")
    );
}

#[test]
fn test_sort_option_parse() {
    assert_eq!(SortOption::parse("oldest"), Some(SortOption::OldestFirst));
    assert_eq!(
        SortOption::parse("amount-high-low"),
        Some(SortOption::AmountHighLow)
    );
    assert_eq!(SortOption::parse("random"), None);
    assert_eq!(SortOption::default(), SortOption::NewestFirst);
}

#[test]
fn test_page_next_offset() {
    let full = Page {
        items: vec![1, 2, 3],
        offset: 6,
        limit: 3,
    };
    assert_eq!(full.next_offset(), Some(9));

    let short = Page {
        items: vec![1],
        offset: 9,
        limit: 3,
    };
    assert_eq!(short.next_offset(), None);
}

#[test]
fn test_page_request_never_zero() {
    assert_eq!(PageRequest::first(0).limit, 1);
    let p = PageRequest::first(10).next();
    assert_eq!((p.offset, p.limit), (10, 10));
}

// ── Summary ───────────────────────────────────────────────────

#[test]
fn test_summary_totals_balance() {
    let t = SummaryTotals::new(dec!(150), dec!(30));
    assert_eq!(t.balance, dec!(120));
    assert_eq!(SummaryTotals::default().balance, dec!(0));
}

#[test]
fn test_year_month_parse_and_display() {
    let ym: YearMonth = "2024-03".parse().unwrap();
    assert_eq!(ym, YearMonth { year: 2024, month: 3 });
    assert_eq!(ym.to_string(), "2024-03");
    assert!("2024-13".parse::<YearMonth>().is_err());
    assert!("March".parse::<YearMonth>().is_err());
}

#[test]
fn test_year_month_ordering() {
    let mut months = vec![
        YearMonth::new(2024, 1).unwrap(),
        YearMonth::new(2023, 12).unwrap(),
        YearMonth::new(2024, 11).unwrap(),
    ];
    months.sort();
    assert_eq!(months[0].to_string(), "2023-12");
    assert_eq!(months[2].to_string(), "2024-11");
}

// ── Periods ───────────────────────────────────────────────────

#[test]
fn test_month_range_covers_whole_month() {
    let (start, end) = Period::Month(YearMonth::new(2024, 2).unwrap())
        .range_at(ymd(2030, 1, 1))
        .unwrap();
    assert_eq!(millis_to_date(start), Some(ymd(2024, 2, 1)));
    assert_eq!(millis_to_date(end), Some(ymd(2024, 2, 29)));
    assert_eq!(end + 1, date_to_millis(ymd(2024, 3, 1)));
}

#[test]
fn test_december_range_rolls_year() {
    let (_, end) = Period::Month(YearMonth::new(2023, 12).unwrap())
        .range_at(ymd(2030, 1, 1))
        .unwrap();
    assert_eq!(end + 1, date_to_millis(ymd(2024, 1, 1)));
}

#[test]
fn test_week_starts_monday() {
    // 2024-05-16 is a Thursday
    let (start, end) = Period::ThisWeek.range_at(ymd(2024, 5, 16)).unwrap();
    assert_eq!(millis_to_date(start), Some(ymd(2024, 5, 13)));
    assert_eq!(millis_to_date(end), Some(ymd(2024, 5, 19)));
}

#[test]
fn test_today_and_year_ranges() {
    let day = ymd(2024, 7, 4);
    let (start, end) = Period::Today.range_at(day).unwrap();
    assert_eq!(start, date_to_millis(day));
    assert_eq!(end - start, 86_400_000 - 1);

    let (start, end) = Period::Year(2023).range_at(day).unwrap();
    assert_eq!(millis_to_date(start), Some(ymd(2023, 1, 1)));
    assert_eq!(millis_to_date(end), Some(ymd(2023, 12, 31)));
}

#[test]
fn test_custom_range_is_normalised() {
    let p = Period::Custom {
        start: ymd(2024, 3, 10),
        end: ymd(2024, 3, 1),
    };
    let (start, end) = p.range_at(ymd(2030, 1, 1)).unwrap();
    assert!(start < end);
    assert_eq!(millis_to_date(start), Some(ymd(2024, 3, 1)));
}
