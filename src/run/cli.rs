use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::Config;
use crate::db::Database;
use crate::models::*;

/// Flags that stand alone; every other `--flag` takes a value.
const SWITCHES: &[&str] = &["--today", "--week", "--all"];

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "party" | "p" => cli_party(rest, db, config),
        "category" | "c" => cli_category(rest, db, config),
        "bank" | "b" => cli_bank(rest, db, config),
        "entry" | "e" => cli_entry(rest, db, config),
        "attach" | "a" => cli_attach(rest, db),
        "search" => cli_search(rest, db),
        "summary" | "s" => cli_summary(rest, db),
        "periods" => cli_periods(db),
        "export" => cli_export(rest, db),
        "backup" => cli_backup(rest, db),
        "restore" => cli_restore(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("handbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("Handbook - local bookkeeping ledger");
    println!();
    println!("Usage: handbook <command>");
    println!();
    println!("Commands:");
    println!("  party add <name> [--contact <no>] [--address <a>] [--note <d>]");
    println!("  party list [query] [--page <n>]");
    println!("  party edit <id> [--name <n>] [--contact <no>] [--address <a>] [--note <d>]");
    println!("  party rm <id>");
    println!("  category add <name> [--type income|expense|transfer] [--note <d>]");
    println!("  category list [query] [--type <t>] [--page <n>]");
    println!("  category edit <id> [--name <n>] [--type <t>] [--note <d>]");
    println!("  category rm <id>");
    println!("  bank add <name> [--note <d>]");
    println!("  bank list [query] [--page <n>]");
    println!("  bank edit <id> [--name <n>] [--note <d>]");
    println!("  bank rm <id>");
    println!("  entry add <title> <amount> --category <id|name>");
    println!("      [--type <t>] [--mode cash|bank|other] [--date YYYY-MM-DD]");
    println!("      [--party <id>] [--bank <id>] [--note <d>]");
    println!("  entry list [period] [--category <id>] [--party <id>] [--bank <id>]");
    println!("      [--type <t>] [--title <q>] [--sort newest|oldest|amount-high-low|amount-low-high]");
    println!("      [--page <n> | --all]");
    println!("  entry edit <id> [--title <t>] [--amount <a>] [--date YYYY-MM-DD] ...");
    println!("      (same flags as add; --party 0 / --bank 0 clears the link)");
    println!("  entry show <id>");
    println!("  entry rm <id>");
    println!("  attach add <entry-id> <file>...");
    println!("  attach list <entry-id>");
    println!("  attach rm <attachment-id>...");
    println!("  search <text>                 Full-text search over titles and descriptions");
    println!("  summary [period] [--category <ids>] [--party <ids>] [--bank <ids>]");
    println!("  periods                       List months and years that have entries");
    println!("  export [path] [period]        Export entries to CSV");
    println!("  backup <path>                 Write a copy of the database");
    println!("  restore <path>                Replace the database with a backup");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Period flags: --month YYYY-MM | --year YYYY | --today | --week");
    println!("              --from YYYY-MM-DD --to YYYY-MM-DD");
}

// ── Argument helpers ──────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn has_switch(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !SWITCHES.contains(&arg.as_str()) {
                iter.next();
            }
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid id: {raw}"))
}

fn parse_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_id)
        .collect()
}

fn opt_id(args: &[String], name: &str) -> Result<Option<i64>> {
    flag(args, name).map(parse_id).transpose()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{raw}', expected YYYY-MM-DD"))
}

fn parse_transaction_type(raw: &str) -> Result<TransactionType> {
    TransactionType::parse(raw).ok_or_else(|| {
        let valid: Vec<&str> = TransactionType::all().iter().map(|t| t.as_str()).collect();
        anyhow::anyhow!("Unknown transaction type '{raw}', expected one of {}", valid.join(", "))
    })
}

fn parse_entry_type(raw: &str) -> Result<EntryType> {
    EntryType::parse(raw).ok_or_else(|| {
        let valid: Vec<&str> = EntryType::all().iter().map(|t| t.as_str()).collect();
        anyhow::anyhow!("Unknown entry mode '{raw}', expected one of {}", valid.join(", "))
    })
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).with_context(|| format!("Invalid amount: {raw}"))
}

/// A category given by exact (case-insensitive) name, or by id when no
/// category carries that name.
fn resolve_category(db: &Database, raw: &str) -> Result<i64> {
    if let Some(id) = db.get_category_by_name(raw)?.and_then(|c| c.id) {
        return Ok(id);
    }
    raw.trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("No category named '{raw}'"))
}

fn page_request(args: &[String], config: &Config) -> Result<PageRequest> {
    let page: u32 = match flag(args, "--page") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .with_context(|| format!("Invalid page: {raw}"))?,
        None => 1,
    };
    let first = PageRequest::first(config.page_size);
    Ok(PageRequest {
        offset: (page - 1).saturating_mul(first.limit),
        ..first
    })
}

fn period_from_args(args: &[String]) -> Result<Option<Period>> {
    if let Some(m) = flag(args, "--month") {
        return Ok(Some(Period::Month(m.parse()?)));
    }
    if let Some(y) = flag(args, "--year") {
        let year = y
            .parse::<i32>()
            .with_context(|| format!("Invalid year: {y}"))?;
        return Ok(Some(Period::Year(year)));
    }
    if has_switch(args, "--today") {
        return Ok(Some(Period::Today));
    }
    if has_switch(args, "--week") {
        return Ok(Some(Period::ThisWeek));
    }
    match (flag(args, "--from"), flag(args, "--to")) {
        (Some(from), Some(to)) => Ok(Some(Period::Custom {
            start: parse_date(from)?,
            end: parse_date(to)?,
        })),
        (None, None) => Ok(None),
        _ => anyhow::bail!("--from and --to must be given together"),
    }
}

fn period_filter(period: Option<Period>) -> Result<EntryFilter> {
    let Some(p) = period else {
        return Ok(EntryFilter::default());
    };
    let (start, end) = p
        .range()
        .ok_or_else(|| anyhow::anyhow!("Period is out of range: {p:?}"))?;
    Ok(EntryFilter::between(start, end))
}

fn format_date(millis: i64) -> String {
    millis_to_date(millis)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".into())
}

fn print_more_hint(next: Option<u32>, limit: u32) {
    if let Some(offset) = next {
        println!("(more: --page {})", offset / limit.max(1) + 1);
    }
}

// ── Parties ───────────────────────────────────────────────────

fn cli_party(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pos = positionals(args);
    match pos.first().copied() {
        Some("add") => {
            let name = pos
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: handbook party add <name>"))?;
            let mut party = Party::new((*name).to_string())
                .with_contact(flag(args, "--contact").map(str::to_string))
                .with_address(flag(args, "--address").map(str::to_string));
            party.description = flag(args, "--note").map(str::to_string);
            let id = db.insert_party(&party)?;
            println!("Added party {id}: {name}");
            Ok(())
        }
        Some("list") | None => {
            let page = db.get_parties(pos.get(1).copied().unwrap_or(""), page_request(args, config)?)?;
            if page.is_empty() {
                println!("No parties");
                return Ok(());
            }
            println!("{:<6} {:<24} {:<16} Address", "ID", "Name", "Contact");
            println!("{}", "─".repeat(60));
            for p in &page.items {
                println!(
                    "{:<6} {:<24} {:<16} {}",
                    p.id.unwrap_or(0),
                    p.name,
                    p.contact_number.as_deref().unwrap_or(""),
                    p.address.as_deref().unwrap_or(""),
                );
            }
            print_more_hint(page.next_offset(), page.limit);
            Ok(())
        }
        Some("edit") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let mut party = db
                .get_party_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Party {id} not found"))?;
            if let Some(name) = flag(args, "--name") {
                party.name = name.to_string();
            }
            if let Some(contact) = flag(args, "--contact") {
                party.contact_number = Some(contact.to_string());
            }
            if let Some(address) = flag(args, "--address") {
                party.address = Some(address.to_string());
            }
            if let Some(note) = flag(args, "--note") {
                party.description = Some(note.to_string());
            }
            db.update_party(&party)?;
            println!("Updated party {id}: {party}");
            Ok(())
        }
        Some("rm") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let detached = db.delete_party(id)?;
            println!("Deleted party {id} ({detached} entries detached)");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown party command: {other}"),
    }
}

// ── Categories ────────────────────────────────────────────────

fn cli_category(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pos = positionals(args);
    let transaction_type = flag(args, "--type").map(parse_transaction_type).transpose()?;
    match pos.first().copied() {
        Some("add") => {
            let name = pos
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: handbook category add <name>"))?;
            let mut category = Category::new((*name).to_string());
            if let Some(t) = transaction_type {
                category = category.with_transaction_type(t);
            }
            category.description = flag(args, "--note").map(str::to_string);
            let id = db.insert_category(&category)?;
            println!("Added category {id}: {name}");
            Ok(())
        }
        Some("list") | None => {
            let filter = CategoryFilter {
                query: pos.get(1).copied().unwrap_or("").to_string(),
                transaction_type,
            };
            let page = db.get_categories(&filter, page_request(args, config)?)?;
            if page.is_empty() {
                println!("No categories");
                return Ok(());
            }
            println!("{:<6} {:<24} Type", "ID", "Name");
            println!("{}", "─".repeat(40));
            for c in &page.items {
                println!(
                    "{:<6} {:<24} {}",
                    c.id.unwrap_or(0),
                    c.name,
                    c.transaction_type.map(|t| t.as_str()).unwrap_or("-"),
                );
            }
            print_more_hint(page.next_offset(), page.limit);
            Ok(())
        }
        Some("edit") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let mut category = db
                .get_category_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Category {id} not found"))?;
            if let Some(name) = flag(args, "--name") {
                category.name = name.to_string();
            }
            if transaction_type.is_some() {
                category.transaction_type = transaction_type;
            }
            if let Some(note) = flag(args, "--note") {
                category.description = Some(note.to_string());
            }
            db.update_category(&category)?;
            println!("Updated category {id}: {category}");
            Ok(())
        }
        Some("rm") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            db.delete_category(id)?;
            println!("Deleted category {id}");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown category command: {other}"),
    }
}

// ── Banks ─────────────────────────────────────────────────────

fn cli_bank(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pos = positionals(args);
    match pos.first().copied() {
        Some("add") => {
            let name = pos
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("Usage: handbook bank add <name>"))?;
            let mut bank = Bank::new((*name).to_string());
            bank.description = flag(args, "--note").map(str::to_string);
            let id = db.insert_bank(&bank)?;
            println!("Added bank {id}: {name}");
            Ok(())
        }
        Some("list") | None => {
            let page = db.get_banks(pos.get(1).copied().unwrap_or(""), page_request(args, config)?)?;
            if page.is_empty() {
                println!("No banks");
                return Ok(());
            }
            println!("{:<6} {:<24} Description", "ID", "Name");
            println!("{}", "─".repeat(50));
            for b in &page.items {
                println!(
                    "{:<6} {:<24} {}",
                    b.id.unwrap_or(0),
                    b.name,
                    b.description.as_deref().unwrap_or(""),
                );
            }
            print_more_hint(page.next_offset(), page.limit);
            Ok(())
        }
        Some("edit") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let mut bank = db
                .get_bank_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Bank {id} not found"))?;
            if let Some(name) = flag(args, "--name") {
                bank.name = name.to_string();
            }
            if let Some(note) = flag(args, "--note") {
                bank.description = Some(note.to_string());
            }
            db.update_bank(&bank)?;
            println!("Updated bank {id}: {bank}");
            Ok(())
        }
        Some("rm") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let detached = db.delete_bank(id)?;
            println!("Deleted bank {id} ({detached} entries detached)");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown bank command: {other}"),
    }
}

// ── Entries ───────────────────────────────────────────────────

fn cli_entry(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pos = positionals(args);
    match pos.first().copied() {
        Some("add") => entry_add(&pos, args, db),
        Some("edit") => entry_edit(&pos, args, db),
        Some("list") | None => entry_list(args, db, config),
        Some("show") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let details = db
                .get_entry_with_details(id)?
                .ok_or_else(|| anyhow::anyhow!("Entry {id} not found"))?;
            print_entry_details(&details);
            Ok(())
        }
        Some("rm") => {
            let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let entry = db
                .get_entry(id)?
                .ok_or_else(|| anyhow::anyhow!("Entry {id} not found"))?;
            db.delete_entry(id)?;
            println!("Deleted entry {id}: {}", entry.title);
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown entry command: {other}"),
    }
}

fn entry_add(pos: &[&str], args: &[String], db: &mut Database) -> Result<()> {
    let (Some(title), Some(amount)) = (pos.get(1), pos.get(2)) else {
        anyhow::bail!("Usage: handbook entry add <title> <amount> --category <id>");
    };
    let amount = parse_amount(amount)?;
    let category_id = flag(args, "--category")
        .map(|raw| resolve_category(db, raw))
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("--category <id|name> is required"))?;

    let transaction_type = match flag(args, "--type") {
        Some(raw) => parse_transaction_type(raw)?,
        None => db
            .get_category_by_id(category_id)?
            .and_then(|c| c.transaction_type)
            .unwrap_or(TransactionType::Expense),
    };
    let entry_type = match flag(args, "--mode") {
        Some(raw) => parse_entry_type(raw)?,
        None => EntryType::Cash,
    };

    let mut entry = AccountEntry::new(
        (*title).to_string(),
        amount,
        entry_type,
        transaction_type,
        category_id,
    );
    if let Some(raw) = flag(args, "--date") {
        entry.transaction_date = date_to_millis(parse_date(raw)?);
    }
    entry.party_id = opt_id(args, "--party")?;
    entry.bank_id = opt_id(args, "--bank")?;
    entry.description = flag(args, "--note").map(str::to_string);

    let id = db.insert_entry(&entry)?;
    println!("Added entry {id}: {title} {amount:.2} ({transaction_type})");
    Ok(())
}

fn entry_edit(pos: &[&str], args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(pos.get(1).copied().unwrap_or(""))?;
    let mut entry = db
        .get_entry(id)?
        .ok_or_else(|| anyhow::anyhow!("Entry {id} not found"))?;
    if let Some(title) = flag(args, "--title") {
        entry.title = title.to_string();
    }
    if let Some(raw) = flag(args, "--amount") {
        entry.amount = parse_amount(raw)?;
    }
    if let Some(raw) = flag(args, "--type") {
        entry.transaction_type = parse_transaction_type(raw)?;
    }
    if let Some(raw) = flag(args, "--mode") {
        entry.entry_type = parse_entry_type(raw)?;
    }
    if let Some(raw) = flag(args, "--date") {
        entry.transaction_date = date_to_millis(parse_date(raw)?);
    }
    if let Some(raw) = flag(args, "--category") {
        entry.category_id = resolve_category(db, raw)?;
    }
    if let Some(party) = opt_id(args, "--party")? {
        entry.party_id = (party != 0).then_some(party);
    }
    if let Some(bank) = opt_id(args, "--bank")? {
        entry.bank_id = (bank != 0).then_some(bank);
    }
    if let Some(note) = flag(args, "--note") {
        entry.description = Some(note.to_string());
    }
    db.update_entry(&entry)?;
    println!("Updated entry {id}: {}", entry.title);
    Ok(())
}

fn entry_list(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let mut filter = EntryFilter {
        category_id: opt_id(args, "--category")?,
        party_id: opt_id(args, "--party")?,
        bank_id: opt_id(args, "--bank")?,
        transaction_type: flag(args, "--type").map(parse_transaction_type).transpose()?,
        ..period_filter(period_from_args(args)?)?
    };
    if let Some(q) = flag(args, "--title") {
        filter = filter.with_title(q);
    }
    if let Some(raw) = flag(args, "--sort") {
        filter.sort =
            SortOption::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown sort: {raw}"))?;
    }

    let total = db.count_entries(&filter)?;
    if total == 0 {
        println!("No entries");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<28} {:>13} {:<8} Category",
        "ID", "Date", "Title", "Amount", "Type"
    );
    println!("{}", "─".repeat(80));

    if has_switch(args, "--all") {
        for page in db.entry_pages(filter, config.page_size) {
            page?.items.iter().for_each(print_entry_row);
        }
        return Ok(());
    }

    let page = db.get_entries(&filter, page_request(args, config)?)?;
    page.items.iter().for_each(print_entry_row);
    println!(
        "Showing {}-{} of {total}",
        page.offset + 1,
        page.offset as usize + page.items.len()
    );
    print_more_hint(page.next_offset(), page.limit);
    Ok(())
}

fn print_entry_row(d: &AccountEntryWithDetails) {
    let e = &d.entry;
    let sign = if e.is_income() {
        "+"
    } else if e.is_expense() {
        "-"
    } else {
        " "
    };
    println!(
        "{:<6} {:<10} {:<28} {sign}{:>12.2} {:<8} {}",
        e.id.unwrap_or(0),
        format_date(e.transaction_date),
        truncate(&e.title, 28),
        e.amount,
        e.transaction_type.as_str(),
        d.category.name,
    );
}

fn print_entry_details(d: &AccountEntryWithDetails) {
    let e = &d.entry;
    println!("Entry {}: {}", e.id.unwrap_or(0), e.title);
    println!("{}", "─".repeat(40));
    println!("  Date:        {}", format_date(e.transaction_date));
    println!("  Amount:      {:.2}", e.amount);
    println!("  Type:        {} / {}", e.transaction_type, e.entry_type);
    println!("  Category:    {}", d.category.name);
    if let Some(p) = &d.party {
        println!("  Party:       {}", p.name);
    }
    if let Some(b) = &d.bank {
        println!("  Bank:        {}", b.name);
    }
    if let Some(desc) = &e.description {
        println!("  Description: {desc}");
    }
    for a in &d.attachments {
        println!(
            "  Attachment:  [{}] {}{}",
            a.id.unwrap_or(0),
            a.file_name.as_deref().unwrap_or(&a.file_path),
            if a.is_image() { " (image)" } else { "" }
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ── Attachments ───────────────────────────────────────────────

fn cli_attach(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    match pos.first().copied() {
        Some("add") => {
            let entry_id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let files = pos.get(2..).unwrap_or_default();
            if files.is_empty() {
                anyhow::bail!("Usage: handbook attach add <entry-id> <file>...");
            }
            let uploaded = now_millis();
            let attachments: Vec<Attachment> = files
                .iter()
                .map(|f| Attachment {
                    uploaded_at: Some(uploaded),
                    ..Attachment::new(entry_id, shellexpand(f))
                })
                .collect();
            if let [single] = attachments.as_slice() {
                let id = db.insert_attachment(single)?;
                println!("Attached {} to entry {entry_id} as {id}", single.file_path);
                return Ok(());
            }
            let ids = db.upsert_attachments(&attachments)?;
            println!("Attached {} file(s) to entry {entry_id}", ids.len());
            Ok(())
        }
        Some("list") => {
            let entry_id = parse_id(pos.get(1).copied().unwrap_or(""))?;
            let attachments = db.get_attachments_for_entry(entry_id)?;
            if attachments.is_empty() {
                println!("No attachments");
                return Ok(());
            }
            for a in &attachments {
                println!(
                    "{:<6} {:<12} {}",
                    a.id.unwrap_or(0),
                    a.mime_type.as_deref().unwrap_or("-"),
                    a.file_path
                );
            }
            Ok(())
        }
        Some("rm") => {
            let ids = pos
                .get(1..)
                .unwrap_or_default()
                .iter()
                .map(|raw| parse_id(raw))
                .collect::<Result<Vec<_>>>()?;
            if let [id] = ids.as_slice() {
                let attachment = db
                    .get_attachment(*id)?
                    .ok_or_else(|| anyhow::anyhow!("Attachment {id} not found"))?;
                db.delete_attachment(*id)?;
                println!("Removed {}", attachment.file_path);
                return Ok(());
            }
            let removed = db.delete_attachments(&ids)?;
            println!("Removed {removed} of {} attachment(s)", ids.len());
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown attach command: {other}"),
        None => anyhow::bail!("Usage: handbook attach add|list|rm"),
    }
}

// ── Search / summary / periods ────────────────────────────────

fn cli_search(args: &[String], db: &mut Database) -> Result<()> {
    let text = args.join(" ");
    let hits = db.search_entries(&text)?;
    if hits.is_empty() {
        println!("No matches");
        return Ok(());
    }
    for hit in &hits {
        let e = &hit.entry;
        println!(
            "{:<6} {:<10} {:<28} {:>12.2} {}",
            e.id.unwrap_or(0),
            format_date(e.transaction_date),
            truncate(&e.title, 28),
            e.amount,
            hit.category_name,
        );
    }
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let period = period_from_args(args)?.unwrap_or_else(Period::current_month);
    let filter = EntryFilter {
        category_ids: flag(args, "--category").map(parse_ids).transpose()?.unwrap_or_default(),
        party_ids: flag(args, "--party").map(parse_ids).transpose()?.unwrap_or_default(),
        bank_ids: flag(args, "--bank").map(parse_ids).transpose()?.unwrap_or_default(),
        ..period_filter(Some(period))?
    };

    let summary = db.filtered_summary(&filter)?;
    let label = match period {
        Period::Today => "Today".to_string(),
        Period::ThisWeek => "This week".to_string(),
        Period::Month(ym) => ym.to_string(),
        Period::Year(y) => y.to_string(),
        Period::Custom { start, end } => format!("{start} to {end}"),
    };

    println!("Handbook — {label}");
    println!("{}", "─".repeat(40));
    println!("  Income:     {:.2}", summary.totals.income);
    println!("  Expenses:   {:.2}", summary.totals.expenses);
    println!("  Balance:    {:.2}", summary.totals.balance);
    println!("  Entries:    {}", summary.entries.len());
    Ok(())
}

fn cli_periods(db: &mut Database) -> Result<()> {
    let years = db.distinct_years()?;
    if years.is_empty() {
        println!("No entries yet");
        return Ok(());
    }
    let months = db.distinct_year_months()?;
    for year in years {
        let in_year: Vec<String> = months
            .iter()
            .filter(|m| m.year == year)
            .map(|m| format!("{:02}", m.month))
            .collect();
        println!("{year}: {}", in_year.join(" "));
    }
    Ok(())
}

// ── Export / backup ───────────────────────────────────────────

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let period = period_from_args(args)?.unwrap_or_else(Period::current_month);
    let filter = period_filter(Some(period))?;

    let output_path = positionals(args)
        .first()
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| default_export_path(&period));

    let count = crate::export::export_entries_csv(db, &filter, &output_path)?;
    if count == 0 {
        println!("No entries in the selected period");
    } else {
        println!("Exported {count} entries to {}", output_path.display());
    }
    Ok(())
}

fn default_export_path(period: &Period) -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    let tag = match period {
        Period::Month(ym) => ym.to_string(),
        Period::Year(y) => y.to_string(),
        _ => chrono::Utc::now().format("%Y-%m-%d").to_string(),
    };
    Path::new(&home).join(format!("handbook-export-{tag}.csv"))
}

fn cli_backup(args: &[String], db: &mut Database) -> Result<()> {
    let target = positionals(args)
        .first()
        .map(|a| PathBuf::from(shellexpand(a)))
        .ok_or_else(|| anyhow::anyhow!("Usage: handbook backup <path>"))?;
    db.backup_to(&target)?;
    println!("Backed up to {}", target.display());
    Ok(())
}

fn cli_restore(args: &[String], db: &mut Database) -> Result<()> {
    let source = positionals(args)
        .first()
        .map(|a| PathBuf::from(shellexpand(a)))
        .ok_or_else(|| anyhow::anyhow!("Usage: handbook restore <path>"))?;
    db.restore_from(&source)?;
    let entries = db.count_entries(&EntryFilter::default())?;
    println!("Restored {} ({entries} entries)", source.display());
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positionals_skip_flag_values() {
        let a = args(&["add", "Lunch", "--category", "3", "12.50", "--today"]);
        assert_eq!(positionals(&a), vec!["add", "Lunch", "12.50"]);
        assert_eq!(flag(&a, "--category"), Some("3"));
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert!(parse_ids("1,x").is_err());
        assert!(parse_ids("").unwrap().is_empty());
    }

    #[test]
    fn test_period_flags() {
        assert_eq!(
            period_from_args(&args(&["--month", "2024-02"])).unwrap(),
            Some(Period::Month(YearMonth::new(2024, 2).unwrap()))
        );
        assert_eq!(
            period_from_args(&args(&["--week"])).unwrap(),
            Some(Period::ThisWeek)
        );
        assert_eq!(period_from_args(&args(&[])).unwrap(), None);
        assert!(period_from_args(&args(&["--from", "2024-01-01"])).is_err());
        assert!(period_from_args(&args(&["--month", "Feb"])).is_err());
    }

    #[test]
    fn test_page_request_from_flag() {
        let config = Config {
            db_path: PathBuf::from("/tmp/x.db"),
            page_size: 10,
        };
        let p = page_request(&args(&["--page", "3"]), &config).unwrap();
        assert_eq!((p.offset, p.limit), (20, 10));
        assert!(page_request(&args(&["--page", "0"]), &config).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_cli_roundtrip_on_memory_db() {
        let mut db = Database::open_in_memory().unwrap();
        let config = Config {
            db_path: PathBuf::from(":memory:"),
            page_size: 20,
        };
        let run = |db: &mut Database, a: &[&str]| {
            let mut full = vec!["handbook".to_string()];
            full.extend(args(a));
            as_cli(&full, db, &config)
        };

        run(&mut db, &["category", "add", "Salary", "--type", "income"]).unwrap();
        run(&mut db, &["entry", "add", "March pay", "1000", "--category", "1", "--date", "2024-03-01"])
            .unwrap();
        let stored = db.get_entry(1).unwrap().unwrap();
        assert_eq!(stored.transaction_type, TransactionType::Income);

        let err = run(&mut db, &["category", "rm", "1"]).unwrap_err();
        let ledger = err.downcast_ref::<crate::error::LedgerError>().unwrap();
        assert!(ledger.is_rejection());

        assert!(run(&mut db, &["bogus"]).is_err());
    }

    #[test]
    fn test_resolve_category_by_name_or_id() {
        let db = Database::open_in_memory().unwrap();
        let rent = db.insert_category(&Category::new("Rent".into())).unwrap();
        let year = db.insert_category(&Category::new("2024".into())).unwrap();
        for i in 0..120 {
            db.insert_category(&Category::new(format!("Rent extra {i}")))
                .unwrap();
        }

        assert_eq!(resolve_category(&db, "rent").unwrap(), rent);
        assert_eq!(resolve_category(&db, " RENT ").unwrap(), rent);
        assert_eq!(resolve_category(&db, "2024").unwrap(), year);
        assert_eq!(resolve_category(&db, &year.to_string()).unwrap(), year);
        assert!(resolve_category(&db, "Groceries").is_err());
    }

    #[test]
    fn test_cli_backup_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open(&dir.path().join("live.db")).unwrap();
        let config = Config {
            db_path: dir.path().join("live.db"),
            page_size: 20,
        };
        let run = |db: &mut Database, a: &[String]| {
            let mut full = vec!["handbook".to_string()];
            full.extend_from_slice(a);
            as_cli(&full, db, &config)
        };
        let backup = dir.path().join("snap.db").display().to_string();

        run(&mut db, &args(&["category", "add", "Food"])).unwrap();
        run(&mut db, &args(&["entry", "add", "Lunch", "12", "--category", "Food"])).unwrap();
        run(&mut db, &args(&["backup", &backup])).unwrap();
        run(&mut db, &args(&["entry", "rm", "1"])).unwrap();
        assert_eq!(db.count_entries(&EntryFilter::default()).unwrap(), 0);

        run(&mut db, &args(&["restore", &backup])).unwrap();
        assert_eq!(db.count_entries(&EntryFilter::default()).unwrap(), 1);

        let err = run(&mut db, &args(&["restore", "/nonexistent/snap.db"])).unwrap_err();
        let ledger = err.downcast_ref::<crate::error::LedgerError>().unwrap();
        assert!(ledger.is_rejection());
    }
}
