mod config;
mod db;
mod error;
mod export;
mod models;
mod run;

use anyhow::{Context, Result};

use crate::error::LedgerError;

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        let ledger = err.downcast_ref::<LedgerError>();
        match ledger {
            Some(e) => match e.rejection() {
                Some(rejection) => eprintln!("Not allowed: {rejection}"),
                None => {
                    log::error!("{e:?}");
                    eprintln!("Storage error: {e}. Nothing was changed; please try again.");
                }
            },
            None => eprintln!("Error: {err:#}"),
        }
        let rejected = ledger.is_some_and(LedgerError::is_rejection);
        std::process::exit(if rejected { 2 } else { 1 });
    }
}

fn try_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }

    let config = config::Config::from_env()?;
    let mut db = db::Database::open(&config.db_path)
        .with_context(|| format!("Cannot open ledger at {}", config.db_path.display()))?;
    run::as_cli(&args, &mut db, &config)
}
