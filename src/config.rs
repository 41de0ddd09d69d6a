use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::models::PageRequest;

pub(crate) const DB_ENV: &str = "HANDBOOK_DB";
pub(crate) const PAGE_SIZE_ENV: &str = "HANDBOOK_PAGE_SIZE";

/// Runtime settings, resolved from the environment with platform defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) page_size: u32,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::resolve(std::env::var(DB_ENV).ok(), std::env::var(PAGE_SIZE_ENV).ok())
    }

    fn resolve(db_path: Option<String>, page_size: Option<String>) -> Result<Self> {
        let db_path = match db_path.filter(|p| !p.trim().is_empty()) {
            Some(p) => PathBuf::from(crate::run::shellexpand(p.trim())),
            None => default_db_path()?,
        };
        let page_size = match page_size {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("{PAGE_SIZE_ENV} must be a positive number, got '{raw}'"))?,
            None => PageRequest::DEFAULT_LIMIT,
        };
        log::debug!("database at {}, page size {page_size}", db_path.display());
        Ok(Self { db_path, page_size })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "handbook", "Handbook")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("handbook.db"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_explicit_db_path_wins() {
        let cfg = Config::resolve(Some("/tmp/ledger.db".into()), None).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(cfg.page_size, PageRequest::DEFAULT_LIMIT);
    }

    #[test]
    fn test_page_size_parsed() {
        let cfg = Config::resolve(Some("/tmp/x.db".into()), Some(" 50 ".into())).unwrap();
        assert_eq!(cfg.page_size, 50);
    }

    #[test]
    fn test_bad_page_size_rejected() {
        assert!(Config::resolve(Some("/tmp/x.db".into()), Some("0".into())).is_err());
        assert!(Config::resolve(Some("/tmp/x.db".into()), Some("lots".into())).is_err());
    }
}
