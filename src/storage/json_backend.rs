use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    book::{Book, CURRENT_SCHEMA_VERSION},
    errors::LedgerError,
    utils::{ensure_dir, write_atomic, PathResolver},
};

use super::{Result, StorageBackend};

const BOOK_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const DEFAULT_RETENTION: usize = 5;

#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let books_dir = PathResolver::books_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&books_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            books_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn write_backup_file(&self, book: &Book, name: &str, note: Option<&str>) -> Result<()> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let mut file_stem = format!("{}_{}", canonical_name(name), backup_timestamp());
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = unique_backup_path(&dir, &file_stem);
        let json = serde_json::to_string_pretty(book)?;
        write_atomic(&path, &json)?;
        info!(book = name, path = %path.display(), "backup written");
        self.prune_backups(name)
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let file_stem = format!("{}_{}", canonical_name(name), backup_timestamp());
        let target = unique_backup_path(&dir, &file_stem);
        fs::copy(path, &target)?;
        debug!(book = name, path = %target.display(), "previous version kept");
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.iter().skip(self.retention) {
            debug!(backup = %entry, "pruning backup");
            if let Err(err) = fs::remove_file(self.backup_path(name, entry)) {
                warn!(backup = %entry, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, book: &Book, name: &str) -> Result<()> {
        let path = self.book_path(name);
        self.backup_existing_file(name, &path)?;
        save_book_to_path(book, &path)?;
        debug!(book = name, path = %path.display(), "book saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Book> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(LedgerError::Persistence(format!(
                "book `{}` not found; run `init` first",
                name
            )));
        }
        load_book_from_path(&path)
    }

    fn exists(&self, name: &str) -> bool {
        self.book_path(name).exists()
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn backup(&self, book: &Book, name: &str, note: Option<&str>) -> Result<()> {
        self.write_backup_file(book, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Book> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(LedgerError::Persistence(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let book = load_book_from_path(&backup_path)?;
        save_book_to_path(&book, &self.book_path(name))?;
        info!(book = name, backup = backup_name, "book restored");
        Ok(book)
    }
}

pub fn save_book_to_path(book: &Book, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(book)?;
    write_atomic(path, &json)
}

pub fn load_book_from_path(path: &Path) -> Result<Book> {
    let data = fs::read_to_string(path)?;
    let book: Book = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Persistence(format!(
            "`{}` was written by a newer schema version ({})",
            path.display(),
            book.schema_version
        )));
    }
    Ok(book)
}

fn backup_timestamp() -> String {
    Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

/// `{stem}.json`, or `{stem}_NN.json` when a backup from the same minute already
/// holds that name. The numbered names sort after the plain one.
fn unique_backup_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{}.{}", stem, BOOK_EXTENSION));
    if !first.exists() {
        return first;
    }
    (2..)
        .map(|n: u32| dir.join(format!("{}_{:02}.{}", stem, n, BOOK_EXTENSION)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "book".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.')) && !sanitized.is_empty() && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extracts the `YYYYMMDD_HHMM` stamp that follows the canonical book name.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BOOK_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).find_map(|pair| {
        if !is_digits(pair[0], 8) || !is_digits(pair[1], 4) {
            return None;
        }
        let raw = format!("{}{}", pair[0], pair[1]);
        NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
