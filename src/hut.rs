//! HID Usage Table (HUT) name database.
//!
//! Usage names live in plain-text files, one file per usage page, with a
//! `.hut` suffix. The grammar is line-oriented:
//!
//! ```text
//! (1)<TAB>Generic Desktop
//! 30<TAB>X
//! 31<TAB>Y
//! ```
//!
//! The parenthesized header gives the page number in decimal and the page
//! name; every following line maps a hex usage ID to its name. Blank lines
//! are ignored, names containing "reserved" are skipped, and range entries
//! (`30-37<TAB>…`) are logged and skipped; the tables only carry concrete
//! IDs.
//!
//! Lookups are by 16-bit page or by the combined 32-bit usage
//! (`page << 16 | id`). A missing page or usage is `None`; callers render
//! the hex code instead.
//!
//! # Sharing
//! [`UsageTables::global`] is the process-wide instance, loaded once from
//! the bundled [`default_dir`] on first use. Loading is fallible only
//! through [`UsageTables::load_default`]; the global falls back to empty
//! tables (and logs the error) so decoding never blocks on name data.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::{Error, Result};

/// Name lookups needed by the report decoder and the pretty-printer.
///
/// [`UsageTables`] is the real implementation; tests and name-less callers
/// can pass an empty `UsageTables::default()` and get plain hex rendering.
pub trait UsageLookup {
    /// Name of a usage page, e.g. `1` → `"Generic Desktop"`.
    fn page_name(&self, page: u16) -> Option<&str>;

    /// Name of a combined 32-bit usage (`page << 16 | id`).
    fn usage_name(&self, usage: u32) -> Option<&str>;
}

#[derive(Clone, Debug)]
struct PageTable {
    name: String,
    usages: HashMap<u16, String>,
}

/// In-memory usage name database.
#[derive(Clone, Debug, Default)]
pub struct UsageTables {
    pages: HashMap<u16, PageTable>,
}

impl UsageTables {
    /// Empty tables; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one page file and merge it in.
    ///
    /// `origin` is used in diagnostics (usually the file name). Returns the
    /// page number on success.
    pub fn add_page(&mut self, text: &str, origin: &str) -> Result<u16> {
        let mut page: Option<u16> = None;
        let mut table = PageTable {
            name: String::new(),
            usages: HashMap::new(),
        };

        for (idx, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let lineno = idx + 1;
            let malformed = |reason: &str| Error::UsageTable {
                origin: origin.to_string(),
                line: lineno,
                reason: reason.to_string(),
            };

            let (field, name) = line
                .split_once('\t')
                .ok_or_else(|| malformed("expected <id><TAB><name>"))?;

            if let Some(number) = field.strip_prefix('(') {
                let number = number.strip_suffix(')').ok_or_else(|| malformed("unclosed page header"))?;
                let id: u16 = number
                    .parse()
                    .map_err(|_| malformed("page number is not decimal"))?;
                page = Some(id);
                table.name = name.to_string();
                continue;
            }

            if page.is_none() {
                return Err(malformed("usage entry before the (page) header"));
            }
            if name.to_lowercase().contains("reserved") {
                continue;
            }
            if field.contains('-') {
                log::warn!("{origin}:{lineno}: skipping usage range entry {line:?}");
                continue;
            }
            let id = u16::from_str_radix(field, 16)
                .map_err(|_| malformed("usage id is not hexadecimal"))?;
            table.usages.insert(id, name.to_string());
        }

        let page = page.ok_or_else(|| Error::UsageTable {
            origin: origin.to_string(),
            line: 0,
            reason: "no (page) header line".to_string(),
        })?;
        self.pages.insert(page, table);
        Ok(page)
    }

    /// Load every `*.hut` file in a directory.
    ///
    /// Files are read in sorted order so that duplicate page numbers resolve
    /// deterministically (last file wins).
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "hut"))
            .collect();
        paths.sort();

        let mut tables = UsageTables::new();
        for path in paths {
            let text = fs::read_to_string(&path)?;
            tables.add_page(&text, &path.display().to_string())?;
        }
        Ok(tables)
    }

    /// Load the tables bundled with the crate.
    pub fn load_default() -> Result<Self> {
        Self::load_dir(default_dir())
    }

    /// Process-wide tables, loaded on first use.
    ///
    /// A load failure is logged and yields empty tables rather than an
    /// error; use [`load_default`](Self::load_default) to observe the
    /// failure instead.
    pub fn global() -> &'static UsageTables {
        static TABLES: OnceLock<UsageTables> = OnceLock::new();
        TABLES.get_or_init(|| match Self::load_default() {
            Ok(tables) => tables,
            Err(e) => {
                log::error!("failed to load usage tables: {e}");
                UsageTables::default()
            }
        })
    }

    /// Number of loaded pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl UsageLookup for UsageTables {
    fn page_name(&self, page: u16) -> Option<&str> {
        self.pages.get(&page).map(|p| p.name.as_str())
    }

    fn usage_name(&self, usage: u32) -> Option<&str> {
        let page = (usage >> 16) as u16;
        let id = usage as u16;
        self.pages
            .get(&page)
            .and_then(|p| p.usages.get(&id))
            .map(|s| s.as_str())
    }
}

/// Directory holding the bundled `.hut` files.
pub fn default_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/hut"))
}
