//! # Catalog Module
//!
//! This module loads the item → description catalog that feeds the dependent
//! dropdowns of the intake modal.
//!
//! ## Sources
//!
//! Sources are tried in priority order and the first one that exists and
//! yields at least one item wins:
//!
//! 1. a structured JSON file (`{"Stickers": ["Die Cut", "Sheet"]}`)
//! 2. a spreadsheet (first sheet, header row first)
//! 3. a delimited file with a header row
//! 4. the built-in default catalog
//!
//! ## Normalization
//!
//! Every source goes through the same policy: descriptions keep their source
//! order, later exact duplicates within an item are dropped, and the
//! [`CUSTOM_SENTINEL`] ends every list exactly once.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info, warn};
use regex::Regex;

use crate::config::CatalogSources;
use crate::errors::CatalogError;

/// Reserved description meaning "the user types their own description"
pub const CUSTOM_SENTINEL: &str = "Custom";

static ITEM_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)item").expect("item header pattern should be valid"));
static DESCRIPTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)desc").expect("description header pattern should be valid"));

/// Immutable mapping from item name to its ordered description list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Build a normalized catalog from `(item, descriptions)` pairs
    ///
    /// Repeated items are merged in encounter order. Blank names and blank
    /// descriptions are skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use project_intake::catalog::Catalog;
    ///
    /// let catalog = Catalog::from_entries([("Stickers", vec!["Die Cut"])]);
    /// assert_eq!(
    ///     catalog.descriptions_for("Stickers").unwrap(),
    ///     &["Die Cut".to_string(), "Custom".to_string()]
    /// );
    /// ```
    pub fn from_entries<I, K, D, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = CatalogBuilder::default();
        for (item, descriptions) in entries {
            builder.add_item(item.as_ref());
            for description in descriptions {
                builder.push(item.as_ref(), description.as_ref());
            }
        }
        builder.build()
    }

    /// The catalog used when no source file is available
    pub fn default_catalog() -> Self {
        Self::from_entries([
            ("Stickers", vec!["Kiss Cut", "Die Cut", "Sheet", "Roll"]),
            (
                "Business Cards",
                vec!["Matte", "Glossy", "Soft Touch", "Rounded Corners"],
            ),
        ])
    }

    /// Item names in lexicographic order
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Descriptions for `item`, always ending with [`CUSTOM_SENTINEL`]
    pub fn descriptions_for(&self, item: &str) -> Option<&[String]> {
        self.items.get(item).map(Vec::as_slice)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Accumulates raw rows before normalization
#[derive(Debug, Default)]
struct CatalogBuilder {
    raw: BTreeMap<String, Vec<String>>,
}

impl CatalogBuilder {
    fn add_item(&mut self, item: &str) {
        let item = item.trim();
        if !item.is_empty() {
            self.raw.entry(item.to_string()).or_default();
        }
    }

    fn push(&mut self, item: &str, description: &str) {
        let (item, description) = (item.trim(), description.trim());
        if item.is_empty() || description.is_empty() {
            return;
        }
        self.raw
            .entry(item.to_string())
            .or_default()
            .push(description.to_string());
    }

    fn build(self) -> Catalog {
        let items = self
            .raw
            .into_iter()
            .map(|(item, descriptions)| {
                let normalized = normalize_descriptions(&item, descriptions);
                (item, normalized)
            })
            .collect();
        Catalog { items }
    }
}

fn normalize_descriptions(item: &str, raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(raw.len() + 1);

    for description in raw {
        if description == CUSTOM_SENTINEL {
            continue;
        }
        if !seen.insert(description.clone()) {
            debug!("Dropping duplicate description '{description}' for item '{item}'");
            continue;
        }
        normalized.push(description);
    }

    normalized.push(CUSTOM_SENTINEL.to_string());
    normalized
}

/// Load the catalog from the first usable source
///
/// Never fails: missing or malformed sources are logged and skipped, and the
/// built-in catalog is returned when nothing else works.
pub fn load(sources: &CatalogSources) -> Catalog {
    type Loader = fn(&Path) -> Result<Catalog, CatalogError>;

    let attempts: [(&Path, &str, Loader); 3] = [
        (sources.json_path.as_path(), "json", load_json),
        (sources.xlsx_path.as_path(), "spreadsheet", load_spreadsheet),
        (sources.csv_path.as_path(), "csv", load_csv),
    ];

    for (path, kind, loader) in attempts {
        if !path.exists() {
            debug!("Catalog source not found ({kind}): {}", path.display());
            continue;
        }

        match loader(path) {
            Ok(catalog) => {
                info!(
                    "Loaded {} catalog items from {kind} source {}",
                    catalog.len(),
                    path.display()
                );
                return catalog;
            }
            Err(e) => warn!("Skipping catalog source: {e}"),
        }
    }

    warn!("No usable catalog source found, falling back to the built-in catalog");
    Catalog::default_catalog()
}

/// Parse a JSON object of item name → array of descriptions
pub fn load_json(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&content).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    non_empty(Catalog::from_entries(raw), path)
}

/// Parse a delimited file whose first row holds the column headers
pub fn load_csv(path: &Path) -> Result<Catalog, CatalogError> {
    let csv_error = |source: csv::Error| CatalogError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    non_empty(from_rows(&headers, rows), path)
}

/// Read the first sheet of a workbook; the first row holds the headers
pub fn load_spreadsheet(path: &Path) -> Result<Catalog, CatalogError> {
    let spreadsheet_error = |message: String| CatalogError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no sheets".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let body: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    non_empty(from_rows(&headers, body), path)
}

fn cell_text(cell: &Data) -> String {
    cell.to_string()
}

fn non_empty(catalog: Catalog, path: &Path) -> Result<Catalog, CatalogError> {
    if catalog.is_empty() {
        Err(CatalogError::Empty {
            path: path.to_path_buf(),
        })
    } else {
        Ok(catalog)
    }
}

/// Pick the item and description columns from a header row
///
/// The first header containing "item" and the first containing "desc" win,
/// case-insensitively. Otherwise columns 0 and 1 are used.
pub fn detect_columns(headers: &[String]) -> (usize, usize) {
    let item = headers
        .iter()
        .position(|h| ITEM_HEADER.is_match(h))
        .unwrap_or(0);
    let description = headers
        .iter()
        .position(|h| DESCRIPTION_HEADER.is_match(h))
        .unwrap_or(if headers.len() > 1 { 1 } else { 0 });
    (item, description)
}

fn from_rows<R>(headers: &[String], rows: R) -> Catalog
where
    R: IntoIterator<Item = Vec<String>>,
{
    let (item_col, description_col) = detect_columns(headers);
    let mut builder = CatalogBuilder::default();

    for row in rows {
        let item = row.get(item_col).map(String::as_str).unwrap_or("");
        let description = row.get(description_col).map(String::as_str).unwrap_or("");
        builder.push(item, description);
    }

    builder.build()
}
