//! Contractor directory: the owning store for business partner records.
//!
//! The directory holds the canonical in-memory list and persists it after
//! every mutation. A failed write is logged and the in-memory state stays
//! authoritative; the next successful write catches up.

use std::sync::Arc;

use crate::models::Contractor;
use crate::storage::{keys, KeyValueStore};

/// Header keywords recognized in import files, in the business languages
/// the format has been seen in (English and Polish). Matching is
/// best-effort: a data row whose first cell happens to equal a keyword is
/// misclassified as a header. Pass [`ImportOptions`] with an explicit
/// `skip_first_row` and a rejecting predicate when precision matters.
pub const HEADER_KEYWORDS: &[&str] = &[
    "name",
    "contractor",
    "category",
    "nazwa",
    "kontrahent",
    "kategoria",
    "firma",
    "lp",
];

/// Errors from directory operations.
#[derive(Debug)]
pub enum DirectoryError {
    /// Caller supplied invalid input (empty name, duplicate name, empty
    /// import text). Never retried automatically.
    Validation(String),
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Outcome of a delimited text import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows added to the directory.
    pub imported: usize,
    /// Data rows skipped (empty name or duplicate).
    pub skipped: usize,
}

/// Knobs for delimited text import.
#[derive(Clone, Copy)]
pub struct ImportOptions {
    /// Unconditionally drop the first non-blank line.
    pub skip_first_row: bool,
    /// Predicate deciding whether a parsed row is a header line.
    pub is_header: fn(&[String]) -> bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_first_row: false,
            is_header: default_header_detector,
        }
    }
}

/// Default header predicate: any cell equals a known keyword,
/// case-insensitively.
pub fn default_header_detector(fields: &[String]) -> bool {
    fields.iter().any(|field| {
        let cell = field.trim().trim_end_matches('.').to_lowercase();
        HEADER_KEYWORDS.contains(&cell.as_str())
    })
}

/// The list of known business partners for one device.
pub struct ContractorDirectory {
    store: Arc<dyn KeyValueStore>,
    contractors: Vec<Contractor>,
}

impl ContractorDirectory {
    /// Loads the directory from the store. A missing or unreadable
    /// persisted value starts the directory empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let contractors = match store.get(keys::CONTRACTORS) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!("Corrupt contractor list, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read contractor list: {}", e);
                Vec::new()
            }
        };

        Self { store, contractors }
    }

    /// Adds a contractor. The id is `max(existing ids, 0) + 1`; the name
    /// must be non-empty and unique case-insensitively.
    pub fn add(
        &mut self,
        name: &str,
        category: Option<&str>,
    ) -> Result<Contractor, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::Validation(
                "contractor name must not be empty".to_string(),
            ));
        }
        if self.contractors.iter().any(|c| c.name_matches(name)) {
            return Err(DirectoryError::Validation(format!(
                "contractor '{}' already exists",
                name
            )));
        }

        let id = self.next_id();
        let contractor = Contractor::new(id, name, category);
        self.contractors.push(contractor.clone());
        self.persist();

        Ok(contractor)
    }

    /// Updates a contractor in place. Returns `Ok(false)` when the id is
    /// unknown; an empty name or a name clash with another record is a
    /// validation error either way.
    pub fn update(
        &mut self,
        id: i64,
        name: &str,
        category: &str,
    ) -> Result<bool, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::Validation(
                "contractor name must not be empty".to_string(),
            ));
        }
        if self
            .contractors
            .iter()
            .any(|c| c.id != id && c.name_matches(name))
        {
            return Err(DirectoryError::Validation(format!(
                "contractor '{}' already exists",
                name
            )));
        }

        let Some(contractor) = self.contractors.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        contractor.name = name.to_string();
        contractor.category = if category.trim().is_empty() {
            crate::models::DEFAULT_CATEGORY.to_string()
        } else {
            category.trim().to_string()
        };

        self.persist();
        Ok(true)
    }

    /// Removes a contractor. Removing an unknown id is a no-op returning
    /// `false`.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.contractors.len();
        self.contractors.retain(|c| c.id != id);
        let removed = self.contractors.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Replaces the whole list, e.g. with merge output. The caller is
    /// responsible for the list upholding the id/name invariants.
    pub fn replace_all(&mut self, contractors: Vec<Contractor>) {
        self.contractors = contractors;
        self.persist();
    }

    pub fn get(&self, id: i64) -> Option<&Contractor> {
        self.contractors.iter().find(|c| c.id == id)
    }

    pub fn list(&self) -> &[Contractor] {
        &self.contractors
    }

    pub fn len(&self) -> usize {
        self.contractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contractors.is_empty()
    }

    /// Imports contractors from delimited text with default options.
    pub fn import_delimited(&mut self, text: &str) -> Result<ImportSummary, DirectoryError> {
        self.import_delimited_with(text, ImportOptions::default())
    }

    /// Imports contractors from comma-separated, double-quote-wrapped text.
    ///
    /// Header lines (per the options' predicate) are dropped without being
    /// counted. Data rows with an empty name, and rows whose name already
    /// exists case-insensitively, are counted as skipped. Accepted rows go
    /// through [`Self::add`], so the id and uniqueness invariants hold.
    /// Malformed individual lines never abort the import; only entirely
    /// empty input is an error.
    pub fn import_delimited_with(
        &mut self,
        text: &str,
        options: ImportOptions,
    ) -> Result<ImportSummary, DirectoryError> {
        if text.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "import text is empty".to_string(),
            ));
        }

        let mut imported = 0;
        let mut skipped = 0;
        let mut first_row_pending = options.skip_first_row;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if first_row_pending {
                first_row_pending = false;
                continue;
            }

            let fields = parse_delimited_line(line);
            if (options.is_header)(&fields) {
                continue;
            }

            let name = fields.first().map(|f| f.trim()).unwrap_or_default();
            if name.is_empty() {
                skipped += 1;
                continue;
            }

            let category = fields.get(1).map(|f| f.trim()).filter(|c| !c.is_empty());
            match self.add(name, category) {
                Ok(_) => imported += 1,
                Err(DirectoryError::Validation(_)) => skipped += 1,
            }
        }

        Ok(ImportSummary { imported, skipped })
    }

    /// Exports the directory as delimited text: a header row followed by
    /// one quoted row per contractor. The inverse of
    /// [`Self::import_delimited`] up to id assignment.
    pub fn export_delimited(&self) -> String {
        let mut out = String::from("\"Name\",\"Category\"\n");
        for contractor in &self.contractors {
            out.push_str(&format!(
                "{},{}\n",
                quote_field(&contractor.name),
                quote_field(&contractor.category)
            ));
        }
        out
    }

    fn next_id(&self) -> i64 {
        self.contractors.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.contractors) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize contractor list: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(keys::CONTRACTORS, &json) {
            tracing::warn!("Failed to persist contractor list: {}", e);
        }
    }
}

/// Splits one line of delimited text into fields.
///
/// A double quote toggles quote state; commas split fields only outside
/// quotes. A doubled quote inside a quoted field yields one literal quote.
/// There is no backslash escaping.
pub fn parse_delimited_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Wraps a free-text field in double quotes, doubling embedded quotes.
fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
