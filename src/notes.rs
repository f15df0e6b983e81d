use crate::storage::LocalStore;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::{Duration, Instant};

/// Local-store key holding the serialized pages.
pub const STORAGE_KEY: &str = "padboard-data";
pub const PAGE_PLACEHOLDER: &str = "Start typing your notes here...";

/// One persisted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub content: String,
    pub page_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Markup produced by the host's rich-text editor.
    pub content: String,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            content: PAGE_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesError {
    LastPage,
    NoSuchPage(usize),
}

impl std::fmt::Display for NotesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotesError::LastPage => write!(f, "Cannot remove the last page!"),
            NotesError::NoSuchPage(n) => write!(f, "Page {n} does not exist"),
        }
    }
}

impl std::error::Error for NotesError {}

/// Ordered pages. Page numbers are positions, so they are always `1..=len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    pages: Vec<Page>,
}

impl Default for Notebook {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }
}

impl Notebook {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page_mut(&mut self, number: usize) -> Option<&mut Page> {
        let idx = number.checked_sub(1)?;
        self.pages.get_mut(idx)
    }

    /// Append a blank page and return its number.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        tracing::debug!(pages = self.pages.len(), "page added");
        self.pages.len()
    }

    /// Remove page `number`; later pages are renumbered.
    pub fn remove_page(&mut self, number: usize) -> Result<(), NotesError> {
        if self.pages.len() <= 1 {
            return Err(NotesError::LastPage);
        }
        if number == 0 || number > self.pages.len() {
            return Err(NotesError::NoSuchPage(number));
        }
        self.pages.remove(number - 1);
        tracing::debug!(number, pages = self.pages.len(), "page removed");
        Ok(())
    }

    pub fn records(&self) -> Vec<PageRecord> {
        self.pages
            .iter()
            .enumerate()
            .map(|(i, page)| PageRecord {
                content: page.content.clone(),
                page_number: i + 1,
            })
            .collect()
    }

    /// Build a notebook from stored records. Records are taken in order;
    /// stored page numbers are not trusted. `None` when there are no pages.
    pub fn from_records(records: Vec<PageRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        Some(Self {
            pages: records
                .into_iter()
                .map(|r| Page { content: r.content })
                .collect(),
        })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.records())?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Option<Self>> {
        let records: Vec<PageRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Read the notebook from the store. Missing, empty or malformed data
    /// yields the default single page.
    pub fn load(store: &LocalStore) -> Self {
        let Some(raw) = store.get(STORAGE_KEY) else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(Some(notebook)) => {
                tracing::info!(pages = notebook.len(), "notes loaded");
                notebook
            }
            Ok(None) => {
                tracing::warn!("stored notes contain no pages; starting fresh");
                Self::default()
            }
            Err(e) => {
                tracing::error!("error loading notes: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut LocalStore) -> anyhow::Result<()> {
        store.set(STORAGE_KEY, self.to_json()?)?;
        tracing::debug!(pages = self.pages.len(), "notes saved");
        Ok(())
    }

    /// `Page N: text` blocks for every page with visible text.
    pub fn numbered_text(&self) -> String {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            let text = plain_text(&page.content);
            if !text.is_empty() {
                out.push_str(&format!("Page {}: {}\n\n", i + 1, text));
            }
        }
        out
    }
}

static BLOCK_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</(div|p|li|h[1-6])>").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static STRONG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(b|strong)(\s[^>]*)?>").expect("valid regex"));
static EM_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(i|em)(\s[^>]*)?>").expect("valid regex"));
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li(\s[^>]*)?>").expect("valid regex"));
static STRONG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*").expect("valid regex")
});
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("valid regex"));

const BULLET: &str = "- ";

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Visible text of a page, trimmed. Tags and emphasis markers are dropped.
pub fn plain_text(markup: &str) -> String {
    let with_breaks = BLOCK_BREAK.replace_all(markup, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    let stripped = STRONG.replace_all(&stripped, "$1");
    let stripped = EMPHASIS.replace_all(&stripped, "$1");
    decode_entities(&stripped).trim().to_string()
}

/// Whether the content still carries HTML tags from a rich-text editor.
pub fn has_markup(content: &str) -> bool {
    TAG.is_match(content)
}

/// Rewrite HTML page content as the markdown the page editor works with.
pub fn to_markdown(markup: &str) -> String {
    let text = STRONG_TAG.replace_all(markup, "**");
    let text = EM_TAG.replace_all(&text, "*");
    let text = LIST_ITEM.replace_all(&text, BULLET);
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    decode_entities(&text).trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Bullet,
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

/// Apply `format` to the character range `selection` and return the range
/// covering the same text afterwards.
pub fn apply_format(text: &mut String, selection: Range<usize>, format: Format) -> Range<usize> {
    let start = selection.start.min(selection.end);
    let end = selection.start.max(selection.end);
    let (a, b) = (byte_index(text, start), byte_index(text, end));
    match format {
        Format::Bold | Format::Italic => {
            let marker = if format == Format::Bold { "**" } else { "*" };
            text.insert_str(b, marker);
            text.insert_str(a, marker);
            start + marker.len()..end + marker.len()
        }
        Format::Bullet => {
            let first = text[..a].rfind('\n').map_or(0, |i| i + 1);
            let mut lines = vec![first];
            lines.extend(text[first..b].match_indices('\n').map(|(i, _)| first + i + 1));
            let mut added = 0;
            let mut first_added = false;
            for &pos in lines.iter().rev() {
                if !text[pos..].starts_with(BULLET) {
                    text.insert_str(pos, BULLET);
                    added += 1;
                    first_added = pos == first;
                }
            }
            let shift = if first_added { BULLET.len() } else { 0 };
            start + shift..end + added * BULLET.len()
        }
    }
}

/// Fires once per interval when polled from the UI loop.
#[derive(Debug, Clone)]
pub struct AutoSave {
    interval: Duration,
    last: Instant,
}

impl AutoSave {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last: now }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` and restarts the timer when a save is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Restart the timer after an on-demand save.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}
