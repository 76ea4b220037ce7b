//! QueryEngine: search, sort and pagination over the loaded roster
//!
//! The engine is the only mutable state of the running application. It owns
//! the normalized collection and the query inputs; filtered, sorted and paged
//! views are derived on demand and memoized until one of their inputs
//! changes. The collection itself is never reordered or mutated by queries.
//!
//! Search text is debounced: [`QueryEngine::set_search_text`] only updates the
//! visible text and hands out a [`DebounceTicket`]. The ticket is applied once
//! the input has been quiet for the debounce delay (see [`session`]); a ticket
//! issued before a newer call is stale and applying it is a no-op.

pub mod session;

use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::events::{EventBus, RosterEvent};
use crate::model::{DisplayRecord, SortField};
use crate::{Error, Result};

/// Default number of profiles per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::InvalidInput(format!("Unknown sort direction: {}", other))),
        }
    }
}

/// Pending debounced search value
///
/// Only the ticket from the most recent [`QueryEngine::set_search_text`] call
/// can be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
    text: String,
}

impl DebounceTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Position of the current page within the sorted results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based index of the first record on the page, 0 when there are no results
    pub start: usize,
    /// 1-based index of the last record on the page
    pub end: usize,
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

/// Owned copy of the query state and the current page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySnapshot {
    pub search_text: String,
    pub debounced_search_text: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub page_size: usize,
    pub pagination: PageInfo,
    pub items: Vec<DisplayRecord>,
}

/// Search, sort and pagination state over a roster
pub struct QueryEngine {
    records: Vec<DisplayRecord>,
    search_text: String,
    debounced_search_text: String,
    sort_field: SortField,
    sort_direction: SortDirection,
    current_page: usize,
    page_size: usize,
    generation: u64,
    filtered_cache: OnceCell<Vec<usize>>,
    sorted_cache: OnceCell<Vec<usize>>,
    events: Option<EventBus>,
}

impl QueryEngine {
    /// Create an engine over `records` with default settings
    pub fn new(records: Vec<DisplayRecord>) -> Self {
        Self {
            records,
            search_text: String::new(),
            debounced_search_text: String::new(),
            sort_field: SortField::FullName,
            sort_direction: SortDirection::Asc,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            generation: 0,
            filtered_cache: OnceCell::new(),
            sorted_cache: OnceCell::new(),
            events: None,
        }
    }

    /// Set the page size (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Publish state changes on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn debounced_search_text(&self) -> &str {
        &self.debounced_search_text
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Replace the collection after a (re)load
    ///
    /// Query inputs are kept; the current page is clamped to the new range.
    pub fn set_records(&mut self, records: Vec<DisplayRecord>) {
        self.records = records;
        self.invalidate_filter();
        let total_pages = self.total_pages();
        if self.current_page > total_pages {
            self.move_to_page(total_pages);
        }
    }

    /// Update the visible search text and schedule its debounced value
    ///
    /// Any ticket handed out earlier becomes stale.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> DebounceTicket {
        self.search_text = text.into();
        self.generation += 1;
        self.emit(RosterEvent::SearchTextChanged {
            text: self.search_text.clone(),
            timestamp: chrono::Utc::now(),
        });
        DebounceTicket {
            generation: self.generation,
            text: self.search_text.clone(),
        }
    }

    /// Apply a debounced search value; stale tickets are ignored
    ///
    /// Applying a ticket returns to the first page. Returns whether the
    /// ticket was current.
    pub fn apply_debounced(&mut self, ticket: DebounceTicket) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Ignoring superseded search ticket"
            );
            return false;
        }

        if ticket.text != self.debounced_search_text {
            self.debounced_search_text = ticket.text;
            self.invalidate_filter();
            self.emit(RosterEvent::DebouncedSearchChanged {
                query: self.debounced_search_text.clone(),
                timestamp: chrono::Utc::now(),
            });
        }
        self.move_to_page(1);
        true
    }

    /// Clear visible and debounced search text at once
    pub fn clear_search(&mut self) {
        self.generation += 1;
        if !self.search_text.is_empty() {
            self.search_text.clear();
            self.emit(RosterEvent::SearchTextChanged {
                text: String::new(),
                timestamp: chrono::Utc::now(),
            });
        }
        if !self.debounced_search_text.is_empty() {
            self.debounced_search_text.clear();
            self.invalidate_filter();
            self.emit(RosterEvent::DebouncedSearchChanged {
                query: String::new(),
                timestamp: chrono::Utc::now(),
            });
        }
        self.move_to_page(1);
    }

    /// Replace sort key and direction together
    pub fn set_sorting(&mut self, field: SortField, direction: SortDirection) {
        if field == self.sort_field && direction == self.sort_direction {
            return;
        }
        self.sort_field = field;
        self.sort_direction = direction;
        self.sorted_cache.take();
        self.emit(RosterEvent::SortingChanged {
            field,
            direction,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Flip between ascending and descending
    pub fn toggle_sort_direction(&mut self) {
        self.set_sorting(self.sort_field, self.sort_direction.toggled());
    }

    /// Jump to `page`; out-of-range pages are ignored
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.move_to_page(page);
        true
    }

    /// Advance one page unless already on the last
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.move_to_page(self.current_page + 1);
            true
        } else {
            false
        }
    }

    /// Go back one page unless already on the first
    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.move_to_page(self.current_page - 1);
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Records matching the debounced search text, in collection order
    pub fn filtered(&self) -> Vec<&DisplayRecord> {
        self.filtered_indices()
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Filtered records in sort order
    pub fn sorted(&self) -> Vec<&DisplayRecord> {
        self.sorted_indices()
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Records on the current page
    pub fn paged(&self) -> Vec<&DisplayRecord> {
        let sorted = self.sorted_indices();
        let start = ((self.current_page - 1) * self.page_size).min(sorted.len());
        let end = (start + self.page_size).min(sorted.len());
        sorted[start..end].iter().map(|&i| &self.records[i]).collect()
    }

    /// Number of records passing the filter
    pub fn total_results(&self) -> usize {
        self.filtered_indices().len()
    }

    /// Number of pages, never less than 1
    pub fn total_pages(&self) -> usize {
        let total = self.total_results();
        total.div_ceil(self.page_size).max(1)
    }

    pub fn page_info(&self) -> PageInfo {
        let total = self.total_results();
        let start = if total == 0 {
            0
        } else {
            (self.current_page - 1) * self.page_size + 1
        };
        PageInfo {
            start,
            end: (self.current_page * self.page_size).min(total),
            total,
            current_page: self.current_page,
            total_pages: self.total_pages(),
        }
    }

    /// Owned copy of the query state and current page
    pub fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            search_text: self.search_text.clone(),
            debounced_search_text: self.debounced_search_text.clone(),
            sort_field: self.sort_field,
            sort_direction: self.sort_direction,
            page_size: self.page_size,
            pagination: self.page_info(),
            items: self.paged().into_iter().cloned().collect(),
        }
    }

    /// Look up a record by student id
    pub fn find(&self, student_id: &str) -> Option<&DisplayRecord> {
        self.records.iter().find(|r| r.student_id() == student_id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn filtered_indices(&self) -> &[usize] {
        self.filtered_cache.get_or_init(|| {
            let query = self.debounced_search_text.trim().to_lowercase();
            if query.is_empty() {
                return (0..self.records.len()).collect();
            }
            self.records
                .iter()
                .enumerate()
                .filter(|(_, record)| matches_query(record, &query))
                .map(|(i, _)| i)
                .collect()
        })
    }

    fn sorted_indices(&self) -> &[usize] {
        self.sorted_cache.get_or_init(|| {
            let mut keyed: Vec<(String, usize)> = self
                .filtered_indices()
                .iter()
                .map(|&i| (sort_key(&self.records[i], self.sort_field), i))
                .collect();
            // sort_by is stable: equal keys keep collection order in both directions
            match self.sort_direction {
                SortDirection::Asc => keyed.sort_by(|a, b| collate(&a.0, &b.0)),
                SortDirection::Desc => keyed.sort_by(|a, b| collate(&b.0, &a.0)),
            }
            keyed.into_iter().map(|(_, i)| i).collect()
        })
    }

    fn invalidate_filter(&mut self) {
        self.filtered_cache.take();
        self.sorted_cache.take();
    }

    fn move_to_page(&mut self, page: usize) {
        if page == self.current_page {
            return;
        }
        self.current_page = page;
        self.emit(RosterEvent::PageChanged {
            page,
            total_pages: self.total_pages(),
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit(&self, event: RosterEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }
}

/// Case-insensitive substring match over the searchable fields
///
/// `query` must already be trimmed and lowercased.
fn matches_query(record: &DisplayRecord, query: &str) -> bool {
    SortField::SEARCHABLE.iter().any(|&field| {
        record
            .field(field)
            .map(|value| value.to_lowercase().contains(query))
            .unwrap_or(false)
    })
}

/// Collation key for sorting; missing fields sort as empty strings
fn sort_key(record: &DisplayRecord, field: SortField) -> String {
    record.field(field).unwrap_or_default().to_lowercase()
}

thread_local! {
    static COLLATOR: Option<Collator> = root_collator();
}

/// Root-locale collator that ignores case but not accents
fn root_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!("Collator unavailable, sorting by code point: {}", e);
            None
        }
    }
}

/// Locale-aware comparison of two sort keys
fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    })
}
