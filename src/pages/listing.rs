//! List page model: newest-first ordering and the title search.

use serde::Serialize;

use crate::models::{Category, Record, SearchField};

/// What a list page shows once its single fetch has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    Populated,
    /// No records, whether the source was empty, failed, or the search matched nothing.
    Empty,
}

/// Store order is oldest-first; pages show the reverse.
pub fn newest_first(mut records: Vec<Record>) -> Vec<Record> {
    records.reverse();
    records
}

/// Keep records where any of `fields` contains `term`, ignoring case.
///
/// An empty term keeps everything.
pub fn filter_records(records: Vec<Record>, term: &str, fields: &[SearchField]) -> Vec<Record> {
    if term.is_empty() {
        return records;
    }
    let needle = term.to_lowercase();
    records
        .into_iter()
        .filter(|r| r.matches(&needle, fields))
        .collect()
}

/// One row of a list page.
#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_date: Option<String>,
    /// Lowercased searchable text, one field per line, for the in-page filter.
    pub search_text: String,
}

impl ListItem {
    pub fn new(record: &Record, category: Category, fields: &[SearchField]) -> Self {
        let search_text = fields
            .iter()
            .filter_map(|f| record.field(*f))
            .map(|v| v.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            id: record.id.clone(),
            title: record.display_title().to_string(),
            href: category.record_path(&record.id),
            organization: record.organization.clone(),
            status: record.status.clone(),
            post_date: record.post_date.clone(),
            search_text,
        }
    }
}

/// Settled state of a list page.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub status: ListStatus,
    pub query: String,
    /// Records before filtering.
    pub total: usize,
    pub items: Vec<ListItem>,
}

impl ListView {
    /// Build from the fetched collection in store order.
    ///
    /// Returns the view and the displayed records (newest first, filtered).
    pub fn build(
        fetched: Vec<Record>,
        category: Category,
        query: &str,
        fields: &[SearchField],
    ) -> (Self, Vec<Record>) {
        let total = fetched.len();
        let shown = filter_records(newest_first(fetched), query, fields);
        let items: Vec<ListItem> = shown
            .iter()
            .map(|r| ListItem::new(r, category, fields))
            .collect();
        let status = if items.is_empty() {
            ListStatus::Empty
        } else {
            ListStatus::Populated
        };

        (
            Self {
                status,
                query: query.to_string(),
                total,
                items,
            },
            shown,
        )
    }
}
