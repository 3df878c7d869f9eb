//! Text and JSON views of the displayed page.

use std::fmt::Write as _;

use client_core::PageState;
use serde_json::{json, Value};
use shared::domain::SavedSearch;

pub fn render_page(records: &[SavedSearch], state: &PageState) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("no saved searches on this page\n");
    }
    for search in records {
        let _ = writeln!(out, "[{}] {} ({} items)", search.id, search.name, search.count);
        if !search.search_term.is_empty() {
            let _ = writeln!(out, "    {}", search.search_term);
        }
    }
    let _ = write!(
        out,
        "{}  page {}/{}",
        state.range_label(),
        state.current_page,
        state.total_pages()
    );
    if state.has_previous_page() {
        out.push_str("  < prev");
    }
    if state.has_next_page() {
        out.push_str("  next >");
    }
    out.push('\n');
    out
}

pub fn page_json(records: &[SavedSearch], state: &PageState) -> Value {
    json!({
        "page": state.current_page,
        "page_size": state.page_size.get(),
        "total_count": state.total_count,
        "total_pages": state.total_pages(),
        "range": {
            "start": state.display_range_start(),
            "end": state.display_range_end(),
        },
        "has_previous": state.has_previous_page(),
        "has_next": state.has_next_page(),
        "records": records,
    })
}
