//! # Registry
//!
//! Shared vocabulary for the food safety product registry (`I0320`).
//!
//! ## Upstream
//!
//! - Service: `https://openapi.foodsafetykorea.go.kr/api/{key}/I0320/json/{start}/{end}?PDT_NM={name}`
//! - Windows are 1-based and inclusive, we always ask for 100 rows at a time
//! - A short page (fewer rows than asked for) means there is nothing left
//!
//! ## Envelope
//!
//! ```json
//! { "I0320": { "total_count": "237", "row": [ { "PDT_NM": "...", "MNFT_DAY": "20250607" } ], "RESULT": { "CODE": "INFO-000", "MSG": "..." } } }
//! ```
//!
//! `row` disappears entirely when nothing matched, so it is optional here. The
//! other fields vary in type between responses and are not decoded.

pub mod records;
pub mod window;

pub use records::{ManufactureDate, ProductRecord, SearchResponse, ServiceBody};
pub use window::{PageWindow, WindowError};

pub const SERVICE_ID: &str = "I0320";
pub const PAGE_SIZE: u32 = 100;

/// Shortest product name (after trimming) worth sending upstream.
pub const MIN_QUERY_CHARS: usize = 2;

pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}
