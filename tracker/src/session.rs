//! # Session
//!
//! Everything the tracker knows between key presses.
//!
//! ## Lifecycle
//! - Searches fold into the same [`Aggregation`], only [`Session::reset`] clears it
//! - The result list is rebuilt from the latest fetch only
//! - The selection outlives searches, even for names no longer listed
//!
//! ## Generations
//! Every accepted search and every reset bumps the generation. A fetch carries the
//! generation it started under in its [`SearchTicket`], results from an outdated
//! ticket are dropped instead of being merged.
use std::path::Path;

use registry::is_searchable;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    aggregate::Aggregation,
    chart::{ChartSlot, LineChart},
    client::PageSource,
    export::{ExportError, Sheet},
    pagination::{FetchLimits, FetchOutcome, fetch_all_pages},
};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("2글자 이상 입력해주세요.")]
    QueryTooShort,

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading { collected: usize },
    NoResults,
    Ready,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    Applied { alert: Option<String> },
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub name: String,
    pub count_2024: u32,
}

/// Checked names in the order they were checked.
#[derive(Debug, Default)]
pub struct Selection {
    names: Vec<String>,
}

impl Selection {
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }

        self.names.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);

        self.names.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}

#[derive(Debug)]
pub struct Session {
    products: Aggregation,
    selection: Selection,
    results: Vec<String>,
    status: Status,
    chart: ChartSlot,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            products: Aggregation::default(),
            selection: Selection::default(),
            results: Vec::new(),
            status: Status::Idle,
            chart: ChartSlot::default(),
            generation: 0,
        }
    }
}

impl Session {
    /// Validates the query and opens a new generation for it.
    pub fn begin_search(&mut self, input: &str) -> Result<SearchTicket, SessionError> {
        let query = input.trim();

        if !is_searchable(query) {
            return Err(SessionError::QueryTooShort);
        }

        self.generation += 1;
        self.status = Status::Loading { collected: 0 };

        debug!(query, generation = self.generation, "Search started");

        Ok(SearchTicket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    pub fn record_progress(&mut self, generation: u64, collected: usize) {
        if generation == self.generation && matches!(self.status, Status::Loading { .. }) {
            self.status = Status::Loading { collected };
        }
    }

    /// Merges a finished fetch, unless a newer search or a reset superseded it.
    pub fn complete_search(&mut self, ticket: SearchTicket, outcome: FetchOutcome) -> Completion {
        if ticket.generation != self.generation {
            debug!(
                query = %ticket.query,
                stale = ticket.generation,
                current = self.generation,
                "Discarding superseded search"
            );
            return Completion::Discarded;
        }

        let alert = match (&outcome.error, outcome.truncated) {
            (Some(e), _) => Some(e.to_string()),
            (None, true) => Some(format!(
                "조회 결과가 너무 많아 {}건까지만 집계했습니다.",
                outcome.records.len()
            )),
            (None, false) => None,
        };

        if outcome.records.is_empty() {
            self.results.clear();
            self.status = Status::NoResults;

            return Completion::Applied { alert };
        }

        let counted = self.products.fold(&outcome.records);
        self.results = self.products.rank(&outcome.records);
        self.status = Status::Ready;

        info!(
            query = %ticket.query,
            records = outcome.records.len(),
            counted,
            listed = self.results.len(),
            "Search merged"
        );

        self.render();

        Completion::Applied { alert }
    }

    /// Runs a whole search inline. The TUI spawns the same steps on a task instead.
    pub async fn search<S: PageSource>(
        &mut self,
        source: &S,
        input: &str,
        limits: FetchLimits,
        on_progress: impl FnMut(usize),
    ) -> Result<Completion, SessionError> {
        let ticket = self.begin_search(input)?;
        let outcome = fetch_all_pages(source, ticket.query(), limits, on_progress).await;

        Ok(self.complete_search(ticket, outcome))
    }

    pub fn toggle(&mut self, name: &str, checked: bool) {
        let changed = if checked {
            self.selection.insert(name)
        } else {
            self.selection.remove(name)
        };

        if changed {
            self.render();
        }
    }

    /// Unchecking from the selected panel. The result list reads the same
    /// selection, so its checkbox follows.
    pub fn deselect(&mut self, name: &str) {
        self.toggle(name, false);
    }

    /// Rebuilds the chart from the current selection.
    pub fn render(&mut self) {
        let chart = LineChart::build(self.selection.iter(), &self.products);

        self.chart.render(chart);
    }

    pub fn reset(&mut self) {
        self.products.clear();
        self.selection.clear();
        self.results.clear();
        self.chart.destroy();
        self.status = Status::Idle;
        self.generation += 1;

        info!(generation = self.generation, "Session reset");
    }

    pub fn result_items(&self) -> Vec<ResultItem> {
        self.results
            .iter()
            .map(|name| ResultItem {
                name: name.clone(),
                checked: self.selection.contains(name),
            })
            .collect()
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        self.selection
            .iter()
            .filter_map(|name| {
                self.products.get(name).map(|counts| TableRow {
                    name: name.to_string(),
                    count_2024: counts.count_2024,
                })
            })
            .collect()
    }

    pub fn sheet(&self) -> Result<Sheet, SessionError> {
        Ok(Sheet::build(self.selection.iter(), &self.products)?)
    }

    pub fn export(&self, path: &Path) -> Result<Sheet, SessionError> {
        let sheet = self.sheet()?;
        sheet.write(path)?;

        Ok(sheet)
    }

    pub fn products(&self) -> &Aggregation {
        &self.products
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn chart(&self) -> Option<&LineChart> {
        self.chart.current()
    }

    pub fn chart_slot(&self) -> &ChartSlot {
        &self.chart
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use registry::ProductRecord;

    use super::*;
    use crate::{
        client::FetchError,
        pagination::tests::{ScriptedSource, rows},
    };

    fn outcome(records: Vec<ProductRecord>) -> FetchOutcome {
        FetchOutcome {
            pages: 1,
            records,
            ..FetchOutcome::default()
        }
    }

    fn batch() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new("A", "20240101"),
            ProductRecord::new("A", "20240201"),
            ProductRecord::new("A", "20240301"),
            ProductRecord::new("A", "20250101"),
            ProductRecord::new("B", "20250101"),
            ProductRecord::new("B", "20250201"),
            ProductRecord::new("C", "20230101"),
        ]
    }

    fn searched() -> Session {
        let mut session = Session::default();
        let ticket = session.begin_search("두부").unwrap();
        session.complete_search(ticket, outcome(batch()));
        session
    }

    #[tokio::test]
    async fn test_short_query_skips_network() {
        let source = ScriptedSource::sized(&[10]);
        let mut session = Session::default();

        for input in ["", "a", "  a  ", "\t"] {
            let err = session
                .search(&source, input, FetchLimits::default(), |_| {})
                .await
                .unwrap_err();

            assert_eq!(err.to_string(), "2글자 이상 입력해주세요.");
        }

        assert_eq!(source.calls(), 0);
        assert_eq!(session.generation(), 0);
        assert_eq!(*session.status(), Status::Idle);
    }

    #[tokio::test]
    async fn test_search_end_to_end() {
        let source = ScriptedSource::sized(&[100, 100, 37]);
        let mut session = Session::default();

        let completion = session
            .search(&source, "  두부  ", FetchLimits::default(), |_| {})
            .await
            .unwrap();

        assert_eq!(completion, Completion::Applied { alert: None });
        assert_eq!(source.calls(), 3);
        assert_eq!(*session.status(), Status::Ready);
        assert_eq!(session.results().len(), 7);
        assert_eq!(session.products().len(), 7);
    }

    #[tokio::test]
    async fn test_search_failure_alerts() {
        let source = ScriptedSource::new(vec![
            Ok(rows(100)),
            Err(FetchError::Proxy("외부 API 호출 실패".to_string())),
        ]);
        let mut session = Session::default();

        let completion = session
            .search(&source, "두부", FetchLimits::default(), |_| {})
            .await
            .unwrap();

        assert_eq!(
            completion,
            Completion::Applied {
                alert: Some("외부 API 호출 실패".to_string())
            }
        );
        assert_eq!(*session.status(), Status::Ready);
        assert!(!session.results().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_alerts() {
        let source = ScriptedSource::endless();
        let mut session = Session::default();

        let completion = session
            .search(&source, "두부", FetchLimits { max_pages: 2 }, |_| {})
            .await
            .unwrap();

        assert_eq!(
            completion,
            Completion::Applied {
                alert: Some("조회 결과가 너무 많아 200건까지만 집계했습니다.".to_string())
            }
        );
    }

    #[test]
    fn test_no_results() {
        let mut session = searched();

        let ticket = session.begin_search("없는품목").unwrap();
        let completion = session.complete_search(
            ticket,
            FetchOutcome {
                error: Some(FetchError::Proxy("서버 호출 오류".to_string())),
                ..FetchOutcome::default()
            },
        );

        assert_eq!(
            completion,
            Completion::Applied {
                alert: Some("서버 호출 오류".to_string())
            }
        );
        assert_eq!(*session.status(), Status::NoResults);
        assert!(session.result_items().is_empty());
        assert!(session.products().get("A").is_some());
    }

    #[test]
    fn test_results_ranked() {
        let session = searched();

        let names: Vec<String> = session.result_items().into_iter().map(|i| i.name).collect();

        assert_eq!(names, vec!["B", "A", "C"]);
        assert!(session.products().get("C").is_none());
    }

    #[test]
    fn test_toggle_and_deselect() {
        let mut session = searched();

        session.toggle("A", true);
        session.toggle("B", true);
        session.toggle("A", true);

        assert_eq!(session.selection().iter().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(session.result_items().iter().all(|item| item.checked || item.name == "C"));

        session.deselect("A");

        let a = session
            .result_items()
            .into_iter()
            .find(|item| item.name == "A")
            .unwrap();
        assert!(!a.checked);
        assert_eq!(session.selection().len(), 1);
        assert_eq!(session.chart().unwrap().series().len(), 1);
    }

    #[test]
    fn test_table_skips_unknown() {
        let mut session = searched();

        session.toggle("C", true);
        session.toggle("A", true);

        assert_eq!(
            session.table_rows(),
            vec![TableRow {
                name: "A".to_string(),
                count_2024: 3
            }]
        );
    }

    #[test]
    fn test_render_idempotent() {
        let mut session = searched();
        session.toggle("A", true);
        session.toggle("B", true);

        session.render();
        let table = session.table_rows();
        let chart = session.chart().cloned();

        session.render();

        assert_eq!(session.table_rows(), table);
        assert_eq!(session.chart().cloned(), chart);
        assert_eq!(session.chart_slot().live_instances(), 1);
    }

    #[test]
    fn test_no_chart_without_counts() {
        let mut session = searched();

        session.toggle("C", true);

        assert!(session.chart().is_none());
        assert_eq!(session.chart_slot().live_instances(), 0);
    }

    #[test]
    fn test_reset() {
        let mut session = searched();
        session.toggle("A", true);
        assert!(session.chart().is_some());

        session.reset();

        assert!(session.products().is_empty());
        assert!(session.selection().is_empty());
        assert!(session.result_items().is_empty());
        assert!(session.chart().is_none());
        assert_eq!(session.chart_slot().live_instances(), 0);
        assert_eq!(*session.status(), Status::Idle);
    }

    #[test]
    fn test_searches_accumulate() {
        let mut session = searched();
        session.toggle("A", true);

        let ticket = session.begin_search("순두부").unwrap();
        session.complete_search(
            ticket,
            outcome(vec![
                ProductRecord::new("D", "20250505"),
                ProductRecord::new("A", "20240909"),
            ]),
        );

        assert_eq!(session.results(), ["D", "A"]);
        assert_eq!(session.products().get("A").unwrap().count_2024, 4);
        assert!(session.products().get("B").is_some());
        assert!(session.selection().contains("A"));

        session.toggle("B", true);
        assert_eq!(session.table_rows().len(), 2);
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut session = Session::default();

        let first = session.begin_search("두부").unwrap();
        let second = session.begin_search("순두부").unwrap();

        session.record_progress(first.generation(), 500);
        assert_eq!(*session.status(), Status::Loading { collected: 0 });

        assert_eq!(
            session.complete_search(first, outcome(batch())),
            Completion::Discarded
        );
        assert!(session.products().is_empty());

        session.record_progress(second.generation(), 100);
        assert_eq!(*session.status(), Status::Loading { collected: 100 });

        session.complete_search(second, outcome(vec![ProductRecord::new("D", "20250101")]));
        assert_eq!(session.results(), ["D"]);
    }

    #[test]
    fn test_reset_discards_in_flight() {
        let mut session = Session::default();

        let ticket = session.begin_search("두부").unwrap();
        session.reset();

        assert_eq!(
            session.complete_search(ticket, outcome(batch())),
            Completion::Discarded
        );
        assert!(session.products().is_empty());
        assert_eq!(*session.status(), Status::Idle);
    }

    #[test]
    fn test_export_empty_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let err = searched().export(&path).unwrap_err();

        assert_eq!(err.to_string(), "선택된 품목이 없습니다.");
        assert!(!path.exists());
    }

    #[test]
    fn test_export_selected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut session = searched();
        session.toggle("A", true);

        let sheet = session.export(&path).unwrap();

        let mut monthly = [0; 12];
        monthly[0] = 1;

        assert!(path.exists());
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].name, "A");
        assert_eq!(sheet.rows[0].count_2024, 3);
        assert_eq!(sheet.rows[0].monthly_2025, monthly);
    }
}
