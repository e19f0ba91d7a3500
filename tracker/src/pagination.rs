use registry::{PageWindow, ProductRecord};
use tracing::{info, warn};

use crate::client::{FetchError, PageSource};

pub const DEFAULT_MAX_PAGES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub max_pages: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<ProductRecord>,
    pub pages: usize,
    pub error: Option<FetchError>,
    pub truncated: bool,
}

/// Walks the registry one window at a time until a short page comes back.
///
/// `on_progress` sees how many rows were collected before each request. A failed
/// page stops the walk, keeping whatever arrived before it.
pub async fn fetch_all_pages<S, F>(
    source: &S,
    query: &str,
    limits: FetchLimits,
    mut on_progress: F,
) -> FetchOutcome
where
    S: PageSource,
    F: FnMut(usize),
{
    let mut outcome = FetchOutcome::default();
    let mut window = PageWindow::first();

    loop {
        if outcome.pages >= limits.max_pages {
            warn!(
                query,
                pages = outcome.pages,
                "Page limit reached, stopping early"
            );
            outcome.truncated = true;
            break;
        }

        on_progress(outcome.records.len());

        let rows = match source.fetch_page(query, window).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(query, start = window.start(), "Page fetch failed: {e}");
                outcome.error = Some(e);
                break;
            }
        };

        outcome.pages += 1;

        let full = rows.len() >= window.len() as usize;
        outcome.records.extend(rows);

        if !full {
            break;
        }

        window = window.next();
    }

    info!(
        query,
        pages = outcome.pages,
        records = outcome.records.len(),
        "Fetch finished"
    );

    outcome
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use super::*;

    /// Serves canned page sizes in order, then empty pages forever.
    pub(crate) struct ScriptedSource {
        pages: Mutex<VecDeque<Result<Vec<ProductRecord>, FetchError>>>,
        repeat_full: bool,
        pub(crate) calls: AtomicUsize,
        pub(crate) windows: Mutex<Vec<(u32, u32)>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(pages: Vec<Result<Vec<ProductRecord>, FetchError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                repeat_full: false,
                calls: AtomicUsize::new(0),
                windows: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn sized(sizes: &[usize]) -> Self {
            Self::new(sizes.iter().map(|&n| Ok(rows(n))).collect())
        }

        pub(crate) fn endless() -> Self {
            Self {
                repeat_full: true,
                ..Self::new(Vec::new())
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _query: &str,
            window: PageWindow,
        ) -> Result<Vec<ProductRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.windows
                .lock()
                .unwrap()
                .push((window.start(), window.end()));

            if self.repeat_full {
                return Ok(rows(window.len() as usize));
            }

            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    pub(crate) fn rows(n: usize) -> Vec<ProductRecord> {
        (0..n)
            .map(|i| ProductRecord::new(&format!("product {}", i % 7), "20250115"))
            .collect()
    }

    #[tokio::test]
    async fn test_short_page_stops() {
        let source = ScriptedSource::sized(&[100, 100, 37]);

        let outcome = fetch_all_pages(&source, "두부", FetchLimits::default(), |_| {}).await;

        assert_eq!(source.calls(), 3);
        assert_eq!(outcome.records.len(), 237);
        assert_eq!(outcome.pages, 3);
        assert!(outcome.error.is_none());
        assert!(!outcome.truncated);
        assert_eq!(
            *source.windows.lock().unwrap(),
            vec![(1, 100), (101, 200), (201, 300)]
        );
    }

    #[tokio::test]
    async fn test_full_pages_continue() {
        let source = ScriptedSource::sized(&[100, 100, 100]);

        let outcome = fetch_all_pages(&source, "두부", FetchLimits::default(), |_| {}).await;

        assert_eq!(source.calls(), 4);
        assert_eq!(outcome.records.len(), 300);
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let source = ScriptedSource::sized(&[0]);

        let outcome = fetch_all_pages(&source, "두부", FetchLimits::default(), |_| {}).await;

        assert_eq!(source.calls(), 1);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_page_limit() {
        let source = ScriptedSource::endless();
        let limits = FetchLimits { max_pages: 5 };

        let outcome = fetch_all_pages(&source, "두부", limits, |_| {}).await;

        assert_eq!(source.calls(), 5);
        assert_eq!(outcome.records.len(), 500);
        assert!(outcome.truncated);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_partial() {
        let source = ScriptedSource::new(vec![
            Ok(rows(100)),
            Err(FetchError::Proxy("점검 중".to_string())),
            Ok(rows(10)),
        ]);

        let outcome = fetch_all_pages(&source, "두부", FetchLimits::default(), |_| {}).await;

        assert_eq!(source.calls(), 2);
        assert_eq!(outcome.records.len(), 100);
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.error.unwrap().to_string(), "점검 중");
    }

    #[tokio::test]
    async fn test_progress() {
        let source = ScriptedSource::sized(&[100, 100, 5]);
        let mut seen = Vec::new();

        fetch_all_pages(&source, "두부", FetchLimits::default(), |n| seen.push(n)).await;

        assert_eq!(seen, vec![0, 100, 200]);
    }
}
