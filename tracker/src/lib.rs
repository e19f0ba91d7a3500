//! # Tracker
//!
//! Terminal client for the production registry proxy.
//!
//! Searches page through the proxy until a short page comes back, then fold into
//! per-product counts: production runs in 2024 and per month in 2025. Products
//! are listed busiest first, checking them draws the 2025 lines and the 2024
//! table, and the selection can be saved as an xlsx workbook.
//!
//! ## Modes
//! - `tracker` or `tracker tui`: interactive interface
//! - `tracker export <query>`: one search straight to a workbook
//!
//! ## Configuration
//! | Flag | Env | Default |
//! |---|---|---|
//! | `--proxy-url` | `TRACKER_PROXY_URL` | `http://localhost:1111` |
//! | `--max-pages` | `TRACKER_MAX_PAGES` | `1000` |
//! | `--output` | `TRACKER_OUTPUT` | `생산현황.xlsx` |
//! | `--log-file` | `TRACKER_LOG_FILE` | `tracker.log` |
//!
//! Log verbosity follows `RUST_LOG`.
pub mod aggregate;
pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod export;
pub mod headless;
pub mod pagination;
pub mod session;
pub mod ui;
