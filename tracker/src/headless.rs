use std::{path::Path, time::Duration};

use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::{
    client::PageSource,
    export::Sheet,
    pagination::FetchLimits,
    session::{Completion, Session, Status},
};

pub struct ExportRequest<'a> {
    pub query: &'a str,
    pub select: &'a [String],
    pub top: usize,
    pub limits: FetchLimits,
    pub output: &'a Path,
}

/// One search, then the workbook, without the interface.
pub async fn run<S: PageSource>(source: &S, request: ExportRequest<'_>) -> Result<Sheet> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg}",
    )?);
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut session = Session::default();

    let completion = session
        .search(source, request.query, request.limits, |collected| {
            pb.set_message(format!("조회 중... {collected}개 이상 수집됨"));
        })
        .await?;

    pb.finish_and_clear();

    if let Completion::Applied { alert: Some(alert) } = completion {
        warn!("{alert}");
        eprintln!("{alert}");
    }

    if *session.status() == Status::NoResults {
        bail!("검색 결과가 없습니다.");
    }

    for name in pick(&session, request.select, request.top) {
        session.toggle(&name, true);
    }

    let sheet = session.export(request.output)?;

    print_table(&sheet);
    info!(path = %request.output.display(), rows = sheet.rows.len(), "Export done");

    Ok(sheet)
}

/// Explicit names win, otherwise the busiest `top` products of this search.
fn pick(session: &Session, select: &[String], top: usize) -> Vec<String> {
    if !select.is_empty() {
        return select.to_vec();
    }

    session.results().iter().take(top).cloned().collect()
}

fn print_table(sheet: &Sheet) {
    let width = sheet
        .rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    println!("{:<width$}  2024  2025", "품목명");

    for row in &sheet.rows {
        let total: u32 = row.monthly_2025.iter().sum();
        println!("{:<width$}  {:>4}  {:>4}", row.name, row.count_2024, total);
    }
}
