use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, Paragraph, Row,
        Table, Wrap,
    },
};

use crate::{
    app::{App, Focus},
    chart::{LineChart, MONTH_LABELS},
    session::Status,
};

const HIGHLIGHT: Color = Color::Yellow;

pub fn draw<S>(frame: &mut Frame, app: &mut App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_input(frame, app, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(body[1]);

    draw_results(frame, app, left[0]);
    draw_selected(frame, app, left[1]);
    draw_table(frame, app, right[0]);
    draw_chart(frame, app.session.chart(), right[1]);
    draw_footer(frame, app, rows[2]);

    if let Some(alert) = &app.alert {
        draw_alert(frame, alert);
    }
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(HIGHLIGHT)
    } else {
        Style::default()
    };

    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(style)
}

fn draw_input<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let focused = app.focus == Focus::Search;

    // Keep the cursor in view once the text is wider than the box.
    let width = area.width.saturating_sub(3) as usize;
    let scroll = app.input.visual_scroll(width);

    let input = Paragraph::new(app.input.value())
        .scroll((0, scroll as u16))
        .block(panel("품목명 검색 (2글자 이상)", focused));

    frame.render_widget(input, area);

    if focused && app.alert.is_none() {
        let x = app.input.visual_cursor().saturating_sub(scroll) as u16;
        frame.set_cursor_position((area.x + 1 + x, area.y + 1));
    }
}

fn draw_results<S>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
    let block = panel("검색 결과", app.focus == Focus::Results);

    let placeholder = match app.session.status() {
        Status::Loading { collected } => Some(format!("조회 중... {collected}개 이상 수집됨")),
        Status::NoResults => Some("검색 결과가 없습니다.".to_string()),
        Status::Idle | Status::Ready => None,
    };

    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);

        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .session
        .result_items()
        .into_iter()
        .map(|item| {
            let mark = if item.checked { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {}", item.name))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut app.results_state);
}

fn draw_selected<S>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
    let items: Vec<ListItem> = app
        .session
        .selection()
        .iter()
        .map(|name| ListItem::new(name.to_string()))
        .collect();

    let list = List::new(items)
        .block(panel("선택된 품목", app.focus == Focus::Selected))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut app.selected_state);
}

fn draw_table<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let rows: Vec<Row> = app
        .session
        .table_rows()
        .into_iter()
        .map(|row| Row::new([row.name, row.count_2024.to_string()]))
        .collect();

    let header = Row::new(["품목명", "2024년 생산 횟수"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [Constraint::Percentage(70), Constraint::Percentage(30)],
    )
    .header(header)
    .block(panel("2024년 생산 현황", false));

    frame.render_widget(table, area);
}

fn draw_chart(frame: &mut Frame, chart: Option<&LineChart>, area: Rect) {
    let block = panel("2025년 월별 생산 추이", false);

    let Some(chart) = chart else {
        frame.render_widget(block, area);
        return;
    };

    let coordinates: Vec<Vec<(f64, f64)>> = chart
        .series()
        .iter()
        .map(|series| series.coordinates())
        .collect();

    let datasets = chart
        .series()
        .iter()
        .zip(&coordinates)
        .map(|(series, points)| {
            let (r, g, b) = series.color.to_rgb();

            Dataset::default()
                .name(series.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Rgb(r, g, b)))
                .data(points)
        })
        .collect();

    let x_axis = Axis::default()
        .bounds([1.0, 12.0])
        .labels([MONTH_LABELS[0], MONTH_LABELS[5], MONTH_LABELS[11]]);

    let y_axis = Axis::default()
        .title("생산 횟수")
        .bounds([0.0, f64::from(chart.y_max())])
        .labels(chart.y_ticks().into_iter().map(|tick| tick.to_string()));

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(widget, area);
}

fn draw_footer<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let mut spans = vec![Span::styled(
        "Enter 검색/선택  Tab 이동  Space 선택  Ctrl+E 엑셀 저장  Ctrl+R 초기화  Esc 종료",
        Style::default().fg(Color::DarkGray),
    )];

    if let Some(notice) = &app.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.as_str(), Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 50, 5);

    let popup = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" 알림 ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(width)])
        .flex(Flex::Center)
        .areas(row);

    cell
}
