//! TUI rendering functions

use super::app::{App, Focus, FormField, ModalState, TableOverlay, FORM_FIELDS};
use crate::charts::{status_band_color, ChartWidget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState,
        Wrap,
    },
    Frame,
};

/// Draw the dashboard
pub fn draw(frame: &mut Frame, app: &App) {
    let filter_height = if app.filter_collapsed { 1 } else { 6 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Title bar
            Constraint::Length(filter_height), // Filter panel
            Constraint::Length(12),            // Charts
            Constraint::Min(5),                // Log entry table
            Constraint::Length(1),             // Footer
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_filter_panel(frame, app, chunks[1]);
    draw_charts(frame, app, chunks[2]);
    draw_table(frame, app, chunks[3]);
    draw_footer(frame, app, chunks[4]);

    if app.modal != ModalState::Closed {
        draw_modal(frame, app);
    }
}

/// Title bar: file, count badge, and the visible filter address
fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let address = app.history.current_address().unwrap_or("");
    let address = if address.is_empty() {
        String::new()
    } else {
        format!("?{}", address)
    };

    let line = Line::from(vec![
        Span::styled(
            " LOGBOARD ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("file {}  ", app.file_id), Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.count_badge(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", address), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Filter panel: one hint line when collapsed, the form fields in two
/// columns when expanded
fn draw_filter_panel(frame: &mut Frame, app: &App, area: Rect) {
    if app.filter_collapsed {
        let line = Line::from(vec![
            Span::styled(" Filters ", Style::default().fg(Color::DarkGray)),
            Span::styled("f", Style::default().fg(Color::Cyan)),
            Span::styled(" to expand", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_style(if app.focus == Focus::Form {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let half = FORM_FIELDS.len() / 2;
    draw_form_column(frame, app, columns[0], &FORM_FIELDS[..half]);
    draw_form_column(frame, app, columns[1], &FORM_FIELDS[half..]);
}

fn draw_form_column(frame: &mut Frame, app: &App, area: Rect, fields: &[FormField]) {
    let lines: Vec<Line> = fields
        .iter()
        .map(|field| {
            let focused = app.focus == Focus::Form && app.form.focused() == *field;
            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let value = app.form.value(*field);
            let cursor = if focused { "_" } else { "" };

            Line::from(vec![
                Span::styled(format!("{:<12}", field.label()), label_style),
                Span::styled(format!("{}{}", value, cursor), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Both chart widgets side by side. A role with no widget renders as
/// an empty bordered region.
fn draw_charts(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_chart(
        frame,
        halves[0],
        " Status Codes ",
        app.charts.status_widget(),
    );
    draw_chart(
        frame,
        halves[1],
        " HTTP Methods ",
        app.charts.method_widget(),
    );
}

fn draw_chart(frame: &mut Frame, area: Rect, title: &str, widget: Option<&ChartWidget>) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(widget) = widget else {
        frame.render_widget(block, area);
        return;
    };

    let bars: Vec<Bar> = widget
        .labels
        .iter()
        .zip(widget.values.iter())
        .zip(widget.colors.iter())
        .map(|((label, value), color)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(*color))
                .value_style(Style::default().fg(Color::Black).bg(*color))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1)
        .block(block);

    frame.render_widget(chart, area);
}

/// The log entry table, or the loading/error indicator covering it
fn draw_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Log Entries ")
        .borders(Borders::ALL)
        .border_style(if app.focus == Focus::Table {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    match &app.overlay {
        TableOverlay::Loading => {
            let text = Paragraph::new("Filtering logs...")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(text, area);
            return;
        }
        TableOverlay::Error(message) => {
            let text = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(text, area);
            return;
        }
        TableOverlay::None => {}
    }

    if app.rows.is_empty() {
        let text = Paragraph::new("No log entries found.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let columns = app.rows.iter().map(|r| r.cells.len()).max().unwrap_or(1);
    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|c| Cell::from(c.as_str()))))
        .collect();

    let table = Table::new(rows, vec![Constraint::Fill(1); columns])
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));

    let mut state = TableState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Footer with key hints
fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hint = |key: &'static str, action: &'static str| {
        vec![
            Span::styled(key, Style::default().fg(Color::Cyan)),
            Span::styled(action, Style::default().fg(Color::DarkGray)),
        ]
    };

    let mut spans = Vec::new();
    if app.modal != ModalState::Closed {
        spans.extend(hint("Esc", " Close  "));
        spans.extend(hint("r", " Retry  "));
    } else if app.focus == Focus::Form {
        spans.extend(hint("↑/↓", " Field  "));
        spans.extend(hint("Enter", " Apply filter  "));
        spans.extend(hint("Esc", " Back to table  "));
    } else {
        spans.extend(hint("↑/↓", " Navigate  "));
        spans.extend(hint("Enter", " Details  "));
        spans.extend(hint("Tab", " Filters  "));
        spans.extend(hint("[/]", " History  "));
        spans.extend(hint("q", " Quit  "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Detail modal drawn over the dashboard
fn draw_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let (entry_id, body): (&str, Vec<Line>) = match &app.modal {
        ModalState::Closed => return,
        ModalState::Loading { entry_id } => (
            entry_id,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Loading details...",
                    Style::default().fg(Color::Yellow),
                )),
            ],
        ),
        ModalState::Errored { entry_id, message } => (
            entry_id,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(Color::Red),
                )),
            ],
        ),
        ModalState::Populated { entry_id, record } => {
            let mut lines = vec![
                detail_line("IP address", &record.ip_address, Style::default().fg(Color::White)),
                detail_line("Timestamp", &record.timestamp, Style::default().fg(Color::White)),
                detail_line("Method", &record.method, method_style(&record.method)),
                detail_line("Path", &record.path, Style::default().fg(Color::White)),
            ];
            if let Some(protocol) = &record.protocol {
                lines.push(detail_line("Protocol", protocol, Style::default().fg(Color::White)));
            }
            lines.push(detail_line(
                "Status",
                &record.status_code.to_string(),
                Style::default().fg(status_band_color(&record.status_code.to_string())),
            ));
            lines.push(detail_line(
                "Size",
                &format!("{} bytes", record.response_size),
                Style::default().fg(Color::White),
            ));
            lines.push(detail_line("User agent", &record.user_agent, Style::default().fg(Color::White)));
            lines.push(detail_line(
                "Referrer",
                record.referrer.as_deref().unwrap_or("(none)"),
                Style::default().fg(Color::White),
            ));

            lines.push(Line::from(""));
            if record.parameters.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No query parameters",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    format!("{:<20}{}", "Name", "Value"),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
                )));
                for param in &record.parameters {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("{:<20}", param.name),
                            Style::default().fg(Color::Cyan),
                        ),
                        Span::styled(param.value.clone(), Style::default().fg(Color::White)),
                    ]));
                }
            }

            (entry_id, lines)
        }
    };

    let block = Block::default()
        .title(format!(" Log Entry {} ", entry_id))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(body).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(paragraph, area);
}

fn detail_line<'a>(label: &'a str, value: &str, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), value_style),
    ])
}

/// Get style for HTTP method
fn method_style(method: &str) -> Style {
    match method {
        "GET" => Style::default().fg(Color::Green),
        "POST" => Style::default().fg(Color::Blue),
        "PUT" => Style::default().fg(Color::Yellow),
        "DELETE" => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

/// Centered rect for the modal, sized as a percentage of the frame
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
