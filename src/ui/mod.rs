use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::meals::EditableField;
use crate::theme::Theme;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the configured theme; must run before the first draw to take effect
pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("Theme already initialized");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(5),    // Meal table
            Constraint::Length(3), // Selected cell editor
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_info_line(f, app, chunks[0]);
    draw_meal_table(f, app, chunks[1]);
    draw_cell_editor(f, app, chunks[2]);
    draw_footer(f, chunks[3]);

    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
        Popup::ConfirmCancel => draw_confirm_popup(f),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: status message > countdown > hint
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(warning())))
    } else if let Some(secs) = app.remaining_secs {
        let color = if secs <= 30 { danger() } else { text_dim() };
        Line::from(vec![
            Span::styled("󰔟 ", Style::default().fg(color)),
            Span::styled(
                format!("{}:{:02}", secs / 60, secs % 60),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(text_dim())),
            Span::styled("Fill in this week's meals and submit", Style::default().fg(text())),
        ])
    } else {
        Line::from(Span::styled(
            "Fill in this week's meals and submit",
            Style::default().fg(text_dim()),
        ))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_meal_table(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            " This Week's Meals ",
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    let mut header_cells = vec![Span::styled("Day", Style::default().fg(header()))];
    header_cells.extend(
        EditableField::ALL
            .iter()
            .map(|field| Span::styled(field.title(), Style::default().fg(header()))),
    );
    let header_row = Row::new(header_cells);

    let rows: Vec<Row> = if app.table.is_empty() {
        vec![Row::new(vec![Span::styled(
            "  No days to edit",
            Style::default().fg(text_dim()),
        )])]
    } else {
        app.table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let is_selected_row = i == app.selected_row;

                let mut cells = vec![Span::styled(row.day_label.as_str(), Style::default().fg(text()))];
                for field in EditableField::ALL {
                    let value = row.get(field);
                    let is_cell = is_selected_row && field == app.selected_field;
                    let span = if is_cell {
                        Span::styled(
                            format!("{}▏", value),
                            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
                        )
                    } else if value.is_empty() {
                        Span::styled("-", Style::default().fg(text_dim()))
                    } else {
                        Span::styled(value, Style::default().fg(text()))
                    };
                    cells.push(span);
                }

                let row_style = if is_selected_row {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };
                // dayKey is the stable identity; the row widget only needs position
                Row::new(cells).style(row_style)
            })
            .collect()
    };

    let widths = [
        Constraint::Length(11),
        Constraint::Percentage(30),
        Constraint::Percentage(25),
        Constraint::Percentage(12),
        Constraint::Percentage(25),
    ];

    let table = Table::new(rows, widths)
        .header(header_row)
        .block(block);

    f.render_widget(table, area);
}

fn draw_cell_editor(f: &mut Frame, app: &App, area: Rect) {
    let day = app
        .table
        .rows()
        .get(app.selected_row)
        .map(|row| row.day_label.as_str())
        .unwrap_or("-");

    let block = Block::default()
        .title(Span::styled(
            format!(" {} · {} ", day, app.selected_field.title()),
            Style::default().fg(accent()),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    let content = Paragraph::new(Line::from(vec![
        Span::styled(app.selected_value(), Style::default().fg(text())),
        Span::styled("▏", Style::default().fg(accent())),
    ]))
    .block(block);

    f.render_widget(content, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let hints: Vec<(&str, &str)> = vec![
        ("↑↓", "Day"),
        ("Tab", "Field"),
        ("^U", "Clear"),
        ("^S", "Submit"),
        ("Esc", "Cancel"),
        ("F1", "Help"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else if area.width < 80 { 5 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center), area);
}

fn help_line(key: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(accent())),
        Span::raw(what),
    ])
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        section("═══ Moving ═══"),
        help_line("↑/↓", "Previous / next day"),
        help_line("Tab/→", "Next field"),
        help_line("S-Tab/←", "Previous field"),
        help_line("Enter", "Next field, wraps to the next day"),
        Line::from(""),
        section("═══ Editing ═══"),
        help_line("any key", "Type into the selected cell"),
        help_line("Backspace", "Delete last character"),
        help_line("Ctrl+U", "Clear the cell"),
        Line::from(""),
        section("═══ Finishing ═══"),
        help_line("Ctrl+S/F2", "Submit the whole week"),
        help_line("Esc", "Cancel without saving"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 mealweek Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame) {
    let popup_area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, popup_area);

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Discard this week's edits?", Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" Discard   "),
            Span::styled("n", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Keep editing"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Cancel ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::{week_rows, WeeklyMeals};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_every_day() {
        let app = App::new(week_rows(&WeeklyMeals::new()), Duration::from_secs(600));
        let screen = render(&app);
        for label in ["Monday", "Wednesday", "Sunday"] {
            assert!(screen.contains(label), "missing {}", label);
        }
        assert!(screen.contains("Where"));
    }

    #[test]
    fn test_renders_confirm_popup() {
        let mut app = App::new(week_rows(&WeeklyMeals::new()), Duration::ZERO);
        app.popup = Popup::ConfirmCancel;
        assert!(render(&app).contains("Discard"));
    }
}
