use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::meals::table::{MealTable, TableHost};
use crate::meals::{EditableField, Row};

/// Seconds a status message stays in the info line
const STATUS_SECONDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    ConfirmCancel,
}

pub struct App {
    pub table: MealTable,
    pub popup: Popup,

    // Cursor
    pub selected_row: usize,
    pub selected_field: EditableField,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Form expiry; None when the timeout is disabled
    pub deadline: Option<Instant>,
    pub remaining_secs: Option<u64>,
}

impl App {
    pub fn new(rows: Vec<Row>, timeout: Duration) -> Self {
        let deadline = if timeout.is_zero() {
            None
        } else {
            let deadline = Instant::now().checked_add(timeout);
            if deadline.is_none() {
                tracing::warn!("Timeout of {}s is out of range, running without one", timeout.as_secs());
            }
            deadline
        };

        Self {
            table: MealTable::new(rows),
            popup: Popup::None,
            selected_row: 0,
            selected_field: EditableField::What,
            status_message: None,
            status_message_time: None,
            deadline,
            remaining_secs: deadline.map(|_| timeout.as_secs()),
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key<H: TableHost + ?Sized>(&mut self, key: KeyEvent, host: &mut H) {
        // Handle popups first
        if self.popup != Popup::None {
            self.handle_popup_key(key, host);
        } else {
            self.handle_edit_key(key, host);
        }
    }

    fn handle_edit_key<H: TableHost + ?Sized>(&mut self, key: KeyEvent, host: &mut H) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => self.table.submit(host),
            KeyCode::F(2) => self.table.submit(host),
            KeyCode::Char('c') if ctrl => self.popup = Popup::ConfirmCancel,
            KeyCode::Esc => self.popup = Popup::ConfirmCancel,
            KeyCode::F(1) => self.popup = Popup::Help,

            KeyCode::Up => self.move_row(false),
            KeyCode::Down => self.move_row(true),
            KeyCode::Tab | KeyCode::Right => self.selected_field = self.selected_field.next(),
            KeyCode::BackTab | KeyCode::Left => self.selected_field = self.selected_field.prev(),
            KeyCode::Enter => {
                // Note is the last column, continue on the next day
                if self.selected_field == EditableField::Note {
                    self.move_row(true);
                }
                self.selected_field = self.selected_field.next();
            }

            KeyCode::Char('u') if ctrl => {
                self.table
                    .set_field(self.selected_row, self.selected_field, String::new());
            }
            KeyCode::Backspace => {
                self.table.edit_field(self.selected_row, self.selected_field, |old| {
                    let mut value = old.to_string();
                    value.pop();
                    value
                });
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.table.edit_field(self.selected_row, self.selected_field, |old| {
                    let mut value = old.to_string();
                    value.push(c);
                    value
                });
            }
            _ => {}
        }
    }

    fn handle_popup_key<H: TableHost + ?Sized>(&mut self, key: KeyEvent, host: &mut H) {
        match self.popup {
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
            }
            Popup::ConfirmCancel => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.popup = Popup::None;
                    self.table.cancel(host);
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.popup = Popup::None;
                    self.set_status("Still editing");
                }
                _ => {}
            },
            Popup::None => {}
        }
    }

    fn move_row(&mut self, down: bool) {
        if self.table.is_empty() {
            return;
        }
        let len = self.table.len();
        self.selected_row = if down {
            (self.selected_row + 1) % len
        } else {
            self.selected_row.checked_sub(1).unwrap_or(len - 1)
        };
    }

    pub fn tick<H: TableHost + ?Sized>(&mut self, host: &mut H) {
        self.tick_at(Instant::now(), host)
    }

    /// Advance timers as of `now`; an expired form is cancelled
    pub fn tick_at<H: TableHost + ?Sized>(&mut self, now: Instant, host: &mut H) {
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(now);
            self.remaining_secs = Some(remaining.as_secs());

            if remaining.is_zero() {
                tracing::info!("Meal input timed out");
                self.deadline = None;
                self.popup = Popup::None;
                self.table.cancel(host);
            }
        }

        // Clear status message after a few seconds
        if let Some(time) = self.status_message_time {
            if now.saturating_duration_since(time).as_secs() >= STATUS_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn selected_value(&self) -> &str {
        self.table
            .rows()
            .get(self.selected_row)
            .map(|row| row.get(self.selected_field))
            .unwrap_or("")
    }
}
