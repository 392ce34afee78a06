//! Editable row table
//!
//! Holds the rows handed over by the host and reports back through two
//! callbacks. Every operation here is total.

use serde::{Deserialize, Serialize};

use super::{EditableField, Row};

/// Payload of the submit callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub submitted: bool,
    pub rows: Vec<Row>,
}

/// Receiver of the table's two callbacks
pub trait TableHost {
    fn on_cancel(&mut self);
    fn on_submit(&mut self, submission: Submission);
}

#[derive(Debug, Clone)]
pub struct MealTable {
    rows: Vec<Row>,
}

impl MealTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace row `index` with a copy carrying the new value
    pub fn set_field(&mut self, index: usize, field: EditableField, value: String) {
        if let Some(row) = self.rows.get(index) {
            let updated = row.with_field(field, value);
            self.rows[index] = updated;
        }
    }

    /// Derive the new value from the current one, then `set_field`
    pub fn edit_field<F>(&mut self, index: usize, field: EditableField, f: F)
    where
        F: FnOnce(&str) -> String,
    {
        if let Some(row) = self.rows.get(index) {
            let value = f(row.get(field));
            self.set_field(index, field, value);
        }
    }

    pub fn cancel<H: TableHost + ?Sized>(&self, host: &mut H) {
        tracing::debug!("Meal table cancelled");
        host.on_cancel();
    }

    pub fn submit<H: TableHost + ?Sized>(&self, host: &mut H) {
        tracing::debug!("Meal table submitted with {} rows", self.rows.len());
        host.on_submit(Submission {
            submitted: true,
            rows: self.rows.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::{week_rows, WeeklyMeals};

    #[derive(Default)]
    struct Recorder {
        cancels: usize,
        submissions: Vec<Submission>,
    }

    impl TableHost for Recorder {
        fn on_cancel(&mut self) {
            self.cancels += 1;
        }

        fn on_submit(&mut self, submission: Submission) {
            self.submissions.push(submission);
        }
    }

    fn table() -> MealTable {
        MealTable::new(week_rows(&WeeklyMeals::new()))
    }

    #[test]
    fn test_set_field_touches_only_target() {
        let mut table = table();
        let before = table.rows().to_vec();

        table.set_field(2, EditableField::Where, "food court".to_string());

        for (i, (old, new)) in before.iter().zip(table.rows()).enumerate() {
            if i == 2 {
                assert_eq!(new.place, "food court");
                assert_eq!(new.what, old.what);
                assert_eq!(new.time, old.time);
                assert_eq!(new.note, old.note);
                assert_eq!(new.day_key, old.day_key);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn test_set_field_out_of_range_is_noop() {
        let mut table = table();
        let before = table.rows().to_vec();
        table.set_field(99, EditableField::What, "ghost".to_string());
        assert_eq!(table.rows(), before.as_slice());
    }

    #[test]
    fn test_edit_field_keystrokes() {
        let mut table = table();
        for c in "tacos".chars() {
            table.edit_field(4, EditableField::What, |old| format!("{}{}", old, c));
        }
        assert_eq!(table.rows()[4].what, "tacos");

        table.edit_field(4, EditableField::What, |old| {
            let mut s = old.to_string();
            s.pop();
            s
        });
        assert_eq!(table.rows()[4].what, "taco");
    }

    #[test]
    fn test_submit_passes_rows_through() {
        let mut table = table();
        table.set_field(0, EditableField::What, "  bibimbap ".to_string());
        table.set_field(6, EditableField::Note, "12000".to_string());

        let mut host = Recorder::default();
        table.submit(&mut host);

        assert_eq!(host.cancels, 0);
        assert_eq!(host.submissions.len(), 1);
        let submission = &host.submissions[0];
        assert!(submission.submitted);
        // untrimmed, exactly as held
        assert_eq!(submission.rows, table.rows());
    }

    #[test]
    fn test_submission_json_shape() {
        let submission = Submission {
            submitted: true,
            rows: table().rows().to_vec(),
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["submitted"], true);
        assert_eq!(value["rows"].as_array().unwrap().len(), 7);
        assert_eq!(value["rows"][0]["dayKey"], "mon");
    }

    #[test]
    fn test_cancel_leaves_rows_alone() {
        let mut table = table();
        table.set_field(1, EditableField::Time, "08:15".to_string());
        let before = table.rows().to_vec();

        let mut host = Recorder::default();
        table.cancel(&mut host);

        assert_eq!(host.cancels, 1);
        assert!(host.submissions.is_empty());
        assert_eq!(table.rows(), before.as_slice());
    }
}
