//! Weekly meal log model
//!
//! Rows are what the editor table works on, `WeeklyMeals` is what the
//! session keeps between runs.

pub mod table;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Fixed week, in display order
pub const DAYS: [(&str, &str); 7] = [
    ("mon", "Monday"),
    ("tue", "Tuesday"),
    ("wed", "Wednesday"),
    ("thu", "Thursday"),
    ("fri", "Friday"),
    ("sat", "Saturday"),
    ("sun", "Sunday"),
];

/// Longest summary handed to other tools
const SUMMARY_MAX_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum MealError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize meals for {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("day key `{0}` appears more than once")]
    DuplicateDayKey(String),
}

/// One day's entry as shown in the editor table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub day_key: String,
    pub day_label: String,
    #[serde(default)]
    pub what: String,
    #[serde(default, rename = "where")]
    pub place: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub note: String,
}

impl Row {
    pub fn get(&self, field: EditableField) -> &str {
        match field {
            EditableField::What => &self.what,
            EditableField::Where => &self.place,
            EditableField::Time => &self.time,
            EditableField::Note => &self.note,
        }
    }

    /// Copy of this row with one field replaced
    pub fn with_field(&self, field: EditableField, value: String) -> Self {
        let mut row = self.clone();
        match field {
            EditableField::What => row.what = value,
            EditableField::Where => row.place = value,
            EditableField::Time => row.time = value,
            EditableField::Note => row.note = value,
        }
        row
    }
}

/// The four free-text columns. Day key and label are never editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    What,
    Where,
    Time,
    Note,
}

impl EditableField {
    pub const ALL: [EditableField; 4] = [
        EditableField::What,
        EditableField::Where,
        EditableField::Time,
        EditableField::Note,
    ];

    pub fn title(self) -> &'static str {
        match self {
            EditableField::What => "What",
            EditableField::Where => "Where",
            EditableField::Time => "Time",
            EditableField::Note => "Note",
        }
    }

    pub fn next(self) -> Self {
        match self {
            EditableField::What => EditableField::Where,
            EditableField::Where => EditableField::Time,
            EditableField::Time => EditableField::Note,
            EditableField::Note => EditableField::What,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EditableField::What => EditableField::Note,
            EditableField::Where => EditableField::What,
            EditableField::Time => EditableField::Where,
            EditableField::Note => EditableField::Time,
        }
    }
}

/// Stored entry for a single day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    #[serde(default)]
    pub what: String,
    #[serde(default, rename = "where")]
    pub place: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub note: String,
}

/// Day key -> entry. Missing days read as empty entries.
pub type WeeklyMeals = BTreeMap<String, MealEntry>;

/// Build the seven editor rows from stored meals, in week order
pub fn week_rows(meals: &WeeklyMeals) -> Vec<Row> {
    DAYS.iter()
        .map(|(key, label)| {
            let entry = meals.get(*key).cloned().unwrap_or_default();
            Row {
                day_key: key.to_string(),
                day_label: label.to_string(),
                what: entry.what,
                place: entry.place,
                time: entry.time,
                note: entry.note,
            }
        })
        .collect()
}

/// Convert submitted rows back into stored meals, trimming every field
pub fn rows_to_weekly_meals(rows: &[Row]) -> WeeklyMeals {
    rows.iter()
        .map(|r| {
            (
                r.day_key.clone(),
                MealEntry {
                    what: r.what.trim().to_string(),
                    place: r.place.trim().to_string(),
                    time: r.time.trim().to_string(),
                    note: r.note.trim().to_string(),
                },
            )
        })
        .collect()
}

/// Render stored meals as a markdown table
pub fn format_meal_table(meals: &WeeklyMeals) -> String {
    let mut out = String::from("| Day | What | Where | Time | Note |\n|---|---|---|---|---|\n");
    let lines: Vec<String> = DAYS
        .iter()
        .map(|(key, label)| {
            let entry = meals.get(*key).cloned().unwrap_or_default();
            format!(
                "| {} | {} | {} | {} | {} |",
                label, entry.what, entry.place, entry.time, entry.note
            )
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

/// One-line digest: `Label:what@where` for each day with something logged.
/// Empty fields stay empty, so a time-only day reads `Label:@`.
pub fn summarize_meals(meals: &WeeklyMeals) -> String {
    let picks: Vec<String> = DAYS
        .iter()
        .filter_map(|(key, label)| {
            let entry = meals.get(*key)?;
            if entry.what.is_empty() && entry.place.is_empty() && entry.time.is_empty() {
                return None;
            }
            Some(format!("{}:{}@{}", label, entry.what, entry.place))
        })
        .collect();

    picks.join(" / ").chars().take(SUMMARY_MAX_CHARS).collect()
}

/// Reject row lists where a day key repeats
pub fn check_unique_keys(rows: &[Row]) -> Result<(), MealError> {
    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.day_key.as_str()) {
            return Err(MealError::DuplicateDayKey(row.day_key.clone()));
        }
    }
    Ok(())
}

/// Load a JSON array of rows supplied by the host
pub async fn load_rows(path: &Path) -> Result<Vec<Row>, MealError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MealError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let rows: Vec<Row> = serde_json::from_str(&content).map_err(|source| MealError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    check_unique_keys(&rows)?;
    tracing::debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
