//! Host side of the meal table: the stored week plus the callback hooks

use std::path::{Path, PathBuf};

use crate::meals::table::{Submission, TableHost};
use crate::meals::{rows_to_weekly_meals, week_rows, MealError, Row, WeeklyMeals};

/// How the last editor run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cancelled,
    Submitted(Submission),
}

pub struct Session {
    path: PathBuf,
    pub meals: WeeklyMeals,
    outcome: Option<Outcome>,
    /// Apply submissions to `meals`; off when the host only forwards them
    store_submissions: bool,
}

impl Session {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            meals: WeeklyMeals::new(),
            outcome: None,
            store_submissions: true,
        }
    }

    /// Session that records the outcome but never applies it
    pub fn forwarding(path: PathBuf) -> Self {
        Self {
            store_submissions: false,
            ..Self::new(path)
        }
    }

    /// Read stored meals; a missing file is an empty week
    pub async fn load(path: PathBuf) -> Result<Self, MealError> {
        let mut session = Self::new(path);
        session.meals = match tokio::fs::read_to_string(&session.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|source| MealError::Parse {
                path: session.path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored meals at {}", session.path.display());
                WeeklyMeals::new()
            }
            Err(source) => {
                return Err(MealError::Read {
                    path: session.path.display().to_string(),
                    source,
                })
            }
        };
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> Vec<Row> {
        week_rows(&self.meals)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn take_outcome(&mut self) -> Option<Outcome> {
        self.outcome.take()
    }

    pub fn reset(&mut self) {
        self.meals.clear();
    }

    pub async fn save(&self) -> Result<(), MealError> {
        let write_err = |source| MealError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(&self.meals).map_err(|source| {
            MealError::Serialize {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        tokio::fs::write(&self.path, content).await.map_err(write_err)?;
        tracing::info!("Saved weekly meals to {}", self.path.display());
        Ok(())
    }
}

impl TableHost for Session {
    fn on_cancel(&mut self) {
        tracing::info!("Meal input cancelled");
        self.outcome = Some(Outcome::Cancelled);
    }

    fn on_submit(&mut self, submission: Submission) {
        if !submission.submitted {
            tracing::warn!("Ignoring submission without submitted flag");
            self.outcome = Some(Outcome::Cancelled);
            return;
        }
        if self.store_submissions {
            self.meals = rows_to_weekly_meals(&submission.rows);
        }
        tracing::info!("Meal input submitted ({} rows)", submission.rows.len());
        self.outcome = Some(Outcome::Submitted(submission));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::table::MealTable;
    use crate::meals::{EditableField, MealEntry};

    fn temp_store(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mealweek-test-{}-{}", name, std::process::id()))
            .join("meals.json")
    }

    #[test]
    fn test_submit_stores_trimmed_meals() {
        let mut session = Session::new(temp_store("submit"));
        let mut table = MealTable::new(session.rows());
        table.set_field(0, EditableField::What, " kimchi stew ".to_string());

        table.submit(&mut session);

        assert!(session.is_finished());
        assert_eq!(session.meals["mon"].what, "kimchi stew");
        match session.outcome() {
            Some(Outcome::Submitted(sub)) => assert_eq!(sub.rows[0].what, " kimchi stew "),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_cancel_keeps_stored_meals() {
        let mut session = Session::new(temp_store("cancel"));
        session.meals.insert(
            "fri".to_string(),
            MealEntry {
                what: "pizza".to_string(),
                ..MealEntry::default()
            },
        );
        let before = session.meals.clone();

        let mut table = MealTable::new(session.rows());
        table.set_field(4, EditableField::What, "salad".to_string());
        table.cancel(&mut session);

        assert_eq!(session.take_outcome(), Some(Outcome::Cancelled));
        assert_eq!(session.meals, before);
    }

    #[test]
    fn test_unflagged_submission_counts_as_cancel() {
        let mut session = Session::new(temp_store("unflagged"));
        let rows = session.rows();
        session.on_submit(Submission {
            submitted: false,
            rows,
        });
        assert_eq!(session.outcome(), Some(&Outcome::Cancelled));
        assert!(session.meals.is_empty());
    }

    #[test]
    fn test_forwarding_session_does_not_store() {
        let mut session = Session::forwarding(temp_store("forward"));
        let table = MealTable::new(session.rows());
        table.submit(&mut session);
        assert!(matches!(session.outcome(), Some(Outcome::Submitted(_))));
        assert!(session.meals.is_empty());
    }

    #[tokio::test]
    async fn test_save_load_and_reset() {
        let path = temp_store("persist");
        let missing = Session::load(path.clone()).await.unwrap();
        assert!(missing.meals.is_empty());

        let mut session = Session::new(path.clone());
        session.meals.insert(
            "sun".to_string(),
            MealEntry {
                what: "brunch".to_string(),
                place: "home".to_string(),
                time: "11:00".to_string(),
                note: "".to_string(),
            },
        );
        session.save().await.unwrap();

        let mut loaded = Session::load(path.clone()).await.unwrap();
        assert_eq!(loaded.meals, session.meals);
        assert_eq!(loaded.rows()[6].place, "home");

        loaded.reset();
        loaded.save().await.unwrap();
        let cleared = Session::load(path.clone()).await.unwrap();
        assert!(cleared.meals.is_empty());

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
