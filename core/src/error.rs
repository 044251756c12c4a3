//! Error taxonomy for the allocation pipeline.
//!
//! Validation failures carry messages phrased for end users — the
//! caller is expected to show them verbatim. An empty allocation
//! result is NOT an error; callers detect it by checking emptiness.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("The {table} file is empty")]
    EmptyTable { table: &'static str },

    #[error("The {table} file is missing required columns: {columns}")]
    MissingColumns { table: &'static str, columns: String },

    #[error("Dates must be in DD.MM.YYYY or YYYY-MM-DD format (got '{value}')")]
    BadDateFormat { value: String },

    #[error("Slot times must be in HH:MM format (got '{value}')")]
    BadTimeFormat { value: String },

    #[error("Could not parse delta value '{value}' as a number")]
    BadDelta { value: String },

    #[error("No activity rows match the selected skill groups")]
    NoRowsForSkillGroups,

    #[error("Could not parse any date/time in the {table} file")]
    NoParseableTimestamps { table: &'static str },

    #[error("Select at least one skill group")]
    EmptySkillGroups,

    #[error("Minimum interval must be a positive number of minutes")]
    BadMinInterval,

    #[error("The by-delta strategy requires a slot file")]
    MissingSlots,

    #[error("Select an activity for mass assignment")]
    MissingMassActivity,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AllocResult<T> = Result<T, AllocError>;

impl AllocError {
    /// True for input-validation failures the caller should surface to
    /// the end user as-is (as opposed to internal processing failures).
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            AllocError::Database(_) | AllocError::Serialization(_) | AllocError::Other(_)
        )
    }
}
