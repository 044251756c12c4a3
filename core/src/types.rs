//! Shared primitive types, the activity classification rules, and the
//! tabular header check both normalizers rely on.
//!
//! RULE: All label matching (trim, lowercase, substring) lives here.
//! No other module inspects raw activity/functional-group strings.

use crate::error::{AllocError, AllocResult};
use serde::{Deserialize, Serialize};

/// A stable, opaque identifier for an agent (the `masterId` column).
pub type AgentId = String;

/// The two line activities an agent can be redirected between.
///
/// The Russian display labels exist only at the boundary — internally
/// everything works with this enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    InboundCalls,
    Chat,
}

impl Activity {
    /// Display label as it appears in uploaded files and in the output table.
    pub const fn label(self) -> &'static str {
        match self {
            Activity::InboundCalls => "Входящие звонки",
            Activity::Chat => "Чат",
        }
    }

    /// The activity an agent is pulled *from* when this one is the target.
    pub const fn opposite(self) -> Activity {
        match self {
            Activity::InboundCalls => Activity::Chat,
            Activity::Chat => Activity::InboundCalls,
        }
    }

    /// Parse an exact boundary label ("Входящие звонки" / "Чат").
    pub fn from_label(label: &str) -> Option<Activity> {
        match label.trim() {
            "Входящие звонки" => Some(Activity::InboundCalls),
            "Чат" => Some(Activity::Chat),
            _ => None,
        }
    }

    /// Substring classification of a normalized (lowercased) main-activity
    /// label: "чат занятость" matches Chat, "входящие звонки 2" matches
    /// InboundCalls.
    pub fn matches_label(self, main_activity_lower: &str) -> bool {
        match self {
            Activity::InboundCalls => main_activity_lower.contains("входящие звонки"),
            Activity::Chat => main_activity_lower.contains("чат"),
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trim + lowercase, the single normalization applied to every raw label
/// before any matching.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Only omni-qualified agents are eligible for cross-skill redirection.
/// Qualification is a substring check on the normalized functional group.
pub fn is_omni(func_lower: &str) -> bool {
    func_lower.contains("omni")
}

/// Check that `present` covers every required column of `required`.
/// Callers run this against a file header before deserializing rows.
pub fn check_columns(
    table: &'static str,
    present: &[String],
    required: &[&str],
) -> AllocResult<()> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|c| !present.iter().any(|p| p == *c))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AllocError::MissingColumns {
            table,
            columns: missing.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for act in [Activity::InboundCalls, Activity::Chat] {
            assert_eq!(Activity::from_label(act.label()), Some(act));
        }
        assert_eq!(Activity::from_label("  Чат  "), Some(Activity::Chat));
        assert_eq!(Activity::from_label("Исходящие"), None);
    }

    #[test]
    fn substring_classification() {
        assert!(Activity::Chat.matches_label("чат (осн.)"));
        assert!(Activity::InboundCalls.matches_label("входящие звонки, линия 1"));
        assert!(!Activity::InboundCalls.matches_label("чат"));
        assert!(!Activity::Chat.matches_label("обед"));
    }

    #[test]
    fn omni_marker() {
        assert!(is_omni(normalize_label("  OMNI-чат  ").as_str()));
        assert!(!is_omni("входящая линия"));
    }

    #[test]
    fn header_check_works_for_any_table() {
        let present = vec!["Дата".to_string(), "Дельта".to_string()];
        match check_columns("slots", &present, crate::slots::SLOT_COLUMNS) {
            Err(AllocError::MissingColumns { table, columns }) => {
                assert_eq!(table, "slots");
                assert_eq!(columns, "Время");
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}
