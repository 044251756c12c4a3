//! alloc-runner: headless allocation runner for timeflow.
//!
//! Usage:
//!   alloc-runner --activity activity.csv --slots slots.csv \
//!       --skill-groups "Группа 1,Группа 2" --strategy by_delta \
//!       --min-interval 30 --partial-coverage --out assignments.csv
//!   alloc-runner --activity activity.csv --skill-groups "Группа 1" \
//!       --strategy mass --mass-activity "Чат"
//!   alloc-runner --activity activity.csv --list-skills

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use timeflow_core::{
    activity::{extract_unique_skills, RawActivityRow, ACTIVITY_COLUMNS},
    allocator::AssignmentTask,
    options::{RunOptions, Strategy, DEFAULT_MIN_INTERVAL},
    slots::{RawSlotRow, SLOT_COLUMNS},
    store::ResultStore,
    types::{check_columns, Activity},
};

/// One row of the output CSV, in the fixed export column order.
#[derive(Serialize)]
struct OutputRow {
    task_id: u32,
    #[serde(rename = "masterId")]
    master_id: String,
    date_start: String,
    date_end: String,
    date_choice: &'static str,
    #[serde(rename = "Категория активности")]
    category: &'static str,
    #[serde(rename = "Назначенная активность")]
    assigned_activity: String,
    description: &'static str,
    education_program: &'static str,
    time_choice: &'static str,
    slot_start: String,
    slot_end: String,
    #[serde(rename = "назначено минут")]
    assigned_minutes: i64,
}

impl From<&AssignmentTask> for OutputRow {
    fn from(task: &AssignmentTask) -> Self {
        OutputRow {
            task_id: task.task_id,
            master_id: task.agent_id.clone(),
            date_start: task.date_start.format("%d.%m.%Y").to_string(),
            date_end: task.date_end.format("%d.%m.%Y").to_string(),
            date_choice: AssignmentTask::DATE_CHOICE,
            category: AssignmentTask::CATEGORY,
            assigned_activity: task.assigned_activity.label().to_string(),
            description: "",
            education_program: "",
            time_choice: AssignmentTask::TIME_CHOICE,
            slot_start: task.window_start.format("%H:%M:%S").to_string(),
            slot_end: task.window_end.format("%H:%M:%S").to_string(),
            assigned_minutes: task.assigned_minutes,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let activity_path = match str_arg(&args, "--activity") {
        Some(p) => p,
        None => {
            print_usage();
            bail!("--activity is required");
        }
    };

    let activity_rows = read_activity(&activity_path)?;

    if args.iter().any(|a| a == "--list-skills") {
        for skill in extract_unique_skills(&activity_rows) {
            println!("{skill}");
        }
        return Ok(());
    }

    let skill_groups: Vec<String> = str_arg(&args, "--skill-groups")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let strategy = match str_arg(&args, "--strategy").as_deref() {
        None | Some("by_delta") => Strategy::ByDelta,
        Some("mass") => Strategy::Mass,
        Some(other) => bail!("unknown strategy '{other}' (expected by_delta or mass)"),
    };

    let options = match strategy {
        Strategy::ByDelta => RunOptions::by_delta(
            skill_groups,
            parse_arg(&args, "--min-interval", DEFAULT_MIN_INTERVAL),
            args.iter().any(|a| a == "--partial-coverage"),
        ),
        Strategy::Mass => {
            let label = str_arg(&args, "--mass-activity")
                .context("--mass-activity is required for the mass strategy")?;
            let target = Activity::from_label(&label)
                .with_context(|| format!("unknown mass activity '{label}'"))?;
            RunOptions::mass(skill_groups, target)
        }
    };

    let slot_rows = match str_arg(&args, "--slots") {
        Some(path) => Some(read_slots(&path)?),
        None => None,
    };

    let tasks = timeflow_core::run_checked(&activity_rows, slot_rows.as_deref(), &options)?;
    if tasks.is_empty() {
        println!("Нет назначений с такими параметрами.");
        return Ok(());
    }
    println!("assignments: {}", tasks.len());

    let out = str_arg(&args, "--out").unwrap_or_else(|| "assignments.csv".to_string());
    write_output(&out, &tasks)?;
    println!("written: {out}");

    if let Some(db) = str_arg(&args, "--db") {
        let store = ResultStore::open(&db)?;
        let purge_age = parse_arg(&args, "--purge-age", 3600i64);
        store.purge_older_than(chrono::Duration::seconds(purge_age))?;
        let result_id = store.save(&tasks)?;
        println!("stored: {result_id}");
    }

    Ok(())
}

fn read_activity(path: &str) -> Result<Vec<RawActivityRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open activity file {path}"))?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    check_columns("activity", &headers, ACTIVITY_COLUMNS)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<RawActivityRow>, _>>()
        .with_context(|| format!("cannot parse activity file {path}"))?;
    Ok(rows)
}

fn read_slots(path: &str) -> Result<Vec<RawSlotRow>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("cannot open slot file {path}"))?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    check_columns("slots", &headers, SLOT_COLUMNS)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<RawSlotRow>, _>>()
        .with_context(|| format!("cannot parse slot file {path}"))?;
    Ok(rows)
}

fn write_output(path: &str, tasks: &[AssignmentTask]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("cannot write {path}"))?;
    for task in tasks {
        writer.serialize(OutputRow::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

fn str_arg(args: &[String], name: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].clone())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    match str_arg(args, name) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("ignoring unparseable value '{raw}' for {name}, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_arg_reads_valid_values() {
        let a = args(&["alloc-runner", "--min-interval", "45"]);
        assert_eq!(parse_arg(&a, "--min-interval", 30i64), 45);
    }

    #[test]
    fn parse_arg_falls_back_on_unparseable_values() {
        let a = args(&["alloc-runner", "--min-interval", "abc"]);
        assert_eq!(parse_arg(&a, "--min-interval", 30i64), 30);
    }

    #[test]
    fn parse_arg_falls_back_when_missing() {
        let a = args(&["alloc-runner"]);
        assert_eq!(parse_arg(&a, "--purge-age", 3600i64), 3600);
    }
}

fn print_usage() {
    eprintln!("alloc-runner — cross-skill allocation runner");
    eprintln!();
    eprintln!("  alloc-runner --activity activity.csv --skill-groups \"A,B\" \\");
    eprintln!("      [--slots slots.csv] [--strategy by_delta|mass] \\");
    eprintln!("      [--min-interval 30] [--partial-coverage] \\");
    eprintln!("      [--mass-activity \"Чат\"] [--out assignments.csv] \\");
    eprintln!("      [--db results.db] [--purge-age 3600] [--list-skills]");
}
