use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub type TaskId = String;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub subtitle: String,
    /// Display label only, never parsed.
    pub time: String,
    pub status: TaskStatus,
    pub icon: String,
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    ToDo,
    InProgress,
    Completed,
}

/// Ordered task collection with unique ids.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(try_from = "RawTaskList")]
pub struct TaskList {
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct RawTaskList {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    #[error("window radius must be non-negative, got {0}")]
    InvalidRadius(i64),
    #[error("date window around {0} leaves the supported calendar range")]
    DateOutOfRange(NaiveDate),
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(TaskId),
    #[error("unknown task status: {0}")]
    UnknownStatus(String),
    #[error("unknown status filter: {0}")]
    UnknownFilter(String),
    #[error("invalid date (use YYYY-MM-DD): {0}")]
    InvalidDate(String),
}

impl TaskStatus {
    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To-do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AgendaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "to-do" => Ok(TaskStatus::ToDo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(AgendaError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = AgendaError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl StatusFilter {
    /// Tab bar order.
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::ToDo,
        StatusFilter::InProgress,
        StatusFilter::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::ToDo => "To do",
            StatusFilter::InProgress => "In Progress",
            StatusFilter::Completed => "Completed",
        }
    }

    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::ToDo => status == TaskStatus::ToDo,
            StatusFilter::InProgress => status == TaskStatus::InProgress,
            StatusFilter::Completed => status == TaskStatus::Done,
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = AgendaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "all" => Ok(StatusFilter::All),
            "todo" | "to-do" => Ok(StatusFilter::ToDo),
            "in-progress" | "inprogress" => Ok(StatusFilter::InProgress),
            "completed" | "done" => Ok(StatusFilter::Completed),
            _ => Err(AgendaError::UnknownFilter(s.to_string())),
        }
    }
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Result<Self, AgendaError> {
        let mut seen = HashSet::new();
        for task in &tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(AgendaError::DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(TaskList { tasks })
    }

    /// The demo tasks shown when no task file exists, all dated `day`.
    pub fn sample(day: NaiveDate) -> Self {
        let task = |id: &str, title: &str, subtitle: &str, time: &str, status, icon: &str| Task {
            id: id.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            time: time.into(),
            status,
            icon: icon.into(),
            date: day,
        };
        TaskList {
            tasks: vec![
                task(
                    "1",
                    "Market Research",
                    "Grocery shopping app design",
                    "10:00 AM",
                    TaskStatus::Done,
                    "🛒",
                ),
                task(
                    "2",
                    "Competitive Analysis",
                    "Grocery shopping app design",
                    "12:00 PM",
                    TaskStatus::InProgress,
                    "🛒",
                ),
                task(
                    "3",
                    "Create Low-fidelity Wireframe",
                    "Uber Eats redesign challenge",
                    "07:00 PM",
                    TaskStatus::ToDo,
                    "🎨",
                ),
                task(
                    "4",
                    "How to pitch a Design Sprint",
                    "About design sprint",
                    "09:00 PM",
                    TaskStatus::ToDo,
                    "📊",
                ),
            ],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TryFrom<RawTaskList> for TaskList {
    type Error = AgendaError;

    fn try_from(raw: RawTaskList) -> Result<Self, Self::Error> {
        TaskList::new(raw.tasks)
    }
}

/// Parses a `YYYY-MM-DD` day.
pub fn parse_day(input: &str) -> Result<NaiveDate, AgendaError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AgendaError::InvalidDate(input.trim().to_string()))
}

/// Accepts a plain day or a timestamp, truncating the latter to its calendar day.
fn normalize_day(input: &str) -> Result<NaiveDate, AgendaError> {
    let raw = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y.%m.%d@%H:%M") {
        return Ok(dt.date());
    }
    Err(AgendaError::InvalidDate(raw.to_string()))
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize_day(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut tasks = TaskList::sample(day(2024, 5, 1)).tasks;
        tasks[1].id = "1".into();
        assert_eq!(
            TaskList::new(tasks),
            Err(AgendaError::DuplicateTaskId("1".into()))
        );
    }

    #[test]
    fn status_filter_parses_cli_spellings() {
        assert_eq!("All".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("to-do".parse::<StatusFilter>(), Ok(StatusFilter::ToDo));
        assert_eq!("todo".parse::<StatusFilter>(), Ok(StatusFilter::ToDo));
        assert_eq!(
            "In Progress".parse::<StatusFilter>(),
            Ok(StatusFilter::InProgress)
        );
        assert_eq!("done".parse::<StatusFilter>(), Ok(StatusFilter::Completed));
        assert_eq!(
            "later".parse::<StatusFilter>(),
            Err(AgendaError::UnknownFilter("later".into()))
        );
    }

    #[test]
    fn filter_cycle_wraps_in_tab_order() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::ToDo);
        assert_eq!(StatusFilter::Completed.next(), StatusFilter::All);
        assert_eq!(StatusFilter::All.prev(), StatusFilter::Completed);
        let labels: Vec<_> = StatusFilter::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(labels, ["All", "To do", "In Progress", "Completed"]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "blocked".parse::<TaskStatus>(),
            Err(AgendaError::UnknownStatus("blocked".into()))
        );
        let yaml = "tasks:\n  - {id: a, title: t, subtitle: s, time: '', status: blocked, icon: x, date: 2024-05-01}\n";
        let err = serde_yaml::from_str::<TaskList>(yaml).unwrap_err();
        assert!(err.to_string().contains("unknown task status: blocked"));

        let yaml = "tasks:\n  - {id: a, title: t, subtitle: s, time: '', status: in-progress, icon: x, date: 2024-05-01}\n";
        let list = serde_yaml::from_str::<TaskList>(yaml).unwrap();
        assert_eq!(
            list.iter().next().map(|t| t.status),
            Some(TaskStatus::InProgress)
        );
    }

    #[test]
    fn timestamps_are_truncated_to_their_day() {
        assert_eq!(normalize_day("2024-05-01"), Ok(day(2024, 5, 1)));
        assert_eq!(
            normalize_day("2024-05-01T23:30:00+02:00"),
            Ok(day(2024, 5, 1))
        );
        assert_eq!(normalize_day("2024.05.02@07:15"), Ok(day(2024, 5, 2)));
        assert!(normalize_day("May 1st").is_err());
    }

    #[test]
    fn yaml_task_list_round_trips_through_validation() {
        let yaml = r#"
tasks:
  - id: "1"
    title: Market Research
    subtitle: Grocery shopping app design
    time: "10:00 AM"
    status: done
    icon: "🛒"
    date: 2024-05-01
  - id: "1"
    title: Duplicate
    subtitle: ""
    time: ""
    status: to-do
    icon: ""
    date: 2024-05-01
"#;
        let err = serde_yaml::from_str::<TaskList>(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate task id"));

        let list = TaskList::sample(day(2024, 5, 1));
        let text = serde_yaml::to_string(&list).unwrap();
        assert!(text.contains("status: in-progress"));
        let back: TaskList = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, list);
    }
}
