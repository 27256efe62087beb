use crate::model::TaskList;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_DIR: &str = ".taskday";
const TASKS_FILE: &str = "tasks.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    Explicit,
    Project,
    Global,
    /// No file found; the built-in demo tasks.
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    pub path: Option<PathBuf>,
    pub scope: TaskScope,
}

impl TaskScope {
    pub fn label(&self) -> &'static str {
        match self {
            TaskScope::Explicit => "file",
            TaskScope::Project => "project",
            TaskScope::Global => "global",
            TaskScope::Sample => "sample",
        }
    }
}

impl TaskLocation {
    pub fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("{} ({})", path.display(), self.scope.label()),
            None => "built-in sample tasks".to_string(),
        }
    }
}

/// Writes the sample tasks to `.taskday/tasks.yml` under `dir` unless a file is already there.
pub fn init_project_tasks(dir: &Path, today: NaiveDate) -> Result<TaskLocation> {
    let project_dir = dir.join(PROJECT_DIR);
    fs::create_dir_all(&project_dir)
        .with_context(|| format!("creating {:?}", project_dir))?;
    let path = project_dir.join(TASKS_FILE);
    if !path.exists() {
        let serialized =
            serde_yaml::to_string(&TaskList::sample(today)).context("serializing tasks")?;
        fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    }
    Ok(TaskLocation {
        path: Some(path),
        scope: TaskScope::Project,
    })
}

/// Picks the task file: an explicit path, then a project file above `start`, then the global one.
pub fn locate_tasks(start: &Path, explicit: Option<&Path>) -> TaskLocation {
    if let Some(path) = explicit {
        return TaskLocation {
            path: Some(path.to_path_buf()),
            scope: TaskScope::Explicit,
        };
    }
    if let Some(project_path) = find_project_tasks(start) {
        return TaskLocation {
            path: Some(project_path),
            scope: TaskScope::Project,
        };
    }
    match global_tasks_path() {
        Some(path) if path.exists() => TaskLocation {
            path: Some(path),
            scope: TaskScope::Global,
        },
        _ => TaskLocation {
            path: None,
            scope: TaskScope::Sample,
        },
    }
}

pub fn load_tasks(location: &TaskLocation, today: NaiveDate) -> Result<TaskList> {
    let path = match &location.path {
        Some(path) => path,
        None => {
            log::warn!("no task file found, using sample tasks");
            return Ok(TaskList::sample(today));
        }
    };
    if location.scope == TaskScope::Explicit && !path.exists() {
        anyhow::bail!("task file {:?} does not exist", path);
    }
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let tasks: TaskList = serde_yaml::from_str(&data)
        .with_context(|| format!("parsing task file {:?}", path))?;
    log::debug!("loaded {} tasks from {:?}", tasks.len(), path);
    Ok(tasks)
}

fn find_project_tasks(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(TASKS_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_tasks_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taskday").map(|dirs| dirs.data_dir().join(TASKS_FILE))
}
