use crate::agenda::{
    annotate, filter_for_display, generate_window, CalendarDay, Clock, SystemClock,
};
use crate::config::Config;
use crate::model::{parse_day, Task, TaskList};
use crate::storage::{init_project_tasks, load_tasks, locate_tasks, TaskLocation};
use crate::ui;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;

pub fn init() -> Result<()> {
    let cwd = env::current_dir()?;
    let location = init_project_tasks(&cwd, SystemClock.today())?;
    println!("Initialized tasks at {}", location.describe());
    Ok(())
}

pub fn days(config: Config, date: Option<String>) -> Result<()> {
    let clock = SystemClock;
    let center = resolve_date(date.as_deref(), &clock)?;
    let (tasks, _) = load_current_tasks(&config, &clock)?;
    let window = generate_window(center, config.window_radius, &clock)
        .with_context(|| format!("building day strip around {}", center))?;
    for day in annotate(window, &tasks) {
        println!("{}", format_day(&day));
    }
    Ok(())
}

pub fn list(config: Config, date: Option<String>) -> Result<()> {
    let clock = SystemClock;
    let selected = resolve_date(date.as_deref(), &clock)?;
    let (tasks, location) = load_current_tasks(&config, &clock)?;
    let filter = config.default_filter;
    println!(
        "{} • {} • {}",
        selected.format("%a %Y-%m-%d"),
        filter.label(),
        location.describe()
    );
    let rows = filter_for_display(&tasks, selected, filter);
    if rows.is_empty() {
        println!("  (no tasks)");
    }
    for task in rows {
        print_task(task);
    }
    Ok(())
}

pub fn tui(config: Config) -> Result<()> {
    let clock = SystemClock;
    let (tasks, location) = load_current_tasks(&config, &clock)?;
    ui::run(tasks, location, &config, clock)
}

fn load_current_tasks(config: &Config, clock: &impl Clock) -> Result<(TaskList, TaskLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_tasks(&cwd, config.tasks_file.as_deref());
    log::debug!("task source: {}", location.describe());
    let tasks = load_tasks(&location, clock.today())?;
    if tasks.is_empty() {
        log::warn!("{} contains no tasks", location.describe());
    }
    Ok((tasks, location))
}

fn resolve_date(input: Option<&str>, clock: &impl Clock) -> Result<NaiveDate> {
    match input.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(parse_day(raw)?),
        _ => Ok(clock.today()),
    }
}

fn format_day(day: &CalendarDay) -> String {
    let marker = match (day.is_today, day.is_selected) {
        (true, true) => "*>",
        (true, false) => "* ",
        (false, true) => " >",
        (false, false) => "  ",
    };
    let badge = if day.unfinished_count > 0 {
        format!("({})", day.unfinished_count)
    } else {
        String::new()
    };
    format!("{} {} {}", marker, day.date.format("%a %Y-%m-%d"), badge)
        .trim_end()
        .to_string()
}

fn print_task(task: &Task) {
    println!("  - [{}] {} {}", task.id, task.icon, task.title);
    if !task.subtitle.is_empty() {
        println!("    {}", task.subtitle);
    }
    println!("    {} • {}", task.time, task.status.label());
}
