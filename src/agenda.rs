//! Derived day-strip and task-list views.
//!
//! Everything here is a pure function over a [`Selection`], a [`TaskList`] and
//! a [`Clock`]; the screen recomputes on every transition instead of caching.

use crate::model::{AgendaError, StatusFilter, Task, TaskList};
use chrono::{Duration as ChronoDuration, Local, NaiveDate};

/// Source of "today". The only wall-clock input of the agenda.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_selected: bool,
    pub unfinished_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub selected_date: NaiveDate,
    pub active_filter: StatusFilter,
}

impl Selection {
    pub fn new(today: NaiveDate) -> Self {
        Selection {
            selected_date: today,
            active_filter: StatusFilter::All,
        }
    }

    pub fn select_date(self, date: NaiveDate) -> Self {
        Selection {
            selected_date: date,
            ..self
        }
    }

    pub fn select_filter(self, filter: StatusFilter) -> Self {
        Selection {
            active_filter: filter,
            ..self
        }
    }

    /// Moves the selected day; stays put at the ends of the calendar range.
    pub fn shift_date(self, days: i64) -> Self {
        ChronoDuration::try_days(days)
            .and_then(|d| self.selected_date.checked_add_signed(d))
            .map_or(self, |date| self.select_date(date))
    }

    pub fn next_filter(self) -> Self {
        self.select_filter(self.active_filter.next())
    }

    pub fn prev_filter(self) -> Self {
        self.select_filter(self.active_filter.prev())
    }
}

/// Days `center - radius ..= center + radius`, counts left at zero.
pub fn generate_window(
    center: NaiveDate,
    radius: i64,
    clock: &impl Clock,
) -> Result<Vec<CalendarDay>, AgendaError> {
    if radius < 0 {
        return Err(AgendaError::InvalidRadius(radius));
    }
    let today = clock.today();
    let span = ChronoDuration::try_days(radius).ok_or(AgendaError::DateOutOfRange(center))?;
    // Bounds are checked up front so a huge radius fails before allocating.
    let first = center
        .checked_sub_signed(span)
        .ok_or(AgendaError::DateOutOfRange(center))?;
    let last = center
        .checked_add_signed(span)
        .ok_or(AgendaError::DateOutOfRange(center))?;
    let mut days = Vec::with_capacity((2 * radius + 1) as usize);
    for date in first.iter_days().take_while(|d| *d <= last) {
        days.push(CalendarDay {
            date,
            is_today: date == today,
            is_selected: date == center,
            unfinished_count: 0,
        });
    }
    Ok(days)
}

pub fn annotate(days: Vec<CalendarDay>, tasks: &TaskList) -> Vec<CalendarDay> {
    days.into_iter()
        .map(|day| CalendarDay {
            unfinished_count: tasks
                .iter()
                .filter(|t| t.date == day.date && !t.status.is_done())
                .count(),
            ..day
        })
        .collect()
}

pub fn filter_for_display<'a>(
    tasks: &'a TaskList,
    selected_date: NaiveDate,
    filter: StatusFilter,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.date == selected_date)
        .filter(|t| filter.matches(t.status))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaView<'a> {
    pub days: Vec<CalendarDay>,
    pub visible: Vec<&'a Task>,
}

impl<'a> AgendaView<'a> {
    pub fn compute(
        selection: &Selection,
        tasks: &'a TaskList,
        radius: i64,
        clock: &impl Clock,
    ) -> Result<Self, AgendaError> {
        let days = generate_window(selection.selected_date, radius, clock)?;
        Ok(AgendaView {
            days: annotate(days, tasks),
            visible: filter_for_display(tasks, selection.selected_date, selection.active_filter),
        })
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.days.iter().position(|d| d.is_selected)
    }
}
