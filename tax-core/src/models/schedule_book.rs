use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::schedule::{BracketSchedule, ScheduleError};

/// Bracket schedules keyed by the tax year they take effect.
///
/// A schedule stays in effect until a later one replaces it, so a book
/// holding 2023 and 2026 answers 2024 and 2025 with the 2023 schedule.
/// Clone the book to take a snapshot before computing against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleBook {
    schedules: BTreeMap<i32, BracketSchedule>,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schedule` as effective from `year`, returning the schedule
    /// it replaced, if any.
    pub fn insert(
        &mut self,
        year: i32,
        schedule: BracketSchedule,
    ) -> Option<BracketSchedule> {
        self.schedules.insert(year, schedule)
    }

    /// The schedule in effect for `year`.
    pub fn for_year(
        &self,
        year: i32,
    ) -> Result<&BracketSchedule, ScheduleError> {
        self.schedules
            .range(..=year)
            .next_back()
            .map(|(_, schedule)| schedule)
            .ok_or(ScheduleError::NoScheduleForYear(year))
    }

    /// Effective years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.schedules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

impl FromIterator<(i32, BracketSchedule)> for ScheduleBook {
    fn from_iter<T: IntoIterator<Item = (i32, BracketSchedule)>>(iter: T) -> Self {
        Self {
            schedules: iter.into_iter().collect(),
        }
    }
}
