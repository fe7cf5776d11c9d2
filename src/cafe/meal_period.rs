// Meal period windowing
//
// Windows are whole local hours, end exclusive:
//   breakfast 07-09, lunch 11-13, dinner 17-20

use chrono::{Local, Timelike};

use super::models::MealType;

const SCHEDULE: [(MealType, u32, u32); 3] = [
    (MealType::Breakfast, 7, 9),
    (MealType::Lunch, 11, 13),
    (MealType::Dinner, 17, 20),
];

impl MealType {
    /// Opening and closing hour of the period
    pub fn hours(&self) -> (u32, u32) {
        SCHEDULE
            .iter()
            .find(|(meal, _, _)| meal == self)
            .map(|(_, start, end)| (*start, *end))
            .unwrap_or((0, 0))
    }

    /// Operator-facing label, e.g. `Lunch (11:00-13:00)`
    pub fn schedule_label(&self) -> String {
        let (start, end) = self.hours();
        let name = match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        };
        format!("{} ({}:00-{}:00)", name, start, end)
    }
}

/// Whether the café is serving, and what
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealWindow {
    Open(MealType),
    Closed { next: MealType },
}

impl MealWindow {
    /// Window for an hour of the day (0-23)
    pub fn at(hour: u32) -> Self {
        for (meal, start, end) in SCHEDULE {
            if hour >= start && hour < end {
                return MealWindow::Open(meal);
            }
        }

        // After dinner the next service is tomorrow's breakfast
        let next = SCHEDULE
            .iter()
            .find(|(_, start, _)| hour < *start)
            .map(|(meal, _, _)| *meal)
            .unwrap_or(MealType::Breakfast);

        MealWindow::Closed { next }
    }

    /// Window for the current local time
    pub fn now() -> Self {
        Self::at(Local::now().hour())
    }

    pub fn meal(&self) -> Option<MealType> {
        match self {
            MealWindow::Open(meal) => Some(*meal),
            MealWindow::Closed { .. } => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, MealWindow::Open(_))
    }

    /// One-line status for the operator
    pub fn describe(&self) -> String {
        match self {
            MealWindow::Open(meal) => format!("Open - serving {}", meal.schedule_label()),
            MealWindow::Closed { next } => format!("Closed - next: {}", next.schedule_label()),
        }
    }
}
