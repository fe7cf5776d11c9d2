// Café domain: students, meals, the check-in desk and daily stats

mod access;
mod api;
mod meal_period;
mod models;
mod registration;
mod roster;
mod scan;
mod stats;

pub use access::{AccessDesk, AccessOutcome};
pub use api::{CafeApi, DEFAULT_RECENT_MEALS, MEALS_PATH, STUDENTS_PATH};
pub use meal_period::MealWindow;
pub use models::{MealLog, MealType, NewMeal, NewStudent, Student};
pub use registration::{generate_student_id, register, render_id_card, Registration, DEPARTMENTS};
pub use roster::StudentRoster;
pub use scan::normalize_scan;
pub use stats::{collect_stats, daily_stats, DailyStats, RECENT_ACTIVITY};
