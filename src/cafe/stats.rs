// Daily café analytics

use chrono::{Local, NaiveDate, TimeZone};

use super::api::CafeApi;
use super::models::{MealLog, MealType, Student};
use crate::error::Result;

/// Number of logs listed as recent activity
pub const RECENT_ACTIVITY: usize = 10;

/// Snapshot of registrations and meals served on one local day
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStats {
    pub day: NaiveDate,
    pub total_students: usize,
    pub meals_today: usize,
    pub breakfast: usize,
    pub lunch: usize,
    pub dinner: usize,

    /// First logs as served by the API, whatever their date
    pub recent: Vec<MealLog>,
}

impl DailyStats {
    /// Meals of one type served today
    pub fn served(&self, meal_type: MealType) -> usize {
        match meal_type {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::Dinner => self.dinner,
        }
    }

    /// Share of today's meals, in percent (0 when nothing was served)
    pub fn share(&self, meal_type: MealType) -> f64 {
        self.served(meal_type) as f64 * 100.0 / self.meals_today.max(1) as f64
    }
}

/// Compute the stats for `day`, bucketing timestamps in `tz`
pub fn daily_stats<Tz: TimeZone>(
    students: &[Student],
    meals: &[MealLog],
    day: NaiveDate,
    tz: &Tz,
) -> DailyStats {
    let mut stats = DailyStats {
        day,
        total_students: students.len(),
        meals_today: 0,
        breakfast: 0,
        lunch: 0,
        dinner: 0,
        recent: meals.iter().take(RECENT_ACTIVITY).cloned().collect(),
    };

    let today = meals
        .iter()
        .filter(|meal| meal.timestamp.with_timezone(tz).date_naive() == day);
    for meal in today {
        stats.meals_today += 1;
        match meal.meal_type {
            MealType::Breakfast => stats.breakfast += 1,
            MealType::Lunch => stats.lunch += 1,
            MealType::Dinner => stats.dinner += 1,
        }
    }

    stats
}

/// Fetch students and meals and summarize the current local day
pub async fn collect_stats(api: &CafeApi) -> Result<DailyStats> {
    let (students, meals) = tokio::try_join!(api.list_students(), api.list_meals())?;
    let stats = daily_stats(&students, &meals, Local::now().date_naive(), &Local);

    tracing::debug!(
        students = stats.total_students,
        meals_today = stats.meals_today,
        "Collected café stats"
    );
    Ok(stats)
}
