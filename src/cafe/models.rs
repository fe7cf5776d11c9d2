// Café API data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Meal served during one of the daily periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Database primary key, referenced by meal logs
    pub id: i64,

    /// Printed/scanned identifier (e.g. `STU20241234`)
    pub student_id: String,

    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Recorded meal event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MealLog {
    pub log_id: i64,

    /// Student primary key
    pub student: i64,

    pub meal_type: MealType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST /api/students/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStudent {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub year: i32,
}

/// Body for `POST /api/meals/`
#[derive(Debug, Clone, Serialize)]
pub struct NewMeal {
    pub student: i64,
    pub meal_type: MealType,
}
