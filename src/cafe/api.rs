// Typed café API calls on top of the authenticated client

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::models::{MealLog, MealType, NewMeal, NewStudent, Student};
use crate::error::{ClientError, Result};
use crate::http_client::CafeHttpClient;

pub const STUDENTS_PATH: &str = "/api/students/";
pub const MEALS_PATH: &str = "/api/meals/";

/// Number of meals shown in the "recent" list
pub const DEFAULT_RECENT_MEALS: usize = 5;

/// Café API client
#[derive(Clone)]
pub struct CafeApi {
    client: Arc<CafeHttpClient>,
}

impl CafeApi {
    pub fn new(client: Arc<CafeHttpClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CafeHttpClient {
        &self.client
    }

    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let response = self.client.get(STUDENTS_PATH).await?.error_for_status()?;
        let students: Vec<Student> = response.json()?;
        tracing::debug!(count = students.len(), "Fetched students");
        Ok(students)
    }

    pub async fn create_student(&self, student: &NewStudent) -> Result<Student> {
        let response = self
            .client
            .post_json(STUDENTS_PATH, to_body(student)?)
            .await?
            .error_for_status()?;
        response.json()
    }

    pub async fn list_meals(&self) -> Result<Vec<MealLog>> {
        let response = self.client.get(MEALS_PATH).await?.error_for_status()?;
        response.json()
    }

    /// First `limit` meal logs as served by the API
    pub async fn recent_meals(&self, limit: usize) -> Result<Vec<MealLog>> {
        let mut meals = self.list_meals().await?;
        meals.truncate(limit);
        Ok(meals)
    }

    /// Record a meal; a 400 means the student already ate this period
    pub async fn record_meal(&self, student_pk: i64, meal_type: MealType) -> Result<MealLog> {
        let body = to_body(&NewMeal {
            student: student_pk,
            meal_type,
        })?;
        let response = self
            .client
            .post_json(MEALS_PATH, body)
            .await?
            .error_for_status()?;
        response.json()
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ClientError::InvalidRequest(e.to_string()))
}
