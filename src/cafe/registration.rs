// Student registration and printable ID cards

use chrono::{Datelike, Local};
use rand::Rng;

use super::api::CafeApi;
use super::models::{NewStudent, Student};
use crate::error::{ClientError, Result};

/// Departments offered on the registration form
pub const DEPARTMENTS: [&str; 10] = [
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Civil Engineering",
    "Business Administration",
    "Medicine",
    "Law",
    "Arts and Humanities",
    "Science",
    "Social Sciences",
];

const CARD_TITLE: &str = "UNIVERSITY CAFE - STUDENT ID";

/// Generate an identifier of the form `STU{year}{NNNN}`
pub fn generate_student_id(year: i32) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
    format!("STU{}{}", year, suffix)
}

/// Registration form as entered by the operator
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,

    /// Defaults to the current year
    pub year: Option<i32>,

    /// Generated when absent or blank
    pub student_id: Option<String>,
}

impl Registration {
    /// Check required fields and fill in defaults
    pub fn into_new_student(self) -> Result<NewStudent> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("department", &self.department),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ClientError::InvalidRequest(format!("{} is required", field)));
        }

        let year = self.year.unwrap_or_else(|| Local::now().year());
        let student_id = match self.student_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_student_id(year),
        };

        Ok(NewStudent {
            student_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            department: self.department.trim().to_string(),
            year,
        })
    }
}

/// Register a student and return the record created by the API
pub async fn register(api: &CafeApi, registration: Registration) -> Result<Student> {
    let new_student = registration.into_new_student()?;
    tracing::info!(student_id = %new_student.student_id, "Registering student");

    let student = api.create_student(&new_student).await?;
    tracing::info!(student_id = %student.student_id, id = student.id, "Student registered");
    Ok(student)
}

/// Render a boxed text ID card for printing
pub fn render_id_card(student: &Student) -> String {
    let year = student.year.to_string();
    let rows = [
        ("Name", student.name.as_str()),
        ("Student ID", student.student_id.as_str()),
        ("Department", student.department.as_str()),
        ("Year", year.as_str()),
        ("Email", student.email.as_str()),
        ("Phone", student.phone.as_str()),
    ];

    let lines: Vec<String> = rows
        .iter()
        .map(|(label, value)| format!("{:<11} {}", format!("{}:", label), value))
        .collect();

    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .chain(std::iter::once(CARD_TITLE.len()))
        .max()
        .unwrap_or(0);

    let border = format!("+{}+", "-".repeat(width + 2));
    let mut card = Vec::with_capacity(lines.len() + 4);
    card.push(border.clone());
    card.push(format!("| {:^width$} |", CARD_TITLE, width = width));
    card.push(border.clone());
    for line in &lines {
        let pad = width - line.chars().count();
        card.push(format!("| {}{} |", line, " ".repeat(pad)));
    }
    card.push(border);

    card.join("\n")
}
