// Student roster cache

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::api::CafeApi;
use super::models::Student;
use crate::error::Result;

/// Thread-safe cache of students keyed by their scanned identifier
pub struct StudentRoster {
    /// Students indexed by `student_id`
    students: Arc<DashMap<String, Student>>,

    /// When the roster was last loaded
    loaded_at: Arc<RwLock<Option<Instant>>>,

    /// Roster TTL
    ttl: Duration,
}

impl StudentRoster {
    /// Create an empty roster
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            students: Arc::new(DashMap::new()),
            loaded_at: Arc::new(RwLock::new(None)),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Replace the roster contents
    ///
    /// New entries are written before stale ones are dropped, so concurrent
    /// lookups never observe an empty roster mid-update.
    pub fn update(&self, students: Vec<Student>) {
        tracing::info!("Updating student roster. Found {} students.", students.len());

        let mut fresh = HashSet::with_capacity(students.len());
        for student in students {
            let key = student.student_id.trim().to_string();
            if key.is_empty() {
                tracing::warn!(id = student.id, "Skipping student without student_id");
                continue;
            }
            fresh.insert(key.clone());
            self.students.insert(key, student);
        }
        self.students.retain(|key, _| fresh.contains(key));

        *self.loaded_at.write().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    pub fn get(&self, student_id: &str) -> Option<Student> {
        self.students
            .get(student_id)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Check if the roster needs reloading
    pub fn is_stale(&self) -> bool {
        match *self.loaded_at.read().unwrap_or_else(|e| e.into_inner()) {
            Some(loaded) => loaded.elapsed() >= self.ttl,
            None => true, // Never loaded
        }
    }

    /// Force a reload on the next lookup
    pub fn invalidate(&self) {
        *self.loaded_at.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Reload the roster from the API
    pub async fn reload(&self, api: &CafeApi) -> Result<()> {
        let students = api.list_students().await?;
        self.update(students);
        Ok(())
    }

    /// Find a student, loading the roster when stale
    ///
    /// A miss against a roster that was not loaded by this call triggers one
    /// reload so students registered since the last load are found.
    pub async fn lookup(&self, api: &CafeApi, student_id: &str) -> Result<Option<Student>> {
        let mut reloaded = false;
        if self.is_stale() {
            self.reload(api).await?;
            reloaded = true;
        }

        if let Some(student) = self.get(student_id) {
            return Ok(Some(student));
        }

        if !reloaded {
            tracing::debug!(student_id = student_id, "Roster miss, reloading");
            self.reload(api).await?;
            return Ok(self.get(student_id));
        }

        Ok(None)
    }
}

impl Clone for StudentRoster {
    fn clone(&self) -> Self {
        Self {
            students: Arc::clone(&self.students),
            loaded_at: Arc::clone(&self.loaded_at),
            ttl: self.ttl,
        }
    }
}
