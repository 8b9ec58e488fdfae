//! Military training: courses, per-citizen training records,
//! instructors and facilities.
//!
//! Course level and progress are tracked per course, not per citizen:
//! starting a course marks it in progress for the whole colony.

use crate::{
    error::{SimError, SimResult},
    types::{EntityId, Mutation},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingType {
    BasicTraining,
    PoweredSuit,
    Tactics,
    Survival,
    Weapons,
    AlienCombat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingLevel {
    NotStarted,
    InProgress,
    Completed,
    Advanced,
}

impl TrainingLevel {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Advanced)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingCourse {
    pub id:                       EntityId,
    pub training_type:            TrainingType,
    pub name:                     String,
    pub description:              String,
    pub duration_weeks:           u32,
    pub required_for_citizenship: bool,
    pub prerequisites:            Vec<TrainingType>,
    pub level:                    TrainingLevel,
    /// Percentage, 0–100.
    pub progress:                 f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingIncident {
    pub date:        DateTime<Utc>,
    pub description: String,
    pub severity:    IncidentSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecord {
    pub id:               EntityId,
    pub citizen_id:       EntityId,
    pub course_id:        EntityId,
    pub started_at:       DateTime<Utc>,
    pub completed_at:     Option<DateTime<Utc>>,
    /// Score, 0–100.
    pub performance:      f64,
    pub instructor_notes: Vec<String>,
    pub incidents:        Vec<TrainingIncident>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instructor {
    pub id:                  EntityId,
    pub name:                String,
    pub rank:                String,
    pub specialties:         Vec<TrainingType>,
    pub years_of_experience: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityTier {
    Basic,
    Advanced,
    Specialized,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityStatus {
    Operational,
    Maintenance,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingFacility {
    pub id:                EntityId,
    pub name:              String,
    pub tier:              FacilityTier,
    pub capacity:          u32,
    pub current_trainees:  u32,
    pub available_courses: Vec<TrainingType>,
    pub status:            FacilityStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingProgram {
    courses:     Vec<TrainingCourse>,
    records:     Vec<TrainingRecord>,
    instructors: Vec<Instructor>,
    facilities:  Vec<TrainingFacility>,
}

impl TrainingProgram {
    pub fn new(courses: Vec<TrainingCourse>) -> Self {
        Self { courses, ..Self::default() }
    }

    pub fn courses(&self) -> &[TrainingCourse] {
        &self.courses
    }

    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    pub fn facilities(&self) -> &[TrainingFacility] {
        &self.facilities
    }

    pub fn course(&self, course_id: &str) -> Option<&TrainingCourse> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    fn course_mut(&mut self, course_id: &str) -> Option<&mut TrainingCourse> {
        self.courses.iter_mut().find(|c| c.id == course_id)
    }

    fn record_mut(&mut self, record_id: &str) -> Option<&mut TrainingRecord> {
        self.records.iter_mut().find(|r| r.id == record_id)
    }

    /// Prerequisite types with no finished course of that type.
    pub fn missing_prerequisites(&self, course_id: &str) -> Vec<TrainingType> {
        let Some(course) = self.course(course_id) else {
            return Vec::new();
        };
        course
            .prerequisites
            .iter()
            .copied()
            .filter(|t| {
                !self
                    .courses
                    .iter()
                    .any(|c| c.training_type == *t && c.level.is_finished())
            })
            .collect()
    }

    /// Enrol a citizen. Returns the new record id, or `None` for an
    /// unknown course.
    pub fn start_training(&mut self, citizen_id: &str, course_id: &str) -> SimResult<Option<EntityId>> {
        if self.course(course_id).is_none() {
            log::debug!("training: start for unknown course '{course_id}'");
            return Ok(None);
        }
        let missing = self.missing_prerequisites(course_id);
        if !missing.is_empty() {
            let missing = missing
                .iter()
                .map(|t| format!("{t:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SimError::PrerequisitesNotMet { course_id: course_id.into(), missing });
        }

        let record_id = uuid::Uuid::new_v4().to_string();
        self.records.push(TrainingRecord {
            id: record_id.clone(),
            citizen_id: citizen_id.into(),
            course_id: course_id.into(),
            started_at: Utc::now(),
            completed_at: None,
            performance: 0.0,
            instructor_notes: Vec::new(),
            incidents: Vec::new(),
        });
        if let Some(course) = self.course_mut(course_id) {
            course.level = TrainingLevel::InProgress;
            course.progress = 0.0;
        }
        log::info!("training: citizen '{citizen_id}' started course '{course_id}'");
        Ok(Some(record_id))
    }

    /// Set a course's progress, clamped to 0–100.
    pub fn update_progress(&mut self, course_id: &str, progress: f64) -> Mutation {
        let Some(course) = self.course_mut(course_id) else {
            log::debug!("training: progress for unknown course '{course_id}'");
            return Mutation::UnknownId;
        };
        let clamped = progress.clamp(0.0, 100.0);
        course.progress = clamped;
        if clamped == progress { Mutation::Applied } else { Mutation::Clamped }
    }

    /// Finish a course for a citizen. The course is marked completed even
    /// when the citizen has no open record for it.
    pub fn complete_training(&mut self, citizen_id: &str, course_id: &str, performance: f64) -> Mutation {
        let Some(course) = self.course_mut(course_id) else {
            log::debug!("training: completion for unknown course '{course_id}'");
            return Mutation::UnknownId;
        };
        course.level = TrainingLevel::Completed;
        course.progress = 100.0;

        let score = performance.clamp(0.0, 100.0);
        let now = Utc::now();
        let mut matched = false;
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.citizen_id == citizen_id && r.course_id == course_id)
        {
            record.completed_at = Some(now);
            record.performance = score;
            matched = true;
        }
        if !matched {
            log::warn!("training: '{citizen_id}' completed '{course_id}' without a training record");
        }
        if score == performance { Mutation::Applied } else { Mutation::Clamped }
    }

    pub fn add_instructor_note(&mut self, record_id: &str, note: impl Into<String>) -> Mutation {
        match self.record_mut(record_id) {
            Some(record) => {
                record.instructor_notes.push(note.into());
                Mutation::Applied
            }
            None => Mutation::UnknownId,
        }
    }

    pub fn report_incident(
        &mut self,
        record_id:   &str,
        description: impl Into<String>,
        severity:    IncidentSeverity,
    ) -> Mutation {
        let Some(record) = self.record_mut(record_id) else {
            return Mutation::UnknownId;
        };
        record.incidents.push(TrainingIncident {
            date: Utc::now(),
            description: description.into(),
            severity,
        });
        if severity == IncidentSeverity::High {
            log::warn!("training: high-severity incident on record '{record_id}'");
        }
        Mutation::Applied
    }

    pub fn add_instructor(&mut self, instructor: Instructor) {
        self.instructors.push(instructor);
    }

    pub fn add_facility(&mut self, facility: TrainingFacility) {
        self.facilities.push(facility);
    }

    pub fn instructors_for(&self, training_type: TrainingType) -> Vec<&Instructor> {
        self.instructors
            .iter()
            .filter(|i| i.specialties.contains(&training_type))
            .collect()
    }
}
