use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;
pub const PASS_THRESHOLD: f64 = 6.0;
const HIGH_THRESHOLD: f64 = 8.0;

/// Four bimester scores for one student in one subject.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BimesterScores {
    pub b1: f64,
    pub b2: f64,
    pub b3: f64,
    pub b4: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bimester {
    B1,
    B2,
    B3,
    B4,
}

impl Bimester {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b1" | "1" => Some(Self::B1),
            "b2" | "2" => Some(Self::B2),
            "b3" | "3" => Some(Self::B3),
            "b4" | "4" => Some(Self::B4),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::B1 => "b1",
            Self::B2 => "b2",
            Self::B3 => "b3",
            Self::B4 => "b4",
        }
    }
}

impl BimesterScores {
    pub fn new(b1: f64, b2: f64, b3: f64, b4: f64) -> Self {
        Self { b1, b2, b3, b4 }
    }

    pub fn set(&mut self, bimester: Bimester, value: f64) {
        match bimester {
            Bimester::B1 => self.b1 = value,
            Bimester::B2 => self.b2 = value,
            Bimester::B3 => self.b3 = value,
            Bimester::B4 => self.b4 = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeStatus {
    Approved,
    Failed,
}

/// Colour band used by score cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeBand {
    High,
    Passing,
    Low,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("score must be a number")]
    NotANumber,
    #[error("score {0} is outside 0..=10")]
    OutOfRange(f64),
}

/// Subject name -> bimester scores.
pub type GradeRecord = BTreeMap<String, BimesterScores>;

/// Mean of the four bimesters. Range is the caller's problem.
pub fn compute_average(scores: BimesterScores) -> f64 {
    (scores.b1 + scores.b2 + scores.b3 + scores.b4) / 4.0
}

pub fn status_for(average: f64) -> GradeStatus {
    if average >= PASS_THRESHOLD {
        GradeStatus::Approved
    } else {
        GradeStatus::Failed
    }
}

pub fn grade_band(value: f64) -> GradeBand {
    if value >= HIGH_THRESHOLD {
        GradeBand::High
    } else if value >= PASS_THRESHOLD {
        GradeBand::Passing
    } else {
        GradeBand::Low
    }
}

pub fn validate_score(value: f64) -> Result<f64, GradeError> {
    if value.is_nan() {
        return Err(GradeError::NotANumber);
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(GradeError::OutOfRange(value));
    }
    Ok(value)
}

/// Half-up rounding to one decimal: `floor(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Mean of the per-student annual averages. `None` for an empty class.
pub fn class_average(students: &[BimesterScores]) -> Option<f64> {
    if students.is_empty() {
        return None;
    }
    let sum: f64 = students.iter().copied().map(compute_average).sum();
    Some(sum / students.len() as f64)
}

/// Mean of a student's per-subject annual averages.
pub fn overall_average(record: &GradeRecord) -> Option<f64> {
    if record.is_empty() {
        return None;
    }
    let sum: f64 = record.values().copied().map(compute_average).sum();
    Some(sum / record.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGradeRow {
    pub student_id: String,
    pub display_name: String,
    pub scores: BimesterScores,
    pub average: f64,
    pub status: GradeStatus,
    pub band: GradeBand,
}

pub fn student_grade_row(
    student_id: &str,
    display_name: &str,
    scores: BimesterScores,
) -> StudentGradeRow {
    let average = compute_average(scores);
    StudentGradeRow {
        student_id: student_id.to_string(),
        display_name: display_name.to_string(),
        scores,
        average,
        status: status_for(average),
        band: grade_band(average),
    }
}
