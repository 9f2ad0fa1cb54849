//! Room/period validation for class sections.
//!
//! Only the section being written is checked. A batch of edits can still
//! leave the roster inconsistent, and nothing guards against two writers
//! racing on the same room; the store has no unique constraint on
//! (room, period).

use crate::model::{require_text, ClassSection, ModelError, Period, MAX_NAME_LEN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ROOM_CAPACITY: u32 = 35;
pub const DEFAULT_ROOM_COUNT: u32 = 9;
pub const MAX_ROOM_COUNT: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub capacity: u32,
}

/// Rooms `room_1..room_N`, named "Sala N", all at the default capacity.
pub fn generate_rooms(count: u32) -> Vec<Room> {
    (1..=count)
        .map(|n| Room {
            id: format!("room_{}", n),
            name: format!("Sala {}", n),
            capacity: DEFAULT_ROOM_CAPACITY,
        })
        .collect()
}

/// A validated create/update request. `id` is `None` for a new section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedSection {
    pub id: Option<String>,
    pub name: String,
    pub teacher: String,
    pub period: Period,
    pub room: String,
    pub capacity: u32,
    pub enrolled_count: u32,
    pub year: String,
}

impl ProposedSection {
    pub fn into_section(self, id: String) -> ClassSection {
        ClassSection {
            id,
            name: self.name,
            teacher: self.teacher,
            period: self.period,
            room: self.room,
            capacity: self.capacity,
            enrolled_count: self.enrolled_count,
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConflictResult {
    Ok,
    #[serde(rename_all = "camelCase")]
    RoomOccupied { conflicting_section_name: String },
    #[serde(rename_all = "camelCase")]
    OverCapacity { room_capacity: u32 },
}

impl ConflictResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConflictResult::Ok)
    }
}

/// Occupancy first, then capacity; the first failure is reported.
pub fn check_conflict(proposed: &ProposedSection, existing: &[ClassSection]) -> ConflictResult {
    let occupant = existing.iter().find(|section| {
        proposed.id.as_deref() != Some(section.id.as_str())
            && section.room == proposed.room
            && section.period == proposed.period
    });
    if let Some(section) = occupant {
        return ConflictResult::RoomOccupied {
            conflicting_section_name: section.name.clone(),
        };
    }
    if proposed.enrolled_count > proposed.capacity {
        return ConflictResult::OverCapacity {
            room_capacity: proposed.capacity,
        };
    }
    ConflictResult::Ok
}

/// Whether one more student fits in `section`.
pub fn check_enrollment(section: &ClassSection) -> ConflictResult {
    if section.enrolled_count.saturating_add(1) > section.capacity {
        return ConflictResult::OverCapacity {
            room_capacity: section.capacity,
        };
    }
    ConflictResult::Ok
}

/// Raw class form as submitted by the UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub teacher: Option<String>,
    pub period: Option<String>,
    pub room: Option<String>,
    pub capacity: Option<i64>,
    #[serde(default)]
    pub enrolled_count: u32,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionFormError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("unknown period: {0}")]
    UnknownPeriod(String),
    #[error("capacity must be a number greater than zero")]
    InvalidCapacity,
    #[error(transparent)]
    Field(#[from] ModelError),
}

fn present(v: &Option<String>) -> bool {
    v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

pub fn validate_section_form(form: &SectionForm) -> Result<ProposedSection, SectionFormError> {
    let mut missing = Vec::new();
    if !present(&form.name) {
        missing.push("name");
    }
    if !present(&form.teacher) {
        missing.push("teacher");
    }
    if !present(&form.period) {
        missing.push("period");
    }
    if !present(&form.room) {
        missing.push("room");
    }
    if form.capacity.is_none() {
        missing.push("capacity");
    }
    if !missing.is_empty() {
        return Err(SectionFormError::MissingFields(missing));
    }

    let period_raw = form.period.as_deref().unwrap_or_default();
    let period = Period::parse(period_raw)
        .ok_or_else(|| SectionFormError::UnknownPeriod(period_raw.to_string()))?;
    let capacity = match form.capacity {
        Some(c) if c > 0 && c <= i64::from(u32::MAX) => c as u32,
        _ => return Err(SectionFormError::InvalidCapacity),
    };

    Ok(ProposedSection {
        id: form.id.clone().filter(|s| !s.trim().is_empty()),
        name: require_text("name", form.name.as_deref().unwrap_or_default(), MAX_NAME_LEN)?,
        teacher: require_text(
            "teacher",
            form.teacher.as_deref().unwrap_or_default(),
            MAX_NAME_LEN,
        )?,
        period,
        room: require_text("room", form.room.as_deref().unwrap_or_default(), MAX_NAME_LEN)?,
        capacity,
        enrolled_count: form.enrolled_count,
        year: form.year.as_deref().unwrap_or_default().trim().to_string(),
    })
}
