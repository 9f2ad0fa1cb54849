use crate::filter::Searchable;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_IDENTIFIER_LEN: usize = 32;
pub const MAX_TEXT_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} length must be <= {max}")]
    TooLong { field: &'static str, max: usize },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Trimmed, non-empty, bounded text.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<String, ModelError> {
    let t = value.trim();
    if t.is_empty() {
        return Err(ModelError::Missing(field));
    }
    if t.chars().count() > max {
        return Err(ModelError::TooLong { field, max });
    }
    Ok(t.to_string())
}

/// Trimmed optional text; blank becomes empty.
pub fn optional_text(field: &'static str, value: &str, max: usize) -> Result<String, ModelError> {
    let t = value.trim();
    if t.chars().count() > max {
        return Err(ModelError::TooLong { field, max });
    }
    Ok(t.to_string())
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ModelError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ModelError::Invalid {
        field,
        reason: "must be YYYY-MM-DD".to_string(),
    })
}

pub fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, ModelError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| ModelError::Invalid {
        field,
        reason: "must be HH:MM".to_string(),
    })
}

/// `HH:MM` wire format for times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    Full,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Morning,
        Period::Afternoon,
        Period::Evening,
        Period::Full,
    ];

    /// Accepts the wire keys and the Portuguese labels shown on the class form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "manhã" | "manha" => Some(Self::Morning),
            "afternoon" | "tarde" => Some(Self::Afternoon),
            "evening" | "noite" => Some(Self::Evening),
            "full" | "integral" => Some(Self::Full),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Full => "full",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Manhã",
            Self::Afternoon => "Tarde",
            Self::Evening => "Noite",
            Self::Full => "Integral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: String,
    pub name: String,
    pub teacher: String,
    pub period: Period,
    pub room: String,
    pub capacity: u32,
    pub enrolled_count: u32,
    pub year: String,
}

impl Searchable for ClassSection {
    const DEFAULT_FIELDS: &'static [&'static str] = &["name", "teacher"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "name" => vec![self.name.as_str()],
            "teacher" => vec![self.teacher.as_str()],
            "room" => vec![self.room.as_str()],
            "period" => vec![self.period.label()],
            "year" => vec![self.year.as_str()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Some(Self::Active),
            "inactive" | "inativo" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_id: Option<String>,
    pub class_name: String,
    pub grade: String,
    pub status: StudentStatus,
}

impl Searchable for Student {
    const DEFAULT_FIELDS: &'static [&'static str] = &["name"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "name" => vec![self.name.as_str()],
            "class" => vec![self.class_name.as_str()],
            "grade" => vec![self.grade.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Employment status shared by teachers and management staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StaffStatus {
    Active,
    Temporary,
    Leave,
    Retired,
    Transferred,
}

impl StaffStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "lotado" => Some(Self::Active),
            "temporary" | "temporário" | "temporario" => Some(Self::Temporary),
            "leave" | "licença" | "licenca" => Some(Self::Leave),
            "retired" | "aposentado" => Some(Self::Retired),
            "transferred" | "transferido" => Some(Self::Transferred),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Temporary => "temporary",
            Self::Leave => "leave",
            Self::Retired => "retired",
            Self::Transferred => "transferred",
        }
    }
}

/// A transfer date is only meaningful for transferred staff.
pub fn check_transfer_date(
    status: StaffStatus,
    transfer_date: Option<NaiveDate>,
) -> Result<(), ModelError> {
    if transfer_date.is_some() && status != StaffStatus::Transferred {
        return Err(ModelError::Invalid {
            field: "transferDate",
            reason: "only allowed when status is transferred".to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffIdentity {
    pub registration: String,
    pub rg: String,
    pub cpf: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub identity: StaffIdentity,
    pub status: StaffStatus,
    pub transfer_date: Option<NaiveDate>,
    pub subjects: Vec<String>,
    pub grade_levels: Vec<String>,
}

impl Searchable for Teacher {
    const DEFAULT_FIELDS: &'static [&'static str] = &["name", "email", "subjects"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "name" => vec![self.name.as_str()],
            "email" => vec![self.identity.email.as_str()],
            "registration" => vec![self.identity.registration.as_str()],
            "subjects" => self.subjects.iter().map(String::as_str).collect(),
            "gradeLevels" => self.grade_levels.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementMember {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub identity: StaffIdentity,
    pub position: String,
    pub status: StaffStatus,
    pub transfer_date: Option<NaiveDate>,
}

impl Searchable for ManagementMember {
    const DEFAULT_FIELDS: &'static [&'static str] = &["name", "position", "email"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "name" => vec![self.name.as_str()],
            "position" => vec![self.position.as_str()],
            "email" => vec![self.identity.email.as_str()],
            "registration" => vec![self.identity.registration.as_str()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub location: String,
}

impl Searchable for Event {
    const DEFAULT_FIELDS: &'static [&'static str] = &["title", "location"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "title" => vec![self.title.as_str()],
            "location" => vec![self.location.as_str()],
            _ => Vec::new(),
        }
    }
}

pub fn check_event_times(start: NaiveTime, end: NaiveTime) -> Result<(), ModelError> {
    if end < start {
        return Err(ModelError::Invalid {
            field: "endTime",
            reason: "must not be before startTime".to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub description: String,
    pub created_at: NaiveDate,
}

impl Searchable for Document {
    const DEFAULT_FIELDS: &'static [&'static str] = &["title", "type"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "title" => vec![self.title.as_str()],
            "type" => vec![self.doc_type.as_str()],
            "description" => vec![self.description.as_str()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingStatus {
    Scheduled,
    Held,
}

impl MeetingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" | "agendada" => Some(Self::Scheduled),
            "held" | "realizada" => Some(Self::Held),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Held => "held",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub location: String,
    pub attendees: String,
    pub status: MeetingStatus,
}

impl Searchable for Meeting {
    const DEFAULT_FIELDS: &'static [&'static str] = &["title", "attendees"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "title" => vec![self.title.as_str()],
            "attendees" => vec![self.attendees.as_str()],
            "location" => vec![self.location.as_str()],
            _ => Vec::new(),
        }
    }
}
