use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    Present,
    Absent,
}

impl Mark {
    pub fn toggled(self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
        }
    }

    /// Single-letter code stored in the workspace ("P" / "F").
    pub fn code(self) -> &'static str {
        match self {
            Self::Present => "P",
            Self::Absent => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "P" | "p" => Some(Self::Present),
            "F" | "f" | "A" | "a" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Calendar day key, always `YYYY-MM-DD`. No time or zone component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| LedgerError::BadDate(raw.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for DateKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("date must be YYYY-MM-DD: {0}")]
    BadDate(String),
    #[error("date {0} is already on the sheet")]
    DuplicateDate(DateKey),
    #[error("no mark for student {student_id} on {date}")]
    MarkNotInitialized { student_id: String, date: DateKey },
}

/// (student, date) -> mark for one class sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceLedger {
    dates: BTreeSet<DateKey>,
    marks: BTreeMap<(String, DateKey), Mark>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored rows. Dates are taken from the rows.
    pub fn from_marks<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, DateKey, Mark)>,
    {
        let mut ledger = Self::new();
        for (student_id, date, mark) in rows {
            ledger.dates.insert(date);
            ledger.marks.insert((student_id, date), mark);
        }
        ledger
    }

    pub fn dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.dates.iter().copied()
    }

    pub fn has_date(&self, date: DateKey) -> bool {
        self.dates.contains(&date)
    }

    pub fn mark(&self, student_id: &str, date: DateKey) -> Option<Mark> {
        self.marks.get(&(student_id.to_string(), date)).copied()
    }

    /// Put a new date on the sheet with every listed student present.
    pub fn add_date<'a, I>(&mut self, date: DateKey, student_ids: I) -> Result<(), LedgerError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.dates.insert(date) {
            return Err(LedgerError::DuplicateDate(date));
        }
        for student_id in student_ids {
            self.marks
                .insert((student_id.to_string(), date), Mark::Present);
        }
        Ok(())
    }

    /// Flip present <-> absent. Returns the new mark.
    pub fn toggle_mark(&mut self, student_id: &str, date: DateKey) -> Result<Mark, LedgerError> {
        let Some(mark) = self.marks.get_mut(&(student_id.to_string(), date)) else {
            return Err(LedgerError::MarkNotInitialized {
                student_id: student_id.to_string(),
                date,
            });
        };
        *mark = mark.toggled();
        Ok(*mark)
    }

    /// Marks of one student in date order.
    pub fn student_marks(&self, student_id: &str) -> Vec<(DateKey, Mark)> {
        self.marks
            .iter()
            .filter(|((sid, _), _)| sid == student_id)
            .map(|((_, date), mark)| (*date, *mark))
            .collect()
    }
}

/// Percentage of present marks, rounded to the nearest integer. 0 when empty.
pub fn attendance_rate(records: &[Mark]) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let present = records.iter().filter(|m| **m == Mark::Present).count();
    ((present as f64 / records.len() as f64) * 100.0).round() as u32
}

pub fn absence_count(records: &[Mark]) -> usize {
    records.iter().filter(|m| **m == Mark::Absent).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub rate: u32,
}

pub fn attendance_stats(records: &[Mark]) -> AttendanceStats {
    let absent = absence_count(records);
    AttendanceStats {
        total: records.len(),
        present: records.len() - absent,
        absent,
        rate: attendance_rate(records),
    }
}
