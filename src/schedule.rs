use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WEEKDAYS: usize = 5;
pub const SLOTS_PER_DAY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; WEEKDAYS] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "segunda" => Some(Self::Monday),
            "tuesday" | "terça" | "terca" => Some(Self::Tuesday),
            "wednesday" | "quarta" => Some(Self::Wednesday),
            "thursday" | "quinta" => Some(Self::Thursday),
            "friday" | "sexta" => Some(Self::Friday),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),
    #[error("slot must be in 1..={max}, got {got}")]
    SlotOutOfRange { got: u64, max: usize },
}

/// One cell of a class timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    pub slot: usize,
    pub subject: Option<String>,
}

/// Weekday x lesson-slot grid for one class. Empty cells have no subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekGrid {
    cells: [[Option<String>; SLOTS_PER_DAY]; WEEKDAYS],
}

impl WeekGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// `slot` is 1-based.
    pub fn slot_index(slot: u64) -> Result<usize, ScheduleError> {
        if slot == 0 || slot as usize > SLOTS_PER_DAY {
            return Err(ScheduleError::SlotOutOfRange {
                got: slot,
                max: SLOTS_PER_DAY,
            });
        }
        Ok(slot as usize - 1)
    }

    pub fn get(&self, weekday: Weekday, slot: usize) -> Option<&str> {
        self.cells
            .get(weekday.index())
            .and_then(|day| day.get(slot))
            .and_then(|c| c.as_deref())
    }

    /// Blank subjects clear the cell.
    pub fn set(&mut self, weekday: Weekday, slot: usize, subject: Option<&str>) {
        if let Some(cell) = self
            .cells
            .get_mut(weekday.index())
            .and_then(|day| day.get_mut(slot))
        {
            *cell = subject
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }
    }

    pub fn slots(&self) -> Vec<ScheduleSlot> {
        let mut out = Vec::with_capacity(WEEKDAYS * SLOTS_PER_DAY);
        for weekday in Weekday::ALL {
            for slot in 0..SLOTS_PER_DAY {
                out.push(ScheduleSlot {
                    weekday,
                    slot: slot + 1,
                    subject: self.get(weekday, slot).map(str::to_string),
                });
            }
        }
        out
    }

    /// Rows by slot, columns by weekday, the way the timetable is drawn.
    pub fn rows(&self) -> Vec<Vec<Option<String>>> {
        (0..SLOTS_PER_DAY)
            .map(|slot| {
                Weekday::ALL
                    .iter()
                    .map(|d| self.get(*d, slot).map(str::to_string))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_five_by_five() {
        let grid = WeekGrid::new();
        assert_eq!(grid.slots().len(), 25);
        let rows = grid.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 5 && r.iter().all(Option::is_none)));
    }

    #[test]
    fn set_and_clear_cell() {
        let mut grid = WeekGrid::new();
        let idx = WeekGrid::slot_index(2).expect("slot");
        grid.set(Weekday::Wednesday, idx, Some(" Matemática "));
        assert_eq!(grid.get(Weekday::Wednesday, idx), Some("Matemática"));
        assert_eq!(grid.rows()[1][2].as_deref(), Some("Matemática"));
        grid.set(Weekday::Wednesday, idx, Some("   "));
        assert_eq!(grid.get(Weekday::Wednesday, idx), None);
    }

    #[test]
    fn slot_bounds_are_one_based() {
        assert!(WeekGrid::slot_index(0).is_err());
        assert_eq!(WeekGrid::slot_index(1), Ok(0));
        assert_eq!(WeekGrid::slot_index(5), Ok(4));
        assert!(WeekGrid::slot_index(6).is_err());
    }

    #[test]
    fn weekday_labels() {
        assert_eq!(Weekday::parse("Segunda"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("terça"), Some(Weekday::Tuesday));
        assert_eq!(Weekday::parse("saturday"), None);
    }
}
