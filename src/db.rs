use crate::attendance::{AttendanceLedger, DateKey, Mark};
use crate::grades::{BimesterScores, GradeRecord};
use crate::model::{
    ClassSection, Document, Event, ManagementMember, Meeting, MeetingStatus, Period, StaffIdentity,
    StaffStatus, Student, StudentStatus, Teacher,
};
use crate::schedule::{WeekGrid, Weekday};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

pub const DB_FILE_NAME: &str = "rosterd.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(workspace.join(DB_FILE_NAME))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            teacher TEXT NOT NULL,
            period TEXT NOT NULL,
            room TEXT NOT NULL,
            capacity INTEGER NOT NULL,
            year TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_classes_room_period ON classes(room, period)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            class_id TEXT,
            name TEXT NOT NULL,
            grade TEXT NOT NULL,
            status TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            student_id TEXT NOT NULL,
            subject TEXT NOT NULL,
            b1 REAL NOT NULL,
            b2 REAL NOT NULL,
            b3 REAL NOT NULL,
            b4 REAL NOT NULL,
            PRIMARY KEY(student_id, subject),
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance_dates(
            class_id TEXT NOT NULL,
            date TEXT NOT NULL,
            PRIMARY KEY(class_id, date),
            FOREIGN KEY(class_id) REFERENCES classes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance_marks(
            class_id TEXT NOT NULL,
            student_id TEXT NOT NULL,
            date TEXT NOT NULL,
            mark TEXT NOT NULL,
            PRIMARY KEY(class_id, student_id, date),
            FOREIGN KEY(class_id) REFERENCES classes(id),
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_marks_student ON attendance_marks(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            registration TEXT NOT NULL,
            rg TEXT NOT NULL,
            cpf TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            status TEXT NOT NULL,
            transfer_date TEXT,
            subjects_json TEXT NOT NULL,
            grade_levels_json TEXT NOT NULL DEFAULT '[]'
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS management_members(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            registration TEXT NOT NULL,
            rg TEXT NOT NULL,
            cpf TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            position TEXT NOT NULL,
            status TEXT NOT NULL,
            transfer_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schedule_slots(
            class_id TEXT NOT NULL,
            weekday INTEGER NOT NULL,
            slot INTEGER NOT NULL,
            subject TEXT NOT NULL,
            PRIMARY KEY(class_id, weekday, slot),
            FOREIGN KEY(class_id) REFERENCES classes(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            location TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            doc_type TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meetings(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            location TEXT NOT NULL,
            attendees TEXT NOT NULL,
            status TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_err(idx, e))
}

fn opt_date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_err(idx, e)))
        .transpose()
}

fn time_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| conversion_err(idx, e))
}

fn json_list_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_err(idx, e))
}

fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn fmt_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

// ---------------------------------------------------------------------------
// classes

const CLASS_SELECT: &str = "SELECT
       c.id, c.name, c.teacher, c.period, c.room, c.capacity, c.year,
       (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS enrolled
     FROM classes c";

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<ClassSection> {
    let period_raw: String = row.get(3)?;
    let period = Period::parse(&period_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown period {}", period_raw).into(),
        )
    })?;
    Ok(ClassSection {
        id: row.get(0)?,
        name: row.get(1)?,
        teacher: row.get(2)?,
        period,
        room: row.get(4)?,
        capacity: row.get(5)?,
        year: row.get(6)?,
        enrolled_count: row.get(7)?,
    })
}

/// Enrolled counts come from the students currently linked to each class.
pub fn list_classes(conn: &Connection) -> anyhow::Result<Vec<ClassSection>> {
    let sql = format!("{} ORDER BY c.name", CLASS_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], class_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_class(conn: &Connection, class_id: &str) -> anyhow::Result<Option<ClassSection>> {
    let sql = format!("{} WHERE c.id = ?", CLASS_SELECT);
    Ok(conn.query_row(&sql, [class_id], class_from_row).optional()?)
}

pub fn class_exists(conn: &Connection, class_id: &str) -> anyhow::Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM classes WHERE id = ?", [class_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

pub fn insert_class(conn: &Connection, section: &ClassSection) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO classes(id, name, teacher, period, room, capacity, year)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &section.id,
            &section.name,
            &section.teacher,
            section.period.key(),
            &section.room,
            section.capacity,
            &section.year,
        ),
    )?;
    Ok(())
}

pub fn update_class(conn: &Connection, section: &ClassSection) -> anyhow::Result<bool> {
    let n = conn.execute(
        "UPDATE classes
         SET name = ?, teacher = ?, period = ?, room = ?, capacity = ?, year = ?
         WHERE id = ?",
        (
            &section.name,
            &section.teacher,
            section.period.key(),
            &section.room,
            section.capacity,
            &section.year,
            &section.id,
        ),
    )?;
    Ok(n > 0)
}

/// Removes a class with its sheet and timetable. Students stay, unassigned.
pub fn delete_class(conn: &Connection, class_id: &str) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM attendance_marks WHERE class_id = ?", [class_id])?;
    tx.execute("DELETE FROM attendance_dates WHERE class_id = ?", [class_id])?;
    tx.execute("DELETE FROM schedule_slots WHERE class_id = ?", [class_id])?;
    tx.execute(
        "UPDATE students SET class_id = NULL WHERE class_id = ?",
        [class_id],
    )?;
    let n = tx.execute("DELETE FROM classes WHERE id = ?", [class_id])?;
    tx.commit()?;
    Ok(n > 0)
}

// ---------------------------------------------------------------------------
// students

const STUDENT_SELECT: &str = "SELECT s.id, s.name, s.class_id, COALESCE(c.name, ''), s.grade, s.status
     FROM students s
     LEFT JOIN classes c ON c.id = s.class_id";

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    let status_raw: String = row.get(5)?;
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        class_id: row.get(2)?,
        class_name: row.get(3)?,
        grade: row.get(4)?,
        status: StudentStatus::parse(&status_raw).unwrap_or(StudentStatus::Active),
    })
}

pub fn list_students(conn: &Connection, class_id: Option<&str>) -> anyhow::Result<Vec<Student>> {
    let rows = match class_id {
        Some(cid) => {
            let sql = format!(
                "{} WHERE s.class_id = ? ORDER BY s.sort_order, s.name",
                STUDENT_SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([cid], student_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("{} ORDER BY s.name", STUDENT_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], student_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

pub fn get_student(conn: &Connection, student_id: &str) -> anyhow::Result<Option<Student>> {
    let sql = format!("{} WHERE s.id = ?", STUDENT_SELECT);
    Ok(conn
        .query_row(&sql, [student_id], student_from_row)
        .optional()?)
}

pub fn insert_student(conn: &Connection, student: &Student) -> anyhow::Result<()> {
    let next_sort: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM students",
        [],
        |r| r.get(0),
    )?;
    conn.execute(
        "INSERT INTO students(id, class_id, name, grade, status, sort_order)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &student.id,
            &student.class_id,
            &student.name,
            &student.grade,
            student.status.key(),
            next_sort,
        ),
    )?;
    Ok(())
}

pub fn update_student(conn: &Connection, student: &Student) -> anyhow::Result<bool> {
    let n = conn.execute(
        "UPDATE students
         SET class_id = ?, name = ?, grade = ?, status = ?
         WHERE id = ?",
        (
            &student.class_id,
            &student.name,
            &student.grade,
            student.status.key(),
            &student.id,
        ),
    )?;
    Ok(n > 0)
}

pub fn delete_student(conn: &Connection, student_id: &str) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM attendance_marks WHERE student_id = ?",
        [student_id],
    )?;
    tx.execute("DELETE FROM grades WHERE student_id = ?", [student_id])?;
    let n = tx.execute("DELETE FROM students WHERE id = ?", [student_id])?;
    tx.commit()?;
    Ok(n > 0)
}

// ---------------------------------------------------------------------------
// grades

pub fn get_scores(
    conn: &Connection,
    student_id: &str,
    subject: &str,
) -> anyhow::Result<Option<BimesterScores>> {
    Ok(conn
        .query_row(
            "SELECT b1, b2, b3, b4 FROM grades WHERE student_id = ? AND subject = ?",
            (student_id, subject),
            |r| Ok(BimesterScores::new(r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?)
}

pub fn upsert_scores(
    conn: &Connection,
    student_id: &str,
    subject: &str,
    scores: BimesterScores,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO grades(student_id, subject, b1, b2, b3, b4)
         VALUES(?, ?, ?, ?, ?, ?)
         ON CONFLICT(student_id, subject) DO UPDATE SET
           b1 = excluded.b1, b2 = excluded.b2, b3 = excluded.b3, b4 = excluded.b4",
        (student_id, subject, scores.b1, scores.b2, scores.b3, scores.b4),
    )?;
    Ok(())
}

pub fn grade_record(conn: &Connection, student_id: &str) -> anyhow::Result<GradeRecord> {
    let mut stmt = conn.prepare(
        "SELECT subject, b1, b2, b3, b4 FROM grades WHERE student_id = ? ORDER BY subject",
    )?;
    let rows = stmt
        .query_map([student_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                BimesterScores::new(r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?),
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().collect())
}

pub fn class_subjects(conn: &Connection, class_id: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT g.subject
         FROM grades g
         JOIN students s ON s.id = g.student_id
         WHERE s.class_id = ?
         ORDER BY g.subject",
    )?;
    let rows = stmt
        .query_map([class_id], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// attendance

pub fn load_ledger(conn: &Connection, class_id: &str) -> anyhow::Result<AttendanceLedger> {
    let mut stmt = conn.prepare(
        "SELECT student_id, date, mark FROM attendance_marks WHERE class_id = ?",
    )?;
    let rows = stmt
        .query_map([class_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut marks = Vec::with_capacity(rows.len());
    for (student_id, date_raw, mark_raw) in rows {
        let date = DateKey::parse(&date_raw)?;
        let mark = Mark::from_code(&mark_raw)
            .ok_or_else(|| anyhow::anyhow!("bad attendance mark {:?}", mark_raw))?;
        marks.push((student_id, date, mark));
    }
    let mut ledger = AttendanceLedger::from_marks(marks);

    // Dates registered before any student was enrolled have no marks.
    let mut stmt = conn.prepare("SELECT date FROM attendance_dates WHERE class_id = ?")?;
    let dates = stmt
        .query_map([class_id], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for raw in dates {
        let date = DateKey::parse(&raw)?;
        if !ledger.has_date(date) {
            ledger.add_date(date, std::iter::empty::<&str>())?;
        }
    }
    Ok(ledger)
}

pub fn insert_attendance_date(
    conn: &Connection,
    class_id: &str,
    date: DateKey,
    student_ids: &[String],
) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    let date_s = date.to_string();
    tx.execute(
        "INSERT INTO attendance_dates(class_id, date) VALUES(?, ?)",
        (class_id, &date_s),
    )?;
    for student_id in student_ids {
        tx.execute(
            "INSERT INTO attendance_marks(class_id, student_id, date, mark)
             VALUES(?, ?, ?, ?)
             ON CONFLICT(class_id, student_id, date) DO UPDATE SET mark = excluded.mark",
            (class_id, student_id, &date_s, Mark::Present.code()),
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn set_mark(
    conn: &Connection,
    class_id: &str,
    student_id: &str,
    date: DateKey,
    mark: Mark,
) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE attendance_marks SET mark = ?
         WHERE class_id = ? AND student_id = ? AND date = ?",
        (mark.code(), class_id, student_id, date.to_string()),
    )?;
    Ok(())
}

/// Every mark of one student across classes, in date order.
pub fn student_marks(conn: &Connection, student_id: &str) -> anyhow::Result<Vec<(DateKey, Mark)>> {
    let mut stmt = conn.prepare(
        "SELECT date, mark FROM attendance_marks WHERE student_id = ? ORDER BY date",
    )?;
    let rows = stmt
        .query_map([student_id], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut out = Vec::with_capacity(rows.len());
    for (date_raw, mark_raw) in rows {
        let mark = Mark::from_code(&mark_raw)
            .ok_or_else(|| anyhow::anyhow!("bad attendance mark {:?}", mark_raw))?;
        out.push((DateKey::parse(&date_raw)?, mark));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// staff

fn identity_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<StaffIdentity> {
    Ok(StaffIdentity {
        registration: row.get(start)?,
        rg: row.get(start + 1)?,
        cpf: row.get(start + 2)?,
        email: row.get(start + 3)?,
        phone: row.get(start + 4)?,
    })
}

fn staff_status_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<StaffStatus> {
    let raw: String = row.get(idx)?;
    Ok(StaffStatus::parse(&raw).unwrap_or(StaffStatus::Active))
}

fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        identity: identity_from_row(row, 2)?,
        status: staff_status_col(row, 7)?,
        transfer_date: opt_date_col(row, 8)?,
        subjects: json_list_col(row, 9)?,
        grade_levels: json_list_col(row, 10)?,
    })
}

pub fn list_teachers(conn: &Connection) -> anyhow::Result<Vec<Teacher>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, registration, rg, cpf, email, phone, status, transfer_date,
                subjects_json, grade_levels_json
         FROM teachers ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], teacher_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn upsert_teacher(conn: &Connection, t: &Teacher) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO teachers(id, name, registration, rg, cpf, email, phone, status,
                              transfer_date, subjects_json, grade_levels_json)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           registration = excluded.registration,
           rg = excluded.rg,
           cpf = excluded.cpf,
           email = excluded.email,
           phone = excluded.phone,
           status = excluded.status,
           transfer_date = excluded.transfer_date,
           subjects_json = excluded.subjects_json,
           grade_levels_json = excluded.grade_levels_json",
        rusqlite::params![
            t.id,
            t.name,
            t.identity.registration,
            t.identity.rg,
            t.identity.cpf,
            t.identity.email,
            t.identity.phone,
            t.status.key(),
            t.transfer_date.map(fmt_date),
            serde_json::to_string(&t.subjects)?,
            serde_json::to_string(&t.grade_levels)?,
        ],
    )?;
    Ok(())
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<ManagementMember> {
    Ok(ManagementMember {
        id: row.get(0)?,
        name: row.get(1)?,
        identity: identity_from_row(row, 2)?,
        position: row.get(7)?,
        status: staff_status_col(row, 8)?,
        transfer_date: opt_date_col(row, 9)?,
    })
}

pub fn list_management(conn: &Connection) -> anyhow::Result<Vec<ManagementMember>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, registration, rg, cpf, email, phone, position, status, transfer_date
         FROM management_members ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn upsert_management(conn: &Connection, m: &ManagementMember) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO management_members(id, name, registration, rg, cpf, email, phone,
                                        position, status, transfer_date)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           registration = excluded.registration,
           rg = excluded.rg,
           cpf = excluded.cpf,
           email = excluded.email,
           phone = excluded.phone,
           position = excluded.position,
           status = excluded.status,
           transfer_date = excluded.transfer_date",
        rusqlite::params![
            m.id,
            m.name,
            m.identity.registration,
            m.identity.rg,
            m.identity.cpf,
            m.identity.email,
            m.identity.phone,
            m.position,
            m.status.key(),
            m.transfer_date.map(fmt_date),
        ],
    )?;
    Ok(())
}

/// Deletes by id from one of the simple record tables.
pub fn delete_by_id(conn: &Connection, table: RecordTable, id: &str) -> anyhow::Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", table.name());
    Ok(conn.execute(&sql, [id])? > 0)
}

pub fn row_exists(conn: &Connection, table: RecordTable, id: &str) -> anyhow::Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table.name());
    Ok(conn
        .query_row(&sql, [id], |r| r.get::<_, i64>(0))
        .optional()?
        .is_some())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTable {
    Teachers,
    Management,
    Events,
    Documents,
    Meetings,
}

impl RecordTable {
    fn name(self) -> &'static str {
        match self {
            Self::Teachers => "teachers",
            Self::Management => "management_members",
            Self::Events => "events",
            Self::Documents => "documents",
            Self::Meetings => "meetings",
        }
    }
}

// ---------------------------------------------------------------------------
// schedule

pub fn load_schedule(conn: &Connection, class_id: &str) -> anyhow::Result<WeekGrid> {
    let mut stmt =
        conn.prepare("SELECT weekday, slot, subject FROM schedule_slots WHERE class_id = ?")?;
    let rows = stmt
        .query_map([class_id], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut grid = WeekGrid::new();
    for (weekday, slot, subject) in rows {
        let Some(day) = usize::try_from(weekday)
            .ok()
            .and_then(|i| Weekday::ALL.get(i).copied())
        else {
            continue;
        };
        let Ok(slot) = usize::try_from(slot) else {
            continue;
        };
        grid.set(day, slot, Some(&subject));
    }
    Ok(grid)
}

/// `slot` is the 0-based grid index. `None` clears the cell.
pub fn set_schedule_slot(
    conn: &Connection,
    class_id: &str,
    weekday: Weekday,
    slot: usize,
    subject: Option<&str>,
) -> anyhow::Result<()> {
    match subject.map(str::trim).filter(|s| !s.is_empty()) {
        Some(subject) => {
            conn.execute(
                "INSERT INTO schedule_slots(class_id, weekday, slot, subject)
                 VALUES(?, ?, ?, ?)
                 ON CONFLICT(class_id, weekday, slot) DO UPDATE SET subject = excluded.subject",
                (class_id, weekday.index() as i64, slot as i64, subject),
            )?;
        }
        None => {
            conn.execute(
                "DELETE FROM schedule_slots WHERE class_id = ? AND weekday = ? AND slot = ?",
                (class_id, weekday.index() as i64, slot as i64),
            )?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// events, documents, meetings

fn event_from_row(r: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: r.get(0)?,
        title: r.get(1)?,
        date: date_col(r, 2)?,
        start_time: time_col(r, 3)?,
        end_time: time_col(r, 4)?,
        location: r.get(5)?,
    })
}

pub fn list_events(conn: &Connection, on: Option<NaiveDate>) -> anyhow::Result<Vec<Event>> {
    let base = "SELECT id, title, date, start_time, end_time, location FROM events";
    let rows = match on {
        Some(d) => {
            let sql = format!("{} WHERE date = ? ORDER BY start_time, title", base);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([fmt_date(d)], event_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("{} ORDER BY date, start_time, title", base);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], event_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

pub fn insert_event(conn: &Connection, e: &Event) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO events(id, title, date, start_time, end_time, location)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &e.id,
            &e.title,
            fmt_date(e.date),
            fmt_time(e.start_time),
            fmt_time(e.end_time),
            &e.location,
        ),
    )?;
    Ok(())
}

pub fn list_documents(conn: &Connection) -> anyhow::Result<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, doc_type, description, created_at
         FROM documents ORDER BY created_at DESC, title",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Document {
                id: r.get(0)?,
                title: r.get(1)?,
                doc_type: r.get(2)?,
                description: r.get(3)?,
                created_at: date_col(r, 4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_document(conn: &Connection, d: &Document) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO documents(id, title, doc_type, description, created_at)
         VALUES(?, ?, ?, ?, ?)",
        (
            &d.id,
            &d.title,
            &d.doc_type,
            &d.description,
            fmt_date(d.created_at),
        ),
    )?;
    Ok(())
}

pub fn list_meetings(conn: &Connection) -> anyhow::Result<Vec<Meeting>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, date, time, location, attendees, status
         FROM meetings ORDER BY date DESC, time",
    )?;
    let rows = stmt
        .query_map([], |r| {
            let status_raw: String = r.get(6)?;
            Ok(Meeting {
                id: r.get(0)?,
                title: r.get(1)?,
                date: date_col(r, 2)?,
                time: time_col(r, 3)?,
                location: r.get(4)?,
                attendees: r.get(5)?,
                status: MeetingStatus::parse(&status_raw).unwrap_or(MeetingStatus::Scheduled),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_meeting(conn: &Connection, m: &Meeting) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO meetings(id, title, date, time, location, attendees, status)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &m.id,
            &m.title,
            fmt_date(m.date),
            fmt_time(m.time),
            &m.location,
            &m.attendees,
            m.status.key(),
        ),
    )?;
    Ok(())
}
