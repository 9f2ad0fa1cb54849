//! School roster sidecar: class sections, students, grades, attendance,
//! staff and school records behind a JSON-lines request loop.

pub mod attendance;
pub mod conflicts;
pub mod db;
pub mod filter;
pub mod grades;
pub mod ipc;
pub mod model;
pub mod people;
pub mod schedule;
