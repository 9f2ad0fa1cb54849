pub mod attendance;
pub mod classes;
pub mod core;
pub mod grades;
pub mod people;
pub mod records;
pub mod schedule;
pub mod settings;
pub mod staff;
pub mod students;
