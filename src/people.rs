//! Dashboard person search across the student, teacher and management rosters.

use crate::filter::{filter_by_query, Searchable};
use crate::model::{ManagementMember, Student, Teacher};
use serde::Serialize;

/// Queries shorter than this (after trimming) return nothing.
pub const MIN_PEOPLE_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonRole {
    Student,
    Teacher,
    Management,
}

impl PersonRole {
    pub fn key(self) -> &'static str {
        match self {
            PersonRole::Student => "student",
            PersonRole::Teacher => "teacher",
            PersonRole::Management => "management",
        }
    }

    /// Badge text shown next to a result.
    pub fn label(self) -> &'static str {
        match self {
            PersonRole::Student => "Aluno",
            PersonRole::Teacher => "Professor",
            PersonRole::Management => "Equipe Gestora",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonHit {
    pub id: String,
    pub name: String,
    pub role: PersonRole,
    pub details: String,
}

impl Searchable for PersonHit {
    const DEFAULT_FIELDS: &'static [&'static str] = &["name", "details"];

    fn field_values(&self, field: &str) -> Vec<&str> {
        match field {
            "name" => vec![self.name.as_str()],
            "details" => vec![self.details.as_str()],
            "role" => vec![self.role.key(), self.role.label()],
            _ => Vec::new(),
        }
    }
}

fn join_present<'a>(parts: impl IntoIterator<Item = &'a str>, sep: &str) -> String {
    parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

impl From<&Student> for PersonHit {
    fn from(s: &Student) -> Self {
        PersonHit {
            id: s.id.clone(),
            name: s.name.clone(),
            role: PersonRole::Student,
            details: join_present([s.grade.as_str(), s.class_name.as_str()], " - "),
        }
    }
}

impl From<&Teacher> for PersonHit {
    fn from(t: &Teacher) -> Self {
        let subjects = t.subjects.join(", ");
        let levels = t.grade_levels.join(", ");
        PersonHit {
            id: t.id.clone(),
            name: t.name.clone(),
            role: PersonRole::Teacher,
            details: join_present([subjects.as_str(), levels.as_str()], " - "),
        }
    }
}

impl From<&ManagementMember> for PersonHit {
    fn from(m: &ManagementMember) -> Self {
        PersonHit {
            id: m.id.clone(),
            name: m.name.clone(),
            role: PersonRole::Management,
            details: m.position.clone(),
        }
    }
}

/// Everyone on file, students first, then teachers, then management.
pub fn directory(
    students: &[Student],
    teachers: &[Teacher],
    management: &[ManagementMember],
) -> Vec<PersonHit> {
    students
        .iter()
        .map(PersonHit::from)
        .chain(teachers.iter().map(PersonHit::from))
        .chain(management.iter().map(PersonHit::from))
        .collect()
}

/// Roster filter over `people`, gated on [`MIN_PEOPLE_QUERY_CHARS`].
pub fn search_people<'a>(people: &'a [PersonHit], query: &str, fields: &[&str]) -> Vec<&'a PersonHit> {
    let query = query.trim();
    if query.chars().count() < MIN_PEOPLE_QUERY_CHARS {
        return Vec::new();
    }
    filter_by_query(people, query, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(name: &str, role: PersonRole, details: &str) -> PersonHit {
        PersonHit {
            id: name.to_lowercase(),
            name: name.to_string(),
            role,
            details: details.to_string(),
        }
    }

    fn people() -> Vec<PersonHit> {
        vec![
            hit("Ana Silva", PersonRole::Student, "9º Ano - 9º Ano B"),
            hit("Carlos Mendes", PersonRole::Teacher, "Matemática - Ensino Fundamental II"),
            hit("Juliana Santos", PersonRole::Management, "Coordenadora Pedagógica"),
        ]
    }

    #[test]
    fn short_queries_find_nothing() {
        let all = people();
        assert!(search_people(&all, "", PersonHit::DEFAULT_FIELDS).is_empty());
        assert!(search_people(&all, "a", PersonHit::DEFAULT_FIELDS).is_empty());
        assert!(search_people(&all, "  a ", PersonHit::DEFAULT_FIELDS).is_empty());
        // Two characters, one of them multi-byte.
        assert_eq!(search_people(&all, "ná", PersonHit::DEFAULT_FIELDS).len(), 0);
        assert_eq!(search_people(&all, "an", PersonHit::DEFAULT_FIELDS).len(), 2);
    }

    #[test]
    fn details_are_searched_alongside_names() {
        let all = people();
        let found = search_people(&all, "matemát", PersonHit::DEFAULT_FIELDS);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].role, PersonRole::Teacher);

        let found = search_people(&all, "COORDENADORA", PersonHit::DEFAULT_FIELDS);
        assert_eq!(found[0].name, "Juliana Santos");
    }

    #[test]
    fn role_field_matches_key_and_badge() {
        let all = people();
        assert_eq!(search_people(&all, "gestora", &["role"]).len(), 1);
        assert_eq!(search_people(&all, "student", &["role"])[0].name, "Ana Silva");
        assert!(search_people(&all, "gestora", PersonHit::DEFAULT_FIELDS).is_empty());
    }

    #[test]
    fn details_skip_blank_parts() {
        assert_eq!(join_present(["", "6º Ano A"], " - "), "6º Ano A");
        assert_eq!(join_present(["Física", "  "], " - "), "Física");
        assert_eq!(join_present(["", ""], " - "), "");
    }

    #[test]
    fn role_wire_name() {
        let v = serde_json::to_value(hit("Ana", PersonRole::Management, "")).expect("json");
        assert_eq!(v["role"], "management");
        assert_eq!(v["details"], "");
    }
}
