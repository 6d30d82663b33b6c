//! Demo dataset: five students with skills and a handful of availability rows.
//!
//! Served by `PROFILE_STORE=sample` so the API can be exercised without a
//! database, and reused by the test suite.

use crate::models::profile::Profile;
use crate::services::store::{
    assemble_profiles, AvailabilityRow, MemoryProfileStore, SkillRow, UserRow,
};

const USERS: [(&str, &str, &str, &str, u8); 5] = [
    ("USN001", "John", "Doe", "Computer Science", 3),
    ("USN002", "Jane", "Smith", "Information Technology", 3),
    ("USN003", "Mike", "Johnson", "Computer Science", 2),
    ("USN004", "Sarah", "Wilson", "Electronics", 3),
    ("USN005", "David", "Brown", "Information Technology", 4),
];

const SKILLS: [(i64, &str); 8] = [
    (1, "Python"),
    (2, "JavaScript"),
    (3, "Java"),
    (4, "React"),
    (5, "Node.js"),
    (6, "Machine Learning"),
    (7, "Database Design"),
    (8, "Web Development"),
];

const USER_SKILLS: [(&str, i64, u8); 10] = [
    ("USN001", 1, 4),
    ("USN001", 6, 3),
    ("USN002", 2, 5),
    ("USN002", 4, 4),
    ("USN003", 3, 3),
    ("USN003", 7, 4),
    ("USN004", 8, 4),
    ("USN004", 2, 3),
    ("USN005", 5, 5),
    ("USN005", 1, 4),
];

// (usn, day_of_week with 0=Sunday, start, end, is_available)
const AVAILABILITY: [(&str, i64, &str, &str, bool); 20] = [
    // USN001: Monday-Wednesday mornings and evenings
    ("USN001", 1, "08:00", "10:00", true),
    ("USN001", 1, "18:00", "20:00", true),
    ("USN001", 2, "08:00", "10:00", true),
    ("USN001", 2, "18:00", "20:00", true),
    ("USN001", 3, "08:00", "10:00", true),
    ("USN001", 3, "18:00", "20:00", true),
    // USN002: Tuesday-Thursday afternoons
    ("USN002", 2, "12:00", "14:00", true),
    ("USN002", 2, "14:00", "16:00", true),
    ("USN002", 3, "12:00", "14:00", true),
    ("USN002", 3, "14:00", "16:00", true),
    ("USN002", 4, "12:00", "14:00", true),
    ("USN002", 4, "14:00", "16:00", true),
    // USN003: Monday, Wednesday, Friday mornings
    ("USN003", 1, "08:00", "10:00", true),
    ("USN003", 1, "10:00", "12:00", true),
    ("USN003", 3, "08:00", "10:00", true),
    ("USN003", 3, "10:00", "12:00", true),
    ("USN003", 5, "08:00", "10:00", true),
    ("USN003", 5, "10:00", "12:00", true),
    // Blocked slots
    ("USN001", 1, "12:00", "14:00", false),
    ("USN002", 2, "08:00", "10:00", false),
];

pub fn sample_profiles() -> Vec<Profile> {
    let users = USERS
        .iter()
        .map(|(usn, first_name, last_name, department, year)| UserRow {
            usn: usn.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            department: department.to_string(),
            year: *year,
        })
        .collect();

    let skills = USER_SKILLS
        .iter()
        .filter_map(|(usn, skill_id, level)| {
            SKILLS
                .iter()
                .find(|(id, _)| id == skill_id)
                .map(|(_, name)| SkillRow {
                    usn: usn.to_string(),
                    skill_id: Some(*skill_id),
                    skill_name: name.to_string(),
                    proficiency_level: *level,
                })
        })
        .collect();

    let availability = AVAILABILITY
        .iter()
        .map(|(usn, day, start, end, is_available)| AvailabilityRow {
            usn: usn.to_string(),
            day_of_week: *day,
            time_slot_start: start.to_string(),
            time_slot_end: end.to_string(),
            is_available: *is_available,
        })
        .collect();

    let mut profiles: Vec<Profile> = assemble_profiles(users, skills, availability)
        .into_values()
        .collect();
    profiles.sort_by(|a, b| a.id.cmp(&b.id));
    profiles
}

pub fn sample_store() -> MemoryProfileStore {
    MemoryProfileStore::new(sample_profiles())
}
