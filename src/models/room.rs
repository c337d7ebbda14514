//! Room and subject models.

use serde::{Deserialize, Serialize};

use super::{RoomId, SubjectId};

/// A room lessons can be held in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Room number as printed on the door (e.g., "B204").
    pub number: String,
    /// Descriptive name.
    pub name: String,
    /// Room type (e.g., "Lab", "Gym"). `None` = general classroom.
    pub room_type: Option<String>,
    /// Seats. `None` = unknown, treated as large enough.
    pub capacity: Option<u32>,
}

impl Room {
    /// Creates a general classroom.
    pub fn new(id: RoomId, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            name: String::new(),
            room_type: None,
            capacity: None,
        }
    }

    /// Sets the room type.
    pub fn with_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = Some(room_type.into());
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Case-insensitive room type match.
    pub fn is_type(&self, room_type: &str) -> bool {
        self.room_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(room_type))
    }

    /// Whether `students` fit. Unknown capacity or head count always fits.
    pub fn fits(&self, students: Option<u32>) -> bool {
        match (self.capacity, students) {
            (Some(cap), Some(n)) => cap >= n,
            _ => true,
        }
    }
}

/// A subject taught at the school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: SubjectId,
    /// Subject name (e.g., "Chemistry").
    pub name: String,
    /// Short code (e.g., "CH").
    pub abbreviation: String,
    /// Room the subject should preferably be taught in (SC-9).
    pub preferred_room_id: Option<RoomId>,
}

impl Subject {
    /// Creates a subject.
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            abbreviation: String::new(),
            preferred_room_id: None,
        }
    }

    /// Sets the abbreviation.
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }

    /// Sets the preferred room.
    pub fn with_preferred_room(mut self, room_id: RoomId) -> Self {
        self.preferred_room_id = Some(room_id);
        self
    }
}
