//! Classrooms and the semester timetable.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::domain::{
    Course, CourseCode, KeyedSet,
    keyed::Keyed,
    text::{Text, ValidationError, positive},
};

/// The smallest number of seats a classroom may have.
pub const MINIMUM_SEATS: u32 = 30;

/// Identifies a classroom by building and room number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoomKey {
    /// The building name.
    pub building: String,
    /// The room number within the building.
    pub room_number: String,
}

/// A room courses can be scheduled in.
///
/// The number of seats is not part of a classroom's identity.
#[derive(Debug, Clone)]
pub struct Classroom {
    building: Text,
    room_number: Text,
    seats: u32,
}

impl Classroom {
    /// Creates a classroom.
    ///
    /// # Errors
    ///
    /// - [`ClassroomError::Validation`] if the building or room number is
    ///   blank, or the seat count is not positive
    /// - [`ClassroomError::ClassroomTooSmall`] if there are fewer than
    ///   [`MINIMUM_SEATS`] seats
    pub fn new(
        building: impl AsRef<str>,
        room_number: impl AsRef<str>,
        seats: i64,
    ) -> Result<Self, ClassroomError> {
        Ok(Self {
            building: Text::new("building", building)?,
            room_number: Text::new("room number", room_number)?,
            seats: validate_seats(seats)?,
        })
    }

    /// The building the room is in.
    #[must_use]
    pub fn building(&self) -> &str {
        self.building.as_str()
    }

    /// The room number.
    #[must_use]
    pub fn room_number(&self) -> &str {
        self.room_number.as_str()
    }

    /// The number of seats.
    #[must_use]
    pub const fn seats(&self) -> u32 {
        self.seats
    }

    /// Replaces the building.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the classroom unchanged, if the building is
    /// blank.
    pub fn set_building(&mut self, building: impl AsRef<str>) -> Result<(), ValidationError> {
        self.building = Text::new("building", building)?;
        Ok(())
    }

    /// Replaces the room number.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the classroom unchanged, if the room number
    /// is blank.
    pub fn set_room_number(&mut self, room_number: impl AsRef<str>) -> Result<(), ValidationError> {
        self.room_number = Text::new("room number", room_number)?;
        Ok(())
    }

    /// Replaces the number of seats.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the classroom unchanged, if the seat count is
    /// not positive or below [`MINIMUM_SEATS`].
    pub fn set_seats(&mut self, seats: i64) -> Result<(), ClassroomError> {
        self.seats = validate_seats(seats)?;
        Ok(())
    }
}

fn validate_seats(seats: i64) -> Result<u32, ClassroomError> {
    let seats = positive("seats", seats)?;
    if seats < MINIMUM_SEATS {
        return Err(ClassroomTooSmall { seats }.into());
    }
    Ok(seats)
}

impl Keyed for Classroom {
    type Key = RoomKey;

    fn key(&self) -> RoomKey {
        RoomKey {
            building: self.building.to_string(),
            room_number: self.room_number.to_string(),
        }
    }
}

/// A classroom was given fewer than [`MINIMUM_SEATS`] seats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a classroom must have at least {} seats, got {seats}", MINIMUM_SEATS)]
pub struct ClassroomTooSmall {
    /// The rejected seat count.
    pub seats: u32,
}

/// Errors that can occur when constructing a [`Classroom`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassroomError {
    /// A field failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The classroom has too few seats.
    #[error(transparent)]
    ClassroomTooSmall(#[from] ClassroomTooSmall),
}

/// A course held in a classroom at a given time.
///
/// All three fields form the identity of a scheduled course.
#[derive(Debug, Clone)]
pub struct ScheduledCourse {
    course: Arc<Course>,
    classroom: Arc<Classroom>,
    starts_at: NaiveDateTime,
}

impl ScheduledCourse {
    /// Schedules `course` in `classroom` at `starts_at`.
    #[must_use]
    pub const fn new(
        course: Arc<Course>,
        classroom: Arc<Classroom>,
        starts_at: NaiveDateTime,
    ) -> Self {
        Self {
            course,
            classroom,
            starts_at,
        }
    }

    /// The scheduled course.
    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// The classroom the course is held in.
    #[must_use]
    pub fn classroom(&self) -> &Classroom {
        &self.classroom
    }

    /// When the course takes place.
    #[must_use]
    pub const fn starts_at(&self) -> NaiveDateTime {
        self.starts_at
    }
}

impl Keyed for ScheduledCourse {
    type Key = (CourseCode, RoomKey, NaiveDateTime);

    fn key(&self) -> Self::Key {
        (self.course.key(), self.classroom.key(), self.starts_at)
    }
}

/// The set of courses scheduled for a semester.
#[derive(Debug, Clone, Default)]
pub struct SemesterSchedule {
    entries: KeyedSet<ScheduledCourse>,
}

impl SemesterSchedule {
    /// Creates a schedule, dropping repeated entries.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = ScheduledCourse>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Adds an entry. Returns `false` if an identical entry already exists.
    pub fn add(&mut self, entry: ScheduledCourse) -> bool {
        self.entries.insert(entry)
    }

    /// Returns `true` if an identical entry exists.
    #[must_use]
    pub fn contains(&self, entry: &ScheduledCourse) -> bool {
        self.entries.contains(entry)
    }

    /// All entries in the order they were added.
    #[must_use]
    pub fn entries(&self) -> &[ScheduledCourse] {
        self.entries.as_slice()
    }
}
