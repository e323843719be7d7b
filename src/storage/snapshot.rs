//! Binary snapshots of the enrollment ledger.
//!
//! A snapshot is a [borsh](https://borsh.io/)-encoded envelope holding a
//! versioned list of enrollment records and a SHA-256 checksum of that list.
//! Each record carries a full copy of its student and course, so a snapshot
//! can be restored without the source files. Students and courses that
//! appear in several records are shared again after decoding.

use std::{collections::BTreeMap, io, path::Path, sync::Arc};

use borsh::{BorshDeserialize, BorshSerialize};
use chrono::{DateTime, NaiveDate};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::domain::{Course, CourseCode, Enrollment, PersonId, Student};

const MAGIC: [u8; 4] = *b"ENRL";

/// Errors that can occur when reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read or written.
    #[error("failed to access snapshot file: {0}")]
    Io(#[from] io::Error),

    /// The bytes are not a snapshot.
    #[error("failed to decode snapshot: {source}")]
    Decode {
        /// The decoding failure.
        #[source]
        source: io::Error,
    },

    /// The payload does not match its checksum.
    #[error("snapshot checksum mismatch, the data is corrupt")]
    ChecksumMismatch,

    /// A record decoded but describes an invalid entity.
    #[error("enrollment {index} in snapshot is invalid: {reason}")]
    Invalid {
        /// Position of the record in the snapshot.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
}

#[derive(BorshSerialize, BorshDeserialize)]
struct Envelope {
    magic: [u8; 4],
    checksum: [u8; 32],
    payload: Vec<u8>,
}

/// The serialized versions of the ledger.
#[derive(BorshSerialize, BorshDeserialize)]
enum Versions {
    V1(Vec<EnrollmentRecord>),
}

#[derive(BorshSerialize, BorshDeserialize)]
struct EnrollmentRecord {
    student: StudentRecord,
    course: CourseRecord,
    /// Seconds since the Unix epoch, ignoring time zones.
    seconds: i64,
    nanoseconds: u32,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct StudentRecord {
    id: String,
    name: String,
    /// Days since 0001-01-01 (day 1).
    joined: i32,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct CourseRecord {
    code: String,
    title: String,
    credit_points: u32,
    capacity: u32,
    prerequisites: Vec<String>,
}

impl From<&Enrollment> for EnrollmentRecord {
    fn from(enrollment: &Enrollment) -> Self {
        let student = enrollment.student();
        let course = enrollment.course();
        let timestamp = enrollment.timestamp().and_utc();

        Self {
            student: StudentRecord {
                id: student.id().to_string(),
                name: student.name().to_string(),
                joined: chrono::Datelike::num_days_from_ce(&student.enrollment_date()),
            },
            course: CourseRecord {
                code: course.code().to_string(),
                title: course.title().to_string(),
                credit_points: course.credit_points(),
                capacity: course.capacity(),
                prerequisites: course
                    .prerequisites()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            seconds: timestamp.timestamp(),
            nanoseconds: timestamp.timestamp_subsec_nanos(),
        }
    }
}

impl StudentRecord {
    fn restore(self) -> Result<Student, String> {
        let joined = NaiveDate::from_num_days_from_ce_opt(self.joined)
            .ok_or_else(|| format!("join date out of range ({} days)", self.joined))?;
        Student::new(self.id, self.name, joined).map_err(|e| e.to_string())
    }
}

impl CourseRecord {
    fn restore(self) -> Result<Course, String> {
        let prerequisites = self
            .prerequisites
            .iter()
            .map(CourseCode::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        let course = Course::new(
            self.code,
            self.title,
            i64::from(self.credit_points),
            i64::from(self.capacity),
        )
        .map_err(|e| e.to_string())?;

        Ok(course.with_prerequisites(prerequisites))
    }
}

/// Restores records, sharing entities that appear more than once.
#[derive(Default)]
struct Restorer {
    students: BTreeMap<PersonId, Arc<Student>>,
    courses: BTreeMap<CourseCode, Arc<Course>>,
}

impl Restorer {
    fn restore(&mut self, record: EnrollmentRecord) -> Result<Enrollment, String> {
        let student = record.student.restore()?;
        let student = Arc::clone(
            self.students
                .entry(student.id().clone())
                .or_insert_with(|| Arc::new(student)),
        );

        let course = record.course.restore()?;
        let course = Arc::clone(
            self.courses
                .entry(course.code().clone())
                .or_insert_with(|| Arc::new(course)),
        );

        let timestamp = DateTime::from_timestamp(record.seconds, record.nanoseconds)
            .ok_or_else(|| format!("timestamp out of range ({}s)", record.seconds))?
            .naive_utc();

        Ok(Enrollment::new(student, course, timestamp))
    }
}

fn checksum(payload: &[u8]) -> [u8; 32] {
    let mut checksum = [0; 32];
    checksum.copy_from_slice(&Sha256::digest(payload));
    checksum
}

/// Encodes enrollments, in order, into a snapshot.
///
/// # Panics
///
/// Panics if borsh serialization fails (which should never happen when
/// writing to memory).
#[must_use]
pub fn serialize(enrollments: &[Enrollment]) -> Vec<u8> {
    let records = Versions::V1(enrollments.iter().map(EnrollmentRecord::from).collect());
    let payload = borsh::to_vec(&records).expect("this should never fail");

    let envelope = Envelope {
        magic: MAGIC,
        checksum: checksum(&payload),
        payload,
    };
    borsh::to_vec(&envelope).expect("this should never fail")
}

/// Decodes a snapshot into enrollments, in their original order.
///
/// # Errors
///
/// - [`SnapshotError::Decode`] if the bytes are not a snapshot
/// - [`SnapshotError::ChecksumMismatch`] if the payload has been altered
/// - [`SnapshotError::Invalid`] if a record fails domain validation
pub fn deserialize(bytes: &[u8]) -> Result<Vec<Enrollment>, SnapshotError> {
    let envelope: Envelope =
        borsh::from_slice(bytes).map_err(|source| SnapshotError::Decode { source })?;

    if envelope.magic != MAGIC {
        return Err(SnapshotError::Decode {
            source: io::Error::new(io::ErrorKind::InvalidData, "not an enrollment snapshot"),
        });
    }
    if checksum(&envelope.payload) != envelope.checksum {
        return Err(SnapshotError::ChecksumMismatch);
    }

    let Versions::V1(records) = borsh::from_slice(&envelope.payload)
        .map_err(|source| SnapshotError::Decode { source })?;

    let mut restorer = Restorer::default();
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            restorer
                .restore(record)
                .map_err(|reason| SnapshotError::Invalid { index, reason })
        })
        .collect()
}

/// Writes a snapshot of `enrollments` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be written.
#[instrument(level = "debug", skip(enrollments), fields(enrollments = enrollments.len()))]
pub fn save(path: &Path, enrollments: &[Enrollment]) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serialize(enrollments))?;
    tracing::debug!("Saved {} enrollments", enrollments.len());
    Ok(())
}

/// Reads the snapshot at `path`.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be read, or any decoding
/// error from [`deserialize`].
#[instrument(level = "debug")]
pub fn load(path: &Path) -> Result<Vec<Enrollment>, SnapshotError> {
    let bytes = std::fs::read(path)?;
    deserialize(&bytes)
}
