use std::path::PathBuf;

use anyhow::Context;
use catalog::{CourseCode, PersonId};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The id of the student
    student: PersonId,

    /// The code of the course
    course: CourseCode,
}

impl Command {
    #[instrument(level = "debug")]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = super::load(root)?;

        let enrollment = directory
            .enroll(&self.student, &self.course)
            .with_context(|| format!("Failed to enroll {} in {}", self.student, self.course))?;
        let message = format!(
            "✅ Enrolled {} ({}) in {} - {}",
            enrollment.student().name(),
            enrollment.student().id(),
            enrollment.course().code(),
            enrollment.course().title()
        );

        let path = directory
            .save_ledger()
            .context("Failed to save the enrollment ledger")?;

        println!("{}", message.success());
        println!("{}", format!("Ledger saved to {}", path.display()).dim());
        Ok(())
    }
}
