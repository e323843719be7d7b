use std::path::PathBuf;

mod check;
mod enroll;
mod init;
mod list;
mod report;
mod status;
mod terminal;

use anyhow::Context;
use catalog::{
    Directory,
    storage::directory::{Loaded, Unloaded},
};
use clap::ArgAction;
use status::Status;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the catalog data directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show catalog counts and prerequisite cycles (default)
    Status(Status),

    /// Write a default catalog.toml
    Init(init::Command),

    /// List courses
    Courses(list::Courses),

    /// List students
    Students(list::Students),

    /// Enroll a student in a course
    ///
    /// The enrollment is checked against course capacity, existing
    /// enrollments and prerequisites, then saved to the ledger snapshot.
    Enroll(enroll::Command),

    /// Write the enrollment report
    Report(report::Command),

    /// Check the catalog for problems
    Check(check::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init(command) => command.run(&root)?,
            Self::Courses(command) => command.run(root)?,
            Self::Students(command) => command.run(root)?,
            Self::Enroll(command) => command.run(root)?,
            Self::Report(command) => command.run(root)?,
            Self::Check(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Loads the data directory at `root`.
fn load(root: PathBuf) -> anyhow::Result<Directory<Loaded>> {
    Directory::<Unloaded>::new(root.clone())
        .load_all()
        .with_context(|| format!("Failed to load catalog from {}", root.display()))
}

/// Sample data directories for command tests.
#[cfg(test)]
mod fixture {
    use std::path::Path;

    use tempfile::TempDir;

    pub const COURSES: &str = "\
CODE:CS101
TITLE:Intro to Programming
CREDITS:4
CAPACITY:30

CODE:CS201
TITLE:Data Structures
CREDITS:4
CAPACITY:25
PREREQUISITES:CS101
";

    pub const STUDENTS: &str = "\
ID:1
Name:Dana Levi
Joined:2023-09-01

ID:2
Name:Amir Cohen
Joined:2023-09-01
";

    /// A data directory holding [`COURSES`] and [`STUDENTS`].
    pub fn directory() -> TempDir {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), COURSES, STUDENTS);
        tmp
    }

    /// Replaces the source files under `root`.
    pub fn write(root: &Path, courses: &str, students: &str) {
        std::fs::write(root.join("courses.txt"), courses).unwrap();
        std::fs::write(root.join("students.txt"), students).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn status_run_reports_counts_without_exit() {
        let tmp = fixture::directory();

        Command::Status(Status::default())
            .run(tmp.path().to_path_buf())
            .expect("status should succeed on an acyclic catalog");
    }

    #[test]
    fn load_names_the_root_on_failure() {
        let tmp = tempfile::tempdir().unwrap();

        let error = load(tmp.path().to_path_buf()).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("Failed to load catalog from {}", tmp.path().display())
        );
    }

    #[test]
    fn parses_global_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from(["catalog", "enroll", "1", "CS101", "-vv", "--root", "data"])
            .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("data"));
        assert!(matches!(cli.command, Some(Command::Enroll(_))));
    }

    #[test]
    fn blank_keys_are_rejected_while_parsing() {
        assert!(Cli::try_parse_from(["catalog", "enroll", " ", "CS101"]).is_err());
        assert!(Cli::try_parse_from(["catalog", "enroll", "1", ""]).is_err());
    }

    #[test]
    fn no_subcommand_defaults_to_status() {
        let cli = Cli::try_parse_from(["catalog"]).unwrap();
        assert!(cli.command.is_none());
    }
}
