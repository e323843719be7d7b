use std::path::PathBuf;

use catalog::storage::report;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Print the report instead of writing the configured report file
    #[arg(long)]
    stdout: bool,
}

impl Command {
    #[instrument(level = "debug")]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let enrollments = directory.ledger().enrollments();

        if self.stdout {
            report::write(std::io::stdout().lock(), enrollments)?;
            return Ok(());
        }

        let path = directory.write_report()?;
        println!(
            "{}",
            format!(
                "Wrote {} enrollments to {}",
                enrollments.len(),
                path.display()
            )
            .success()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use catalog::{Config, CourseCode, Directory, PersonId, storage::directory::CONFIG_FILE};

    use super::*;
    use crate::cli::fixture;

    fn enroll_dana(root: &std::path::Path) {
        let mut directory = Directory::new(root.to_path_buf()).load_all().unwrap();
        directory
            .enroll(&PersonId::new("1").unwrap(), &CourseCode::new("CS101").unwrap())
            .unwrap();
        directory.save_ledger().unwrap();
    }

    #[test]
    fn report_run_writes_the_default_file() {
        let tmp = fixture::directory();
        enroll_dana(tmp.path());

        Command { stdout: false }
            .run(tmp.path().to_path_buf())
            .unwrap();

        let report = std::fs::read_to_string(tmp.path().join("enrollment_report.txt")).unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.starts_with("1 | Dana Levi | Intro to Programming | "));
    }

    #[test]
    fn report_run_writes_the_configured_file() {
        let tmp = fixture::directory();
        let mut config = Config::default();
        config.report_file = PathBuf::from("out/report.txt");
        config.save(&tmp.path().join(CONFIG_FILE)).unwrap();
        enroll_dana(tmp.path());

        Command { stdout: false }
            .run(tmp.path().to_path_buf())
            .unwrap();

        assert!(tmp.path().join("out/report.txt").is_file());
        assert!(!tmp.path().join("enrollment_report.txt").exists());
    }

    #[test]
    fn report_run_to_stdout_leaves_no_file() {
        let tmp = fixture::directory();
        enroll_dana(tmp.path());

        Command { stdout: true }
            .run(tmp.path().to_path_buf())
            .unwrap();

        assert!(!tmp.path().join("enrollment_report.txt").exists());
    }
}
