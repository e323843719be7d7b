use std::{path::PathBuf, process};

use catalog::{Directory, storage::directory::Loaded};
use clap::Parser;
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Parser, Default)]
#[command(about = "Show catalog counts and prerequisite cycles")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

struct Summary {
    students: usize,
    courses: usize,
    enrollments: usize,
    full_courses: Vec<String>,
    cycles: Vec<Vec<String>>,
}

impl Summary {
    fn new(directory: &Directory<Loaded>) -> Self {
        let catalog = directory.catalog();
        let ledger = directory.ledger();

        let full_courses = catalog
            .courses()
            .iter()
            .filter(|course| {
                ledger.enrollments_for_course(course.code()).count() >= course.capacity() as usize
            })
            .map(|course| course.code().to_string())
            .collect();

        let cycles = catalog
            .prerequisite_cycles()
            .iter()
            .map(|cycle| cycle.iter().map(ToString::to_string).collect())
            .collect();

        Self {
            students: catalog.students().len(),
            courses: catalog.courses().len(),
            enrollments: ledger.len(),
            full_courses,
            cycles,
        }
    }
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let summary = Summary::new(&directory);

        if summary.courses == 0 && summary.students == 0 {
            println!("No courses or students found yet. Add blocks to the course and student files.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&summary)?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(&summary);
                } else {
                    Self::output_table(&summary);
                }
            }
        }

        // Cycles make the courses involved impossible to enroll in.
        if !summary.cycles.is_empty() {
            process::exit(3);
        }

        Ok(())
    }

    fn output_json(summary: &Summary) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "students": summary.students,
            "courses": summary.courses,
            "enrollments": summary.enrollments,
            "full_courses": summary.full_courses,
            "cycles": {
                "count": summary.cycles.len(),
                "members": summary.cycles,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(summary: &Summary) {
        println!(
            "students={} courses={} enrollments={} full={} cycles={}",
            summary.students,
            summary.courses,
            summary.enrollments,
            summary.full_courses.len(),
            summary.cycles.len()
        );
    }

    fn output_table(summary: &Summary) {
        const MAX_CYCLE_DISPLAY: usize = 5;

        println!("{}", "Catalog".heading());
        println!("{}", "───────".dim());
        println!("Students     {}", summary.students);
        println!("Courses      {}", summary.courses);
        println!("Enrollments  {}", summary.enrollments);
        println!();

        if summary.full_courses.is_empty() {
            println!("Full courses: {}", "0".success());
        } else {
            println!(
                "Full courses: {} ({})",
                summary.full_courses.len().to_string().info(),
                summary.full_courses.join(", ")
            );
        }

        println!();

        let cycle_count = summary.cycles.len();
        if cycle_count == 0 {
            println!("Prerequisite cycles: {} ✅", "0".success());
        } else {
            println!("Prerequisite cycles: {} ⚠️", cycle_count.to_string().warning());
            for cycle in summary.cycles.iter().take(MAX_CYCLE_DISPLAY) {
                println!("  - {}", cycle.join(" -> "));
            }
            if cycle_count > MAX_CYCLE_DISPLAY {
                println!("  - ... and {} more cycles", cycle_count - MAX_CYCLE_DISPLAY);
            }
            println!(
                "{}",
                "Courses in a cycle can never have their prerequisites met.".dim()
            );
        }
    }
}
