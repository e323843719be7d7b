use std::path::PathBuf;

use catalog::{Course, Ledger, Student};
use clap::Parser;
use serde::Serialize;
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

/// Command arguments for `catalog courses`.
#[derive(Debug, Parser)]
#[command(about = "List courses in file order")]
pub struct Courses {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Command arguments for `catalog students`.
#[derive(Debug, Parser)]
#[command(about = "List students in file order")]
pub struct Students {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Serialize)]
struct CourseRow<'a> {
    code: &'a str,
    title: &'a str,
    credit_points: u32,
    capacity: u32,
    enrolled: usize,
    prerequisites: Vec<&'a str>,
}

impl<'a> CourseRow<'a> {
    fn new(course: &'a Course, ledger: &Ledger) -> Self {
        Self {
            code: course.code(),
            title: course.title(),
            credit_points: course.credit_points(),
            capacity: course.capacity(),
            enrolled: ledger.enrollments_for_course(course.code()).count(),
            prerequisites: course.prerequisites().iter().map(|c| c.as_str()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StudentRow<'a> {
    id: &'a str,
    name: &'a str,
    joined: String,
    courses: Vec<&'a str>,
}

impl<'a> StudentRow<'a> {
    fn new(student: &'a Student, ledger: &'a Ledger) -> Self {
        Self {
            id: student.id(),
            name: student.name(),
            joined: student.enrollment_date().to_string(),
            courses: ledger
                .enrollments_for_student(student.id())
                .map(|e| e.course().code().as_str())
                .collect(),
        }
    }
}

impl Courses {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let rows: Vec<_> = directory
            .catalog()
            .courses()
            .iter()
            .map(|course| CourseRow::new(course, directory.ledger()))
            .collect();

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &rows)?;
                println!();
            }
            OutputFormat::Table => render_courses(&rows, self.quiet),
        }
        Ok(())
    }
}

impl Students {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let rows: Vec<_> = directory
            .catalog()
            .students()
            .iter()
            .map(|student| StudentRow::new(student, directory.ledger()))
            .collect();

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &rows)?;
                println!();
            }
            OutputFormat::Table => render_students(&rows, self.quiet),
        }
        Ok(())
    }
}

fn render_courses(rows: &[CourseRow<'_>], quiet: bool) {
    if quiet {
        for row in rows {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.code,
                row.title,
                row.credit_points,
                row.capacity,
                row.enrolled,
                row.prerequisites.join(",")
            );
        }
        return;
    }

    if rows.is_empty() {
        println!("{}", "No courses found.".dim());
        return;
    }

    let code_width = column_width("Code", rows.iter().map(|r| r.code));
    let title_width = column_width("Title", rows.iter().map(|r| r.title));

    println!(
        "{}",
        format!(
            "{:<code_width$}  {:<title_width$}  {:>7}  {:>8}  Prerequisites",
            "Code", "Title", "Credits", "Enrolled"
        )
        .heading()
    );
    for row in rows {
        let enrolled = format!("{}/{}", row.enrolled, row.capacity);
        let enrolled = if row.enrolled >= row.capacity as usize {
            format!("{enrolled:>8}").warning()
        } else {
            format!("{enrolled:>8}")
        };
        let prerequisites = if row.prerequisites.is_empty() {
            "–".dim()
        } else {
            row.prerequisites.join(", ")
        };
        println!(
            "{:<code_width$}  {:<title_width$}  {:>7}  {enrolled}  {prerequisites}",
            row.code, row.title, row.credit_points
        );
    }
}

fn render_students(rows: &[StudentRow<'_>], quiet: bool) {
    if quiet {
        for row in rows {
            println!("{}\t{}\t{}\t{}", row.id, row.name, row.joined, row.courses.join(","));
        }
        return;
    }

    if rows.is_empty() {
        println!("{}", "No students found.".dim());
        return;
    }

    let id_width = column_width("ID", rows.iter().map(|r| r.id));
    let name_width = column_width("Name", rows.iter().map(|r| r.name));

    println!(
        "{}",
        format!("{:<id_width$}  {:<name_width$}  {:<10}  Courses", "ID", "Name", "Joined").heading()
    );
    for row in rows {
        let courses = if row.courses.is_empty() {
            "–".dim()
        } else {
            row.courses.join(", ")
        };
        println!(
            "{:<id_width$}  {:<name_width$}  {:<10}  {courses}",
            row.id, row.name, row.joined
        );
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or_default()
}
