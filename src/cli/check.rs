use std::path::PathBuf;

use catalog::domain::collections;
use nonempty::NonEmpty;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {}

impl Command {
    #[instrument(level = "debug")]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let catalog = directory.catalog();
        let mut problems = 0;

        for cycle in catalog.prerequisite_cycles() {
            problems += 1;
            let members: Vec<_> = cycle.iter().map(ToString::to_string).collect();
            println!(
                "{} prerequisite cycle: {}",
                "error:".warning(),
                members.join(" -> ")
            );
        }

        for enrollment in directory.ledger().enrollments() {
            let student = enrollment.student().id();
            let course = enrollment.course().code();
            if catalog.student(student).is_none() {
                problems += 1;
                println!("{} ledger names unknown student {student}", "error:".warning());
            }
            if catalog.course(course).is_none() {
                problems += 1;
                println!("{} ledger names unknown course {course}", "error:".warning());
            }
        }

        let names: Vec<&str> = catalog.students().iter().map(|s| s.name()).collect();
        for name in collections::find_duplicates(&names) {
            println!("{} several students are named {name}", "note:".info());
        }

        let titles: Vec<&str> = catalog.courses().iter().map(|c| c.title()).collect();
        for title in collections::find_duplicates(&titles) {
            println!("{} several courses are titled {title}", "note:".info());
        }

        let capacities = catalog.courses().iter().map(|c| c.capacity()).collect();
        if let Some(capacities) = NonEmpty::from_vec(capacities) {
            let largest = *collections::max(&capacities);
            let courses: Vec<_> = catalog
                .courses()
                .iter()
                .filter(|c| c.capacity() == largest)
                .map(|c| c.code().to_string())
                .collect();
            println!(
                "{} largest capacity is {largest} ({})",
                "note:".info(),
                courses.join(", ")
            );
        }

        if problems > 0 {
            anyhow::bail!("found {problems} problems");
        }
        println!("{}", "✅ No problems found".success());
        Ok(())
    }
}
