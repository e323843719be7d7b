use std::path::Path;

use catalog::{Config, storage::directory::CONFIG_FILE};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Character separating codes on a PREREQUISITES line
    #[arg(long, value_name = "CHAR", default_value_t = ',')]
    delimiter: char,

    /// Treat a repeated course code or student id as an error
    #[arg(long)]
    reject_duplicates: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            anyhow::bail!("Catalog already initialized (found existing {CONFIG_FILE})");
        }

        std::fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        let mut config = Config::default();
        config
            .set_prerequisite_delimiter(self.delimiter)
            .map_err(|e| anyhow::anyhow!(e))?;
        config.reject_duplicates = self.reject_duplicates;
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

        println!("Initialized catalog in {}", root.display());
        println!("  Created: {}", CONFIG_FILE.success());
        println!();
        println!("Next steps:");
        println!(
            "  Add course blocks to {} and student blocks to {}",
            config.courses_file.display(),
            config.students_file.display()
        );
        println!("  catalog enroll <STUDENT_ID> <COURSE_CODE>");

        Ok(())
    }
}
