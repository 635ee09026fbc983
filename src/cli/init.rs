use std::{fs, path::Path};

use roster::Config;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Replace an existing configuration file with the defaults
    #[arg(long)]
    force: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(Config::FILE_NAME);
        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Already initialized (found existing {}, use --force to replace it)",
                Config::FILE_NAME
            );
        }

        fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        Config::default()
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", Config::FILE_NAME))?;

        println!("Initialized student records in {}", root.display());
        println!("  Created: {}", Config::FILE_NAME);
        println!();
        println!("Next steps:");
        println!("  roster student add 1 \"Your First Student\" 20");

        Ok(())
    }
}
