use anyhow::{Context, Result};
use clap::Args;

use docmigrate::DocmigrateConfig;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "docmigrate init                      # Write .docmigrate/config.toml",
        "docmigrate init --force              # Overwrite an existing config",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub async fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    output.heading("Initialize docmigrate");
    output.bullet(&format!("Project root: {}", ctx.project_root.display()));

    if ctx.is_initialized() && !args.force {
        output.warning("docmigrate is already initialized in this project");
        output.info("Use --force to overwrite the existing config.toml");
        return Ok(());
    }

    tokio::fs::create_dir_all(&ctx.config_dir)
        .await
        .with_context(|| format!("Failed to create {}", ctx.config_dir.display()))?;

    let content = DocmigrateConfig::default().to_toml()?;
    tokio::fs::write(&ctx.config_path, content)
        .await
        .with_context(|| format!("Failed to write {}", ctx.config_path.display()))?;

    output.success(&format!("Created {}", ctx.config_path.display()));
    output.info("Set REDIS_URL or edit [redis] url before running ledger commands");

    Ok(())
}
