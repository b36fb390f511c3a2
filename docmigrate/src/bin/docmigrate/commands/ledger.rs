use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use docmigrate::{Migrator, RedisStore, Registry, VersionRecord};

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const STATUS_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect",
    commands: &[
        "docmigrate status                              # Current ledger version",
        "docmigrate status --output json                # Machine-readable status",
        "docmigrate --collection schema_versions status # Use another ledger collection",
    ],
}];

pub const HISTORY_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect",
    commands: &[
        "docmigrate history                   # Every ledger entry, oldest first",
        "docmigrate history --output compact  # Version and entry count only",
    ],
}];

pub const FORCE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Recovery",
    commands: &[
        "docmigrate force 3 --description add_user_index  # Record version 3 as current",
        "docmigrate force 0                                # Reset to the initial state",
    ],
}];

#[derive(Args)]
pub struct ForceArgs {
    /// Version to record as current
    pub version: u64,

    /// Description stored with the entry
    #[arg(short, long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub collection: String,
    pub version: u64,
    pub description: String,
}

impl TableDisplay for StatusReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Collection", "Version", "Description"]);
        table.add_row(vec![
            Cell::new(&self.collection),
            Cell::new(self.version),
            Cell::new(&self.description),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!("{} {}", self.version, self.description).trim_end().to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryReport {
    pub collection: String,
    pub records: Vec<VersionRecord>,
}

impl TableDisplay for HistoryReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["#", "Version", "Description", "Recorded At", ""]);

        let last = self.records.len().saturating_sub(1);
        for (index, record) in self.records.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(record.version),
                Cell::new(&record.description),
                Cell::new(format_datetime(record)),
                Cell::new(if index == last { "current" } else { "" }),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let current = self.records.last().map_or(0, |record| record.version);
        format!("version={current} entries={}", self.records.len())
    }
}

fn format_datetime(record: &VersionRecord) -> String {
    record.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

async fn open_migrator(
    ctx: &ProjectContext,
    collection: &str,
    output: &OutputManager,
) -> Result<Migrator<RedisStore>> {
    output.progress("Connecting to Redis");
    let store = ctx.connect().await?;
    output.clear_line();

    // Ledger commands never run actions, so no migrations are loaded
    Ok(Migrator::new(store, &Registry::new()).with_collection(collection))
}

pub async fn handle_status(collection: Option<&str>, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let collection = ctx.collection(collection);
    let migrator = open_migrator(&ctx, &collection, output).await?;

    let (version, description) = migrator
        .version()
        .await
        .context("Failed to read the current version")?;

    if version == 0 {
        output.info("No migrations recorded yet");
    }

    output.display(&StatusReport {
        collection,
        version,
        description,
    })
}

pub async fn handle_history(collection: Option<&str>, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let collection = ctx.collection(collection);
    let migrator = open_migrator(&ctx, &collection, output).await?;

    let records = migrator.history().await.context("Failed to read the ledger")?;

    if records.is_empty() {
        output.info(&format!("Ledger '{collection}' is empty"));
        if !output.is_json() {
            return Ok(());
        }
    }

    output.display(&HistoryReport { collection, records })
}

pub async fn handle_force(args: ForceArgs, collection: Option<&str>, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let collection = ctx.collection(collection);
    let migrator = open_migrator(&ctx, &collection, output).await?;

    let (previous, _) = migrator.version().await?;
    output.heading("Force Version");
    output.bullet(&format!("Ledger: {collection}"));
    output.bullet(&format!("Previous version: {previous}"));

    migrator
        .set_version(args.version, &args.description)
        .await
        .context("Failed to record the version")?;

    output.success(&format!("Recorded version {}", args.version));
    if output.is_json() {
        output.display(&StatusReport {
            collection,
            version: args.version,
            description: args.description,
        })?;
    }

    Ok(())
}
