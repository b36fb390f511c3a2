use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;
use std::io::Write;

use crate::theme::Tone;

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

/// Data that can be rendered as a table or a single line
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        println!("{}", self.render(data)?);
        Ok(())
    }

    fn render<T>(&self, data: &T) -> Result<String>
    where
        T: Serialize + TableDisplay,
    {
        Ok(match self.options.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Table => data.to_table(self).to_string(),
            OutputFormat::Compact => data.to_compact(),
        })
    }

    /// Status lines stay off stdout in JSON mode
    fn chatty(&self) -> bool {
        !self.options.quiet && !self.is_json()
    }

    fn say(&self, tone: Tone, message: &str) {
        if self.chatty() {
            println!("{}", tone.line(message, self.options.no_color));
        }
    }

    pub fn success(&self, message: &str) {
        self.say(Tone::Success, message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", Tone::Error.line(message, self.options.no_color));
    }

    pub fn warning(&self, message: &str) {
        self.say(Tone::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.say(Tone::Info, message);
    }

    pub fn heading(&self, text: &str) {
        if self.chatty() {
            println!();
        }
        self.say(Tone::Heading, text);
    }

    pub fn bullet(&self, text: &str) {
        if self.chatty() {
            println!("  {}", Tone::Detail.line(text, self.options.no_color));
        }
    }

    pub fn progress(&self, message: &str) {
        if !self.chatty() {
            return;
        }
        print!("\r{}", Tone::Progress.line(message, self.options.no_color));
        std::io::stdout().flush().ok();
    }

    /// Clear the current line after a progress indicator
    pub fn clear_line(&self) {
        if !self.chatty() {
            return;
        }

        print!("\r{}", " ".repeat(80));
        print!("\r");
        std::io::stdout().flush().ok();
    }

    pub fn create_table(&self) -> Table {
        let mut table = Table::new();

        if !self.options.no_color {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        } else {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        }

        table
    }

    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| {
                let cell = Cell::new(h).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            })
            .collect();
        table.set_header(header_cells);
    }
}
