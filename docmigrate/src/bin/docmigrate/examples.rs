use clap::Command;

use crate::commands::{init, ledger};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

/// Example groups shown under `docmigrate <command> --help`.
pub fn command_examples() -> [(&'static str, &'static [ExampleGroup]); 4] {
    [
        ("init", init::EXAMPLES),
        ("status", ledger::STATUS_EXAMPLES),
        ("history", ledger::HISTORY_EXAMPLES),
        ("force", ledger::FORCE_EXAMPLES),
    ]
}

/// Append each subcommand's examples to its long help.
pub fn with_examples(mut command: Command) -> Command {
    for (name, groups) in command_examples() {
        command = command.mut_subcommand(name, |subcommand| subcommand.after_long_help(render(groups)));
    }
    command
}

fn render(groups: &[ExampleGroup]) -> String {
    let sections: Vec<String> = groups
        .iter()
        .map(|group| {
            let lines: Vec<String> = group.commands.iter().map(|line| format!("    {line}")).collect();
            format!("  {}:\n{}", group.title, lines.join("\n"))
        })
        .collect();
    format!("Examples:\n{}", sections.join("\n\n"))
}
