use colored::{ColoredString, Colorize};

/// Kind of status line the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Heading,
    Detail,
    Progress,
}

impl Tone {
    pub fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Error => "✗",
            Tone::Warning => "!",
            Tone::Info => "i",
            Tone::Heading => "",
            Tone::Detail => "-",
            Tone::Progress => "…",
        }
    }

    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Tone::Success => text.green(),
            Tone::Error => text.red().bold(),
            Tone::Warning => text.yellow(),
            Tone::Info => text.blue(),
            Tone::Heading => text.bright_blue().bold(),
            Tone::Detail => text.bright_black(),
            Tone::Progress => text.cyan(),
        }
    }

    /// `icon message`, colored unless `plain`.
    pub fn line(self, message: &str, plain: bool) -> String {
        match (self.icon(), plain) {
            ("", true) => message.to_string(),
            ("", false) => self.paint(message).to_string(),
            (icon, true) => format!("{icon} {message}"),
            (icon, false) => format!("{} {}", self.paint(icon), self.paint(message)),
        }
    }
}
