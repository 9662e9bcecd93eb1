//! Colored output helpers for CLI
//!
//! Status lines go to stderr so stdout carries nothing but the report (or the
//! JSON outcome) and can be piped.

use crate::research::Finding;
use crate::search::EngineInfo;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the DeepSearch banner
    pub fn banner(&self) {
        if self.colored {
            eprintln!(
                "\n   {} {}\n",
                "DeepSearch".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            eprintln!("\n   DeepSearch v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✓".green().bold(), message.green());
        } else {
            eprintln!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "•".blue(), message);
        } else {
            eprintln!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            eprintln!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            eprintln!("\n  [TIP] {}", message);
        }
    }

    /// Print the final report verbatim
    pub fn report(&self, report: &str) {
        println!("{}", report.trim_end());
    }

    /// Print the findings that fed the report, in accumulation order
    pub fn findings(&self, findings: &[Finding]) {
        self.header(&format!("Findings ({})", findings.len()));
        for (i, finding) in findings.iter().enumerate() {
            let title = format!("{}. {}", i + 1, finding.source_query());
            if self.colored {
                println!("\n  {}", title.cyan().bold());
            } else {
                println!("\n  --- {} ---", title);
            }
            println!("    {}", finding.summary().trim());
            for url in finding.urls() {
                self.list_item(url);
            }
        }
    }

    /// Print one registered search engine with its credential status
    pub fn engine(&self, info: &EngineInfo) {
        let status = if info.available { "available" } else { "not configured" };
        if self.colored {
            let status = if info.available {
                status.green().to_string()
            } else {
                status.yellow().to_string()
            };
            println!(
                "\n  {} {} {}",
                info.name.bright_white().bold(),
                format!("({})", status).dimmed(),
                info.description.dimmed()
            );
        } else {
            println!("\n  {} ({}) {}", info.name, status, info.description);
        }

        for (key, present) in &info.config_status {
            self.kv(key, if *present { "set" } else { "missing" });
        }
    }

    /// Prompt for a line of input on stdin. `None` on EOF or a blank line.
    pub fn prompt(&self, message: &str) -> Option<String> {
        if self.colored {
            eprint!("  {} {} ", "?".bright_yellow().bold(), message.bright_white());
        } else {
            eprint!("  [?] {} ", message);
        }
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }
}
