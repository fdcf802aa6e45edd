//! Output formatting.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Output sink configured from the global CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
    pretty: bool,
}

impl Output {
    /// Creates an output sink.
    pub fn new(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }

    /// Emits a value as JSON or via the given text renderer.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = if self.pretty {
                    serde_json::to_string_pretty(value)?
                } else {
                    serde_json::to_string(value)?
                };
                println!("{json}");
            }
            OutputFormat::Text => {
                print!("{}", text(value));
            }
        }
        Ok(())
    }
}
