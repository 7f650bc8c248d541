use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::data_model::Person;
use crate::error::Result;
use crate::pipeline::sinks::RecordSink;

/// Output encoding for [`ConsoleSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes delivered records to a console-style writer, one per line.
///
/// In text mode a banner with the configured label precedes the first
/// record, so an empty run prints nothing. JSON mode emits one object per
/// line with no banner, for piping into other tools.
pub struct ConsoleSink {
    out: Box<dyn Write + Send>,
    label: String,
    format: OutputFormat,
    started: bool,
}

impl ConsoleSink {
    pub fn new(label: impl Into<String>, format: OutputFormat) -> Self {
        ConsoleSink::with_writer(Box::new(io::stdout()), label, format)
    }

    pub fn with_writer(
        out: Box<dyn Write + Send>,
        label: impl Into<String>,
        format: OutputFormat,
    ) -> Self {
        ConsoleSink {
            out,
            label: label.into(),
            format,
            started: false,
        }
    }
}

impl RecordSink for ConsoleSink {
    fn accept(&mut self, person: Person) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if !self.started {
                    writeln!(self.out, "---- {} ----", self.label)?;
                    self.started = true;
                }
                writeln!(self.out, "{}", person)?;
            }
            OutputFormat::Json => {
                let line = serde_json::to_string(&person)?;
                writeln!(self.out, "{}", line)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
