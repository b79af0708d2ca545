//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use berth_core::ProcessOutput;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }
}

/// Trait for types that can be displayed as plain text.
pub trait TableDisplay {
    /// Write the value in human-readable form.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// A freshly launched container.
#[derive(Debug, Clone, Serialize)]
pub struct Started {
    /// Full identifier.
    pub id: String,
    /// Short identifier.
    pub short_id: String,
    /// Display name.
    pub name: String,
    /// Image launched.
    pub image: String,
    /// Host port mapped to port 22.
    pub port: u16,
}

impl TableDisplay for Started {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.id)?;
        writeln!(writer)?;
        writeln!(writer, "Name:   {}", self.name)?;
        writeln!(writer, "Image:  {}", self.image)?;
        writeln!(writer, "SSH:    localhost:{}", self.port)?;
        writeln!(writer, "Short:  {}", self.short_id)?;
        Ok(())
    }
}

/// State of a container.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Identifier queried.
    pub id: String,
    /// State printed by the runtime, empty if unknown.
    pub status: String,
}

impl TableDisplay for StatusReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.status.is_empty() {
            writeln!(writer, "unknown")?;
        } else {
            writeln!(writer, "{}", self.status)?;
        }
        Ok(())
    }
}

/// Confirmation of a content operation.
#[derive(Debug, Clone, Serialize)]
pub struct Done {
    /// Identifier acted on.
    pub id: String,
    /// What was done.
    pub message: String,
}

impl TableDisplay for Done {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.message)?;
        Ok(())
    }
}

impl TableDisplay for ProcessOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        write!(writer, "{}", self.stdout)?;
        if !self.stderr.is_empty() {
            write!(writer, "{}", self.stderr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: Serialize + TableDisplay>(format: Format, value: &T) -> String {
        let mut buf = Vec::new();
        OutputFormat::new(format)
            .write(&mut buf, value)
            .expect("write succeeds");
        String::from_utf8(buf).expect("utf-8 output")
    }

    #[test]
    fn started_table() {
        let started = Started {
            id: "abcdef0123456789".into(),
            short_id: "abcdef012345".into(),
            name: "web-0a1b2c3d".into(),
            image: "nginx".into(),
            port: 8080,
        };
        let out = render(Format::Table, &started);
        assert!(out.starts_with("abcdef0123456789\n"));
        assert!(out.contains("localhost:8080"));
    }

    #[test]
    fn started_json() {
        let started = Started {
            id: "abc".into(),
            short_id: "abc".into(),
            name: "web-0a1b2c3d".into(),
            image: "nginx".into(),
            port: 2222,
        };
        let value: serde_json::Value =
            serde_json::from_str(&render(Format::Json, &started)).expect("valid json");
        assert_eq!(value["port"], 2222);
        assert_eq!(value["name"], "web-0a1b2c3d");
    }

    #[test]
    fn status_unknown_when_empty() {
        let report = StatusReport {
            id: "abc".into(),
            status: String::new(),
        };
        assert_eq!(render(Format::Table, &report), "unknown\n");
    }

    #[test]
    fn process_output_table_prints_both_streams() {
        let output = ProcessOutput {
            command: "docker logs abc".into(),
            exit_code: Some(0),
            stdout: "out\n".into(),
            stderr: "err\n".into(),
        };
        assert_eq!(render(Format::Table, &output), "out\nerr\n");
    }
}
