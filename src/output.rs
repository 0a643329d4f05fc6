// src/output.rs
use crate::types::{GuesserError, LookupResult, OutputConfig, OutputFormat, ScanReport};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Space between the hostname column and the address column.
const COLUMN_PADDING: usize = 4;

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn write_report(&self, report: &ScanReport) -> Result<(), GuesserError> {
        if let Some(file_path) = &self.config.file {
            self.write_to_file(file_path, report)
        } else {
            self.write_to_stdout(report)
        }
    }

    fn write_to_file(&self, file_path: &str, report: &ScanReport) -> Result<(), GuesserError> {
        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GuesserError::OutputError(format!("Failed to create directory: {}", e)))?;
            }
        }

        let file = File::create(file_path)
            .map_err(|e| GuesserError::OutputError(format!("Failed to create file: {}", e)))?;
        let mut writer = BufWriter::new(file);
        self.write_output(&mut writer, report)?;
        writer.flush().map_err(|e| GuesserError::OutputError(e.to_string()))?;

        info!("Results written to: {}", file_path);
        Ok(())
    }

    fn write_to_stdout(&self, report: &ScanReport) -> Result<(), GuesserError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_output(&mut handle, report)?;
        handle.flush().map_err(|e| GuesserError::OutputError(e.to_string()))
    }

    pub fn write_output<W: Write>(&self, writer: &mut W, report: &ScanReport) -> Result<(), GuesserError> {
        match self.config.format {
            OutputFormat::Text => write_table(writer, &report.results),
            OutputFormat::Json => self.write_json_output(writer, report),
            OutputFormat::Csv => self.write_csv_output(writer, report),
        }
    }

    fn write_json_output<W: Write>(&self, writer: &mut W, report: &ScanReport) -> Result<(), GuesserError> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| GuesserError::OutputError(format!("Failed to serialize JSON: {}", e)))?;

        writeln!(writer, "{}", json).map_err(|e| GuesserError::OutputError(e.to_string()))?;

        Ok(())
    }

    fn write_csv_output<W: Write>(&self, writer: &mut W, report: &ScanReport) -> Result<(), GuesserError> {
        writeln!(writer, "hostname,ip_addr").map_err(|e| GuesserError::OutputError(e.to_string()))?;

        for result in &report.results {
            writeln!(writer, "{},{}", result.hostname, result.ip_addr)
                .map_err(|e| GuesserError::OutputError(e.to_string()))?;
        }

        Ok(())
    }
}

/// Two left-aligned columns, hostname then address, no header.
pub fn write_table<W: Write>(writer: &mut W, results: &[LookupResult]) -> Result<(), GuesserError> {
    let width = results.iter().map(|r| r.hostname.len()).max().unwrap_or(0) + COLUMN_PADDING;

    for result in results {
        writeln!(writer, "{:<width$}{}", result.hostname, result.ip_addr, width = width)
            .map_err(|e| GuesserError::OutputError(e.to_string()))?;
    }

    Ok(())
}
