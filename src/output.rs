use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

/// Machine readable output: results go to stdout as JSON, progress is dropped.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunSummary) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Human readable progress on stderr.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_run(result: &RunSummary) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(
            stdout,
            "{} entries processed, {} files written, {} resources absent",
            result.codes, result.written, result.absent
        )?;
        if let Some(path) = &result.manifest_path {
            writeln!(stdout, "manifest: {path}")?;
        }
        Ok(())
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}
