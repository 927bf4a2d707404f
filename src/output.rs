use std::io::{self, Write};

use serde::Serialize;

use crate::app::{BuildReport, ClearResult, ExtractResult, ListResult, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Text }
    }
}

/// Machine-readable results on stdout; progress events are dropped.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_build(result: &BuildReport) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_list(result: &ListResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_extract(result: &ExtractResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_clear(result: &ClearResult) -> io::Result<()> {
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

/// Human-readable results; progress goes to stderr so stdout stays clean.
pub struct TextOutput;

impl TextOutput {
    pub fn print_build(result: &BuildReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "completed {} of {} items, skipped {}",
            result.completed(),
            result.attempted,
            result.skipped.len()
        )?;
        writeln!(stdout, "summary:  {}", result.summary_path)?;
        writeln!(stdout, "metadata: {}", result.metadata_path)?;
        for item in &result.skipped {
            writeln!(
                stdout,
                "  skipped #{} [{}] {}: {}",
                item.index, item.reason, item.locator, item.message
            )?;
        }
        Ok(())
    }

    pub fn print_list(result: &ListResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for entry in &result.entries {
            writeln!(
                stdout,
                "{:>4}  {:>2}  {:<18}  {:<12}  {}",
                entry.index,
                entry.label,
                entry.category.as_deref().unwrap_or("-"),
                entry.source_kind.to_string(),
                entry.locator
            )?;
        }
        writeln!(stdout, "{} entries", result.entries.len())?;
        Ok(())
    }

    pub fn print_extract(result: &ExtractResult) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(
            stderr,
            "{}: {} coefficients x {} frames at {} Hz",
            result.input, result.shape.coefficients, result.shape.frames, result.sample_rate
        )?;
        if let Some(output) = &result.output {
            writeln!(stderr, "written to {output}")?;
        }
        Ok(())
    }

    pub fn print_clear(result: &ClearResult) -> io::Result<()> {
        if result.cleared {
            println!("removed {}", result.output_dir);
        } else {
            println!("nothing to remove at {}", result.output_dir);
        }
        Ok(())
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({:.1}s)", event.message, elapsed.as_secs_f64()),
            None => eprintln!("{}", event.message),
        }
    }
}
