use crate::error::Result;
use crate::results::{OutputFormat, ResultDocument};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Writes the document to `path`, or prints it to stdout when no path is given
pub fn emit(doc: &ResultDocument, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    let json = doc.to_json(format)?;

    match path {
        Some(path) => {
            fs::write(path, json)?;
            ::log::info!("Results saved to {}", path.display());
        }
        None => write_stdout(&json)?,
    }
    Ok(())
}

fn write_stdout(json: &str) -> io::Result<()> {
    write_json(&mut io::stdout().lock(), json)
}

fn write_json<W: Write>(out: &mut W, json: &str) -> io::Result<()> {
    writeln!(out, "{}", json)?;
    out.flush()
}
