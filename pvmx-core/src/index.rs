//! Texture pack index grammar.
//!
//! One entry per line: `<global_index>,<name>[,<width>x<height>]`. Blank
//! lines and lines starting with `#` carry no entry. The module owns both
//! directions: parsing index lines into [`TexPackEntry`] values and
//! formatting entries back into lines when an archive is extracted.

use std::io::BufRead;

use crate::error::{PvmxError, Result};
use crate::pak::TexPackEntry;

/// Parse one line of a texture pack index.
///
/// Returns `Ok(None)` for blank and comment lines. `line_number` is 1-based
/// and is only used in error reports.
///
/// The first comma is required and must not lead the line. Everything after
/// it is the name, unless a second comma introduces a `WIDTHxHEIGHT`
/// dimension field (the separator may also be `X`).
pub fn parse_line(line: &str, line_number: u32) -> Result<Option<TexPackEntry>> {
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let comma = match line.find(',') {
        Some(comma) if comma > 0 => comma,
        _ => return Err(PvmxError::MissingComma { line: line_number }),
    };

    let global_index = parse_number(&line[..comma], "global index", line_number)?;
    let rest = &line[comma + 1..];

    let (name, dimensions) = match rest.find(',') {
        Some(second) if second > 0 => (&rest[..second], Some(&rest[second + 1..])),
        _ => (rest, None),
    };

    let (width, height) = match dimensions {
        Some(text) => parse_dimensions(text, line_number)?,
        None => (0, 0),
    };

    Ok(Some(TexPackEntry {
        global_index: Some(global_index),
        name: name.to_string(),
        width,
        height,
    }))
}

/// Parse a whole index stream, skipping blanks and comments.
///
/// Fail-fast: the first malformed entry aborts with its line number; no
/// skip-and-continue.
pub fn read_index<R>(reader: R) -> Result<Vec<TexPackEntry>>
where
    R: BufRead,
{
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(entry) = parse_line(&line, i as u32 + 1)? {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Format one entry back into an index line.
///
/// Fields are emitted in grammar order and comma-joined; an absent global
/// index or zero dimensions leave no trace in the line.
pub fn format_line(entry: &TexPackEntry) -> String {
    let mut line = String::new();

    if let Some(global_index) = entry.global_index {
        line.push_str(&global_index.to_string());
    }

    if !entry.name.is_empty() {
        if !line.is_empty() {
            line.push(',');
        }
        line.push_str(&entry.name);
    }

    if entry.has_dimensions() {
        if !line.is_empty() {
            line.push(',');
        }
        line.push_str(&entry.width.to_string());
        line.push('x');
        line.push_str(&entry.height.to_string());
    }

    line
}

fn parse_dimensions(text: &str, line_number: u32) -> Result<(u32, u32)> {
    let separator = match text.find(['x', 'X']) {
        Some(separator) if separator > 0 => separator,
        _ => {
            return Err(PvmxError::InvalidDimensions {
                line: line_number,
                text: text.to_string(),
            });
        }
    };

    let width = parse_number(&text[..separator], "texture width", line_number)?;
    let height = parse_number(&text[separator + 1..], "texture height", line_number)?;

    Ok((width, height))
}

fn parse_number(text: &str, field: &'static str, line_number: u32) -> Result<u32> {
    text.trim().parse().map_err(|_| PvmxError::InvalidNumber {
        line: line_number,
        field,
        value: text.to_string(),
    })
}
