// src/report.rs
//
// Semicolon-delimited output for every result shape, one header row each.

use crate::aggregate::ChangeCounts;
use crate::model::{Author, CatalogEntry, JoinedRow, MethodDescriptor};
use chrono::{TimeZone, Utc};
use std::io::{self, Write};

pub const METHODS_HEADER: &str = "file;methodSignature;startLine;endLine;length";
pub const CHANGES_HEADER: &str = "file;method;changes(add/rems count)";
pub const JOIN_HEADER: &str = "file;method;changes * length";

pub fn write_methods<W: Write>(out: &mut W, methods: &[MethodDescriptor]) -> io::Result<()> {
    writeln!(out, "{}", METHODS_HEADER)?;
    for m in methods {
        write_method_row(out, m, m.length_in_lines())?;
    }
    Ok(())
}

pub fn write_catalog<W: Write>(out: &mut W, entries: &[CatalogEntry]) -> io::Result<()> {
    writeln!(out, "{}", METHODS_HEADER)?;
    for entry in entries {
        write_method_row(out, &entry.method, entry.length_in_lines)?;
    }
    Ok(())
}

fn write_method_row<W: Write>(out: &mut W, m: &MethodDescriptor, length: usize) -> io::Result<()> {
    writeln!(
        out,
        "{};{};{};{};{}",
        m.file_path,
        m.signature(),
        m.start_line,
        m.end_line,
        length
    )
}

pub fn write_changes<W: Write>(out: &mut W, counts: &ChangeCounts) -> io::Result<()> {
    writeln!(out, "{}", CHANGES_HEADER)?;
    for row in counts.rows() {
        writeln!(out, "{};{};{}", row.file_path, row.method, row.count)?;
    }
    Ok(())
}

pub fn write_joined<W: Write>(out: &mut W, rows: &[JoinedRow]) -> io::Result<()> {
    writeln!(out, "{}", JOIN_HEADER)?;
    for row in rows {
        writeln!(out, "{};{};{}", row.file_path, row.method, row.combined_value)?;
    }
    Ok(())
}

pub fn write_owner<W: Write>(
    out: &mut W,
    line: usize,
    owner: Option<&MethodDescriptor>,
) -> io::Result<()> {
    match owner {
        Some(m) => writeln!(out, "Line with number: {} belongs to {} method", line, m.signature()),
        None => writeln!(out, "Line with number: {} does not belong to any method", line),
    }
}

/// One `name - email` row per author.
pub fn write_authors<W: Write>(out: &mut W, authors: &[Author]) -> io::Result<()> {
    for author in authors {
        writeln!(out, "{} - {}", author.name, author.email)?;
    }
    Ok(())
}

/// Author rows followed by commit count and the date of the newest commit.
pub fn write_author_stats<W: Write>(out: &mut W, authors: &[Author]) -> io::Result<()> {
    for author in authors {
        let last_seen = Utc
            .timestamp_opt(author.last_seen, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        writeln!(
            out,
            "{} - {} ({} commits, last {})",
            author.name, author.email, author.commits, last_seen
        )?;
    }
    Ok(())
}
