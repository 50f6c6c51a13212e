use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use sourcelog_core::{FileKind, Summary};
use std::io::{self, Write};
use std::path::Path;

pub fn print_summary(action: &str, summary: &Summary, target: &Path, quiet: bool) {
    if quiet {
        return;
    }
    println!(
        "{} {} {} files into {}",
        "✅".green(),
        action,
        summary.files_written.to_string().cyan(),
        target.display().to_string().blue()
    );
    if !summary.groups.is_empty() {
        println!("   {} {}", "Groups:".green(), summary.groups.join(", ").dimmed());
    }
    if summary.files_skipped > 0 {
        println!(
            "   {} {} unreadable or non-UTF-8 files (see -v for details)",
            "Skipped".yellow(),
            summary.files_skipped
        );
    }
}

pub fn print_saved(label: &str, target: &Path, quiet: bool) {
    if !quiet {
        println!(
            "{} {} saved to: {}",
            "✅".green(),
            label,
            target.display().to_string().blue()
        );
    }
}

pub fn print_failure(label: &str, err: &anyhow::Error) {
    eprintln!("{} {} failed: {:#}", "✗".red().bold(), label, err);
}

pub fn print_types_table() {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Type").fg(Color::Green),
        Cell::new("Extensions").fg(Color::Green),
        Cell::new("Description").fg(Color::Green),
    ]);
    for kind in FileKind::ALL {
        table.add_row(vec![
            Cell::new(kind.key()).fg(Color::Cyan),
            Cell::new(kind.extensions().join(" ")),
            Cell::new(kind.description()).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
