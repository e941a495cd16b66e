// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deda contributors

//! Terminal color utilities
//!
//! Keeps the CLI's markers and headings consistent.

use colored::Colorize;

/// Print a section heading such as `Errors:`
pub fn print_section(title: &str, style: fn(&str) -> colored::ColoredString) {
    println!();
    println!("{}:", style(title));
}

/// Heading style for errors
pub fn error_heading(title: &str) -> colored::ColoredString {
    title.red().bold()
}

/// Heading style for warnings
pub fn warning_heading(title: &str) -> colored::ColoredString {
    title.yellow().bold()
}

/// Heading style for plain sections
pub fn plain_heading(title: &str) -> colored::ColoredString {
    title.bold()
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}
