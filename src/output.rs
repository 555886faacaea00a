//! Rendering of runtime answers for the terminal.

use serde::Serialize;
use tabled::{Table, Tabled};

use numz_command::CommandEnvelope;
use numz_module::ValidationReport;
use numz_plugin::HookOutcome;

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables and labelled lines
    #[default]
    Table,
    /// Pretty-printed JSON, suitable for piping
    Json,
}

/// Rows as a table, or the rows as a JSON array.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Table if rows.is_empty() => println!("Nothing to show."),
        OutputFormat::Table => println!("{}", Table::new(rows)),
    }
}

/// A serializable record. Tables have no fixed shape for it, so both formats
/// print JSON; table mode keeps it compact.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(item),
        OutputFormat::Table => match serde_json::to_value(item) {
            Ok(serde_json::Value::Object(fields)) => {
                for (key, value) in fields {
                    print_kv(&key, &plain(&value));
                }
            }
            Ok(other) => println!("{}", plain(&other)),
            Err(e) => print_error(&format!("Cannot render result: {e}")),
        },
    }
}

/// A bare list of names, one per line.
pub fn print_names(names: &[String], empty: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(names),
        OutputFormat::Table if names.is_empty() => println!("{empty}"),
        OutputFormat::Table => names.iter().for_each(|name| println!("  {name}")),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => print_error(&format!("Cannot render result: {e}")),
    }
}

/// A module validation report.
pub fn print_validation(module: &str, report: &ValidationReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        return print_json(report);
    }
    if report.valid {
        print_success(&format!("Module '{module}' is valid"));
    } else {
        print_error(&format!("Module '{module}' is invalid"));
    }
    report.errors.iter().for_each(|e| print_kv("error", e));
    report.warnings.iter().for_each(|w| print_kv("warning", w));
}

/// A command envelope. The JSON form is printed in both modes since callers
/// of the legacy surface expect it verbatim.
pub fn print_envelope(envelope: &CommandEnvelope, format: OutputFormat) {
    print_json(envelope);
    if format == OutputFormat::Table {
        if let Some(message) = envelope.message() {
            print_error(message);
        }
    }
}

/// The per-listener results of one hook firing.
pub fn print_outcomes(point: &str, outcomes: &[HookOutcome], format: OutputFormat) {
    if format == OutputFormat::Json {
        return print_json(outcomes);
    }
    if outcomes.is_empty() {
        println!("No listeners for '{point}'.");
    }
    for (index, outcome) in outcomes.iter().enumerate() {
        let label = if outcome.is_error() { "failed" } else { "ok" };
        print_kv(&format!("#{} {label}", index + 1), &plain(&outcome.to_value()));
    }
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {value}", format!("{key}:"));
}

/// Strings without their JSON quotes, everything else as compact JSON.
fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
