//! Output formatting: JSON, YAML, table, plain.
//!
//! Machine-readable documents go to stdout in the format selected by
//! `--output`; human diagnostics go to stderr.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use nxrm_core::{Diagnostics, Severity};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Whether stderr diagnostics should be colored.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list: a table of rows, serde for structured formats, or one
/// identifier per line.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_document(structured, data),
    }
}

/// Render one document. Table and plain fall back to pretty JSON, which
/// is the only sensible rendering of free-form state.
pub fn render_document<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Json | OutputFormat::Table | OutputFormat::Plain => {
            serde_json::to_string_pretty(data)?
        }
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Human rendering of diagnostics on stderr. Errors are always shown;
/// warnings only when not quiet.
pub fn print_diagnostics(diagnostics: &Diagnostics, color: bool, quiet: bool) {
    let mut stderr = io::stderr().lock();
    for diag in diagnostics.iter() {
        let label = match diag.severity {
            Severity::Error => "error",
            Severity::Warning if quiet => continue,
            Severity::Warning => "warning",
        };
        let label = match (color, diag.severity) {
            (false, _) => label.to_owned(),
            (true, Severity::Error) => label.red().bold().to_string(),
            (true, Severity::Warning) => label.yellow().bold().to_string(),
        };
        let _ = writeln!(stderr, "{label}: {}", diag.summary);
        if let Some(ref attr) = diag.attribute {
            let _ = writeln!(stderr, "  attribute: {attr}");
        }
        for line in diag.detail.lines() {
            let _ = writeln!(stderr, "  {line}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Tabled)]
    struct Row {
        name: String,
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let data = vec![json!({ "name": "a" }), json!({ "name": "b" })];
        let out = render_list(
            OutputFormat::Plain,
            &data,
            |v| Row {
                name: v["name"].as_str().unwrap().to_owned(),
            },
            |v| v["name"].as_str().unwrap().to_owned(),
        )
        .unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_document(OutputFormat::JsonCompact, &json!({ "a": [1, 2] })).unwrap();
        assert_eq!(out, r#"{"a":[1,2]}"#);
    }
}
