//! Diagnostic rendering for compile failures.
//!
//! Human-readable output goes through `codespan-reporting` so each
//! diagnostic shows the offending source line. JSON output serializes the
//! engine's diagnostics directly for editor integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use ibci_engine::diagnostics::code;
use ibci_engine::{CompileError, Diagnostic, Location, Severity};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::PathBuf;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Flatten a compile error into the diagnostics it carries.
///
/// Cycle errors carry no diagnostic list of their own, so the error text
/// becomes a single synthetic diagnostic.
pub fn diagnostics_of(err: &CompileError) -> Vec<Diagnostic> {
    let diagnostics = err.diagnostics();
    if diagnostics.is_empty() {
        vec![Diagnostic::error(code::DEP_CYCLE, err.to_string())]
    } else {
        diagnostics.to_vec()
    }
}

/// Print every diagnostic to stderr with source context, then a summary line.
pub fn emit_human(err: &CompileError) -> anyhow::Result<()> {
    let mut files: SimpleFiles<String, String> = SimpleFiles::new();
    let mut ids: HashMap<PathBuf, usize> = HashMap::new();

    let mut writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();

    for diagnostic in diagnostics_of(err) {
        let rendered = to_codespan(&diagnostic, &mut files, &mut ids);
        term::emit(&mut writer, &config, &files, &rendered)?;
    }

    writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(writer, "error")?;
    writer.reset()?;
    writeln!(writer, ": {}", err)?;
    Ok(())
}

/// Print the diagnostics as a JSON array on stdout.
pub fn emit_json(err: &CompileError) -> anyhow::Result<()> {
    let diagnostics = diagnostics_of(err);
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(())
}

fn to_codespan(
    diagnostic: &Diagnostic,
    files: &mut SimpleFiles<String, String>,
    ids: &mut HashMap<PathBuf, usize>,
) -> CsDiagnostic<usize> {
    let severity = match diagnostic.severity {
        Severity::Hint => CsSeverity::Help,
        Severity::Info => CsSeverity::Note,
        Severity::Warning => CsSeverity::Warning,
        Severity::Error | Severity::Fatal => CsSeverity::Error,
    };

    let mut rendered = CsDiagnostic::new(severity)
        .with_code(diagnostic.code.clone())
        .with_message(diagnostic.message.clone());

    if let Some(location) = &diagnostic.location {
        if let Some((file_id, range)) = locate(location, files, ids) {
            rendered = rendered.with_labels(vec![Label::primary(file_id, range)]);
        }
    }
    rendered
}

/// Load the referenced file on first use and turn a line/column location
/// into a byte range. Returns `None` when the file cannot be read; the
/// diagnostic is then emitted without a source snippet.
fn locate(
    location: &Location,
    files: &mut SimpleFiles<String, String>,
    ids: &mut HashMap<PathBuf, usize>,
) -> Option<(usize, Range<usize>)> {
    let file_id = match ids.get(&location.file) {
        Some(id) => *id,
        None => {
            let source = fs::read_to_string(&location.file).ok()?;
            let id = files.add(location.file.display().to_string(), source);
            ids.insert(location.file.clone(), id);
            id
        }
    };

    let source = files.get(file_id).ok()?.source().as_str();
    let offset = byte_offset(source, location.line, location.column)?;
    Some((file_id, offset..usize::min(offset + 1, source.len())))
}

/// Byte offset of a 1-indexed line and 0-indexed character column.
///
/// Columns count characters, so the offset lands on a UTF-8 boundary even
/// when the line holds multi-byte text. Positions past the end of the line
/// or the file clamp to the nearest boundary.
fn byte_offset(source: &str, line: u32, column: u32) -> Option<usize> {
    let line = line.checked_sub(1)? as usize;
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line)
        .map(str::len)
        .sum();

    let rest = &source[line_start..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    let line_text = &rest[..line_len];

    let column_offset = match line_text.char_indices().nth(column as usize) {
        Some((offset, _)) => offset,
        None => line_len,
    };
    Some(line_start + column_offset)
}
