//! Step outputs for the workflow runner.
//!
//! The payload is published two ways: the `::set-output` workflow command on
//! stdout, and, when the runner provides one, the `GITHUB_OUTPUT` file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

/// Output name under which the sent payload is exposed.
pub const DATA_SENT: &str = "data-sent";

/// Escape a value for use inside a workflow command.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format `::set-output name=<name>::<value>`.
///
/// The value is escaped with [`escape_data`]; the runner decodes it back, so
/// the step output holds the original text.
pub fn set_output_command(name: &str, value: &str) -> String {
    format!("::set-output name={}::{}", name, escape_data(value))
}

/// Format an entry for the `GITHUB_OUTPUT` file.
///
/// Multi-line values use the heredoc form with a delimiter that does not
/// occur in the value.
pub fn output_file_entry(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{}={}\n", name, value);
    }

    let mut delimiter = String::from("ghadelimiter");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Write the set-output command line to `out`.
pub fn write_set_output<W: Write>(out: &mut W, name: &str, value: &str) -> io::Result<()> {
    writeln!(out, "{}", set_output_command(name, value))?;
    out.flush()
}

/// Append an output entry to the runner's output file.
pub fn append_output_file(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(output_file_entry(name, value).as_bytes())
}

/// Publish an output on stdout and, if given, in the output file.
pub fn emit(name: &str, value: &str, output_file: Option<&Path>) -> io::Result<()> {
    write_set_output(&mut io::stdout().lock(), name, value)?;

    if let Some(path) = output_file {
        append_output_file(path, name, value)?;
        info!(output = name, path = %path.display(), "output_file_written");
    }

    Ok(())
}
