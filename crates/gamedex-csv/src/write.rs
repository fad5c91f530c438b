//! Row writer.

use std::borrow::Cow;

/// Quote a cell if it contains a delimiter, a quote, a line break, or
/// leading/trailing whitespace (which readers would otherwise trim).
/// Internal quotes are doubled.
pub fn escape(cell: &str) -> Cow<'_, str> {
  let needs_quotes = cell.contains([',', '"', '\n', '\r'])
    || cell.starts_with(char::is_whitespace)
    || cell.ends_with(char::is_whitespace);
  if needs_quotes {
    Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
  } else {
    Cow::Borrowed(cell)
  }
}

/// Append one `\n`-terminated row to `out`.
pub fn write_row<I, C>(out: &mut String, cells: I)
where
  I: IntoIterator<Item = C>,
  C: AsRef<str>,
{
  for (i, cell) in cells.into_iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    out.push_str(&escape(cell.as_ref()));
  }
  out.push('\n');
}
