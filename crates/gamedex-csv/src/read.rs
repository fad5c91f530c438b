//! Row reader.
//!
//! Works on bytes: every delimiter is ASCII, so slicing at delimiter
//! positions always lands on a UTF-8 boundary.

use crate::error::{Error, Result};

/// One parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  /// 1-based line the row starts on.
  pub line:  usize,
  pub cells: Vec<String>,
}

/// Lazy row iterator; see [`crate::rows`].
pub struct Rows<'a> {
  input: &'a str,
  pos:   usize,
  line:  usize,
}

impl<'a> Rows<'a> {
  pub(crate) fn new(input: &'a str) -> Self {
    let pos = if input.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
    Self { input, pos, line: 1 }
  }

  fn byte(&self, at: usize) -> Option<u8> { self.input.as_bytes().get(at).copied() }

  /// Consume a line terminator at `pos` if there is one.
  fn eat_newline(&mut self) -> bool {
    match self.byte(self.pos) {
      Some(b'\n') => {
        self.pos += 1;
        self.line += 1;
        true
      }
      Some(b'\r') if self.byte(self.pos + 1) == Some(b'\n') => {
        self.pos += 2;
        self.line += 1;
        true
      }
      _ => false,
    }
  }

  /// Skip to just past the next `\n`, used to resynchronise after an error.
  fn skip_line(&mut self) {
    match self.input[self.pos..].find('\n') {
      Some(i) => {
        self.pos += i + 1;
        self.line += 1;
      }
      None => self.pos = self.input.len(),
    }
  }

  fn read_quoted(&mut self, start_line: usize) -> Result<String> {
    // Opening quote.
    self.pos += 1;
    let mut cell = String::new();
    loop {
      let rest = &self.input[self.pos..];
      let Some(close) = rest.find('"') else {
        self.pos = self.input.len();
        return Err(Error::UnterminatedQuote { line: start_line });
      };
      let chunk = &rest[..close];
      self.line += chunk.matches('\n').count();
      cell.push_str(chunk);
      self.pos += close + 1;

      // `""` is an escaped quote; anything else closes the field.
      if self.byte(self.pos) == Some(b'"') {
        cell.push('"');
        self.pos += 1;
      } else {
        return Ok(cell);
      }
    }
  }

  fn read_unquoted(&mut self) -> String {
    let rest = &self.input[self.pos..];
    let end = rest.find([',', '\n']).unwrap_or(rest.len());
    let mut cell = &rest[..end];
    if rest.as_bytes().get(end) == Some(&b'\n') {
      cell = cell.strip_suffix('\r').unwrap_or(cell);
    }
    self.pos += end;
    cell.to_owned()
  }

  fn read_row(&mut self, start_line: usize) -> Result<Vec<String>> {
    let mut cells = Vec::new();
    loop {
      if self.byte(self.pos) == Some(b'"') {
        cells.push(self.read_quoted(start_line)?);
        match self.byte(self.pos) {
          None => return Ok(cells),
          Some(b',') => self.pos += 1,
          _ if self.eat_newline() => return Ok(cells),
          Some(_) => {
            let line = self.line;
            self.skip_line();
            return Err(Error::TrailingCharacter { line });
          }
        }
      } else {
        cells.push(self.read_unquoted());
        match self.byte(self.pos) {
          Some(b',') => self.pos += 1,
          Some(b'\n') => {
            self.eat_newline();
            return Ok(cells);
          }
          _ => return Ok(cells),
        }
      }
    }
  }
}

impl Iterator for Rows<'_> {
  type Item = Result<Row>;

  fn next(&mut self) -> Option<Self::Item> {
    while self.pos < self.input.len() {
      let line = self.line;
      match self.read_row(line) {
        Ok(cells) if cells.len() == 1 && cells[0].is_empty() => continue,
        Ok(cells) => return Some(Ok(Row { line, cells })),
        Err(e) => return Some(Err(e)),
      }
    }
    None
  }
}
