//! Small HTML building blocks. Pages are assembled with `format!`; every
//! piece of user data goes through [`escape`].

use std::{borrow::Cow, fmt::Write as _};

use axum::response::Html;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> Cow<'_, str> {
  if !text.contains(['&', '<', '>', '"', '\'']) {
    return Cow::Borrowed(text);
  }
  let mut out = String::with_capacity(text.len() + 8);
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  Cow::Owned(out)
}

/// Percent-encode a query parameter value.
pub fn query_value(text: &str) -> String { utf8_percent_encode(text, NON_ALPHANUMERIC).to_string() }

/// Wrap `body` in the site chrome.
pub fn layout(title: &str, body: &str) -> Html<String> {
  Html(format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Gamedex</title>
</head>
<body>
<nav>
  <a href="/">Home</a> |
  <a href="/games">Games</a> |
  <a href="/consoles">Consoles</a> |
  <a href="/about">About</a>
</nav>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
    title = escape(title),
  ))
}

/// A notice paragraph, or nothing when `message` is absent or blank.
pub fn notice(class: &str, message: Option<&str>) -> String {
  match message.map(str::trim).filter(|m| !m.is_empty()) {
    Some(m) => format!("<p class=\"{class}\">{}</p>\n", escape(m)),
    None => String::new(),
  }
}

/// A table with a header row. Cells are escaped; `extra` is appended raw to
/// each row (action links and buttons).
pub fn table(
  columns: &[&str],
  rows: impl IntoIterator<Item = (Vec<String>, String)>,
) -> String {
  let mut out = String::from("<table>\n<thead><tr>");
  for column in columns {
    let _ = write!(out, "<th>{}</th>", escape(&column.replace('_', " ")));
  }
  out.push_str("</tr></thead>\n<tbody>\n");
  for (cells, extra) in rows {
    out.push_str("<tr>");
    for cell in &cells {
      let _ = write!(out, "<td>{}</td>", escape(cell));
    }
    out.push_str(&extra);
    out.push_str("</tr>\n");
  }
  out.push_str("</tbody>\n</table>\n");
  out
}

/// One labelled text input per field, pre-filled from `values`.
pub fn inputs(fields: &[&str], values: &[Option<String>]) -> String {
  let mut out = String::new();
  for (i, field) in fields.iter().enumerate() {
    let value = values.get(i).cloned().flatten().unwrap_or_default();
    let _ = writeln!(
      out,
      "<label>{label} <input type=\"text\" name=\"{field}\" value=\"{value}\"></label><br>",
      label = escape(&field.replace('_', " ")),
      field = escape(field),
      value = escape(&value),
    );
  }
  out
}

/// "Page N of M" with previous/next links to `base?page=…`.
pub fn pager(base: &str, page: u64, pages: u64) -> String {
  let mut out = String::from("<p class=\"pager\">");
  if page > 1 {
    let _ = write!(out, "<a href=\"{base}?page={}\">Previous</a> ", page - 1);
  }
  let _ = write!(out, "Page {page} of {}", pages.max(1));
  if page < pages {
    let _ = write!(out, " <a href=\"{base}?page={}\">Next</a>", page + 1);
  }
  out.push_str("</p>\n");
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup() {
    assert_eq!(escape("Tom & Jerry <3"), "Tom &amp; Jerry &lt;3");
    assert_eq!(escape("say \"hi\""), "say &quot;hi&quot;");
    assert!(matches!(escape("plain"), Cow::Borrowed(_)));
  }

  #[test]
  fn query_values_are_percent_encoded() {
    assert_eq!(query_value("a b&c"), "a%20b%26c");
  }

  #[test]
  fn pager_links_only_where_pages_exist() {
    let first = pager("/games", 1, 3);
    assert!(!first.contains("Previous"));
    assert!(first.contains("/games?page=2"));

    let last = pager("/games", 3, 3);
    assert!(last.contains("/games?page=2"));
    assert!(!last.contains("Next"));

    assert!(pager("/games", 1, 0).contains("Page 1 of 1"));
  }

  #[test]
  fn blank_notice_renders_nothing() {
    assert_eq!(notice("error", Some("  ")), "");
    assert!(notice("error", Some("bad <year>")).contains("bad &lt;year&gt;"));
  }
}
