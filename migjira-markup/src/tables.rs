//! Pipe tables.
//!
//! Two shapes exist in wiki markup:
//!
//! - headered: `||H1||H2||` followed by `|a|b|` data rows
//! - headerless: a run of `|a|b|` rows
//!
//! A row that does not end with its closing delimiter continues on the next
//! line, which lets a cell hold line breaks. Those are rendered as `<br>`.

/// A table lifted out of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
  /// Raw header row, if the table has one.
  pub header: Option<String>,
  /// Raw data rows; a row may contain embedded newlines.
  pub rows:   Vec<String>,
}

impl TableBlock {
  #[must_use]
  pub const fn has_header(&self) -> bool {
    self.header.is_some()
  }

  /// Cell matrix, header first when present.
  #[must_use]
  pub fn cells(&self) -> Vec<Vec<String>> {
    self
      .header
      .iter()
      .map(|header| split_cells(header, "||"))
      .chain(self.rows.iter().map(|row| split_cells(row, "|")))
      .collect()
  }

  /// Render the block as a Markdown table.
  #[must_use]
  pub fn to_markdown(&self) -> String {
    let mut cells = self.cells().into_iter();
    let header = if self.has_header() {
      cells.next().unwrap_or_default()
    } else {
      let width = self.rows.first().map_or(0, |row| split_cells(row, "|").len());
      vec![" ".to_owned(); width]
    };

    let mut lines = Vec::with_capacity(self.rows.len() + 2);
    lines.push(render_row(&header));
    lines.push(render_row(&vec!["------".to_owned(); header.len()]));
    lines.extend(cells.map(|row| render_row(&row)));
    lines.join("\n")
  }
}

fn render_row(cells: &[String]) -> String {
  let cells: Vec<String> = cells.iter().map(|cell| cell.replace('\n', "<br>")).collect();
  format!("| {} |", cells.join(" | "))
}

/// Split a raw row into cells on `delimiter`.
///
/// Exactly one outer delimiter is removed from each end, so empty leading or
/// trailing cells survive. Delimiters inside `[...]` do not split, which keeps
/// piped links in one cell.
fn split_cells(row: &str, delimiter: &str) -> Vec<String> {
  let inner = row.strip_prefix(delimiter).unwrap_or(row);
  let inner = inner.strip_suffix(delimiter).unwrap_or(inner);

  let mut cells = Vec::new();
  let mut current = String::new();
  let mut depth = 0usize;
  let mut rest = inner;
  while let Some(ch) = rest.chars().next() {
    if depth == 0 && rest.starts_with(delimiter) {
      cells.push(std::mem::take(&mut current));
      rest = &rest[delimiter.len()..];
      continue;
    }
    match ch {
      '[' => depth += 1,
      ']' => depth = depth.saturating_sub(1),
      _ => {},
    }
    current.push(ch);
    rest = &rest[ch.len_utf8()..];
  }
  cells.push(current);
  cells
}

fn is_header_line(line: &str) -> bool {
  line.len() >= 2 && line.starts_with("||") && line.ends_with("||")
}

fn is_data_line(line: &str) -> bool {
  line.starts_with('|') && !line.starts_with("||")
}

/// Collect one data row starting at `start`, joining continuation lines until
/// the row closes. Returns the row and the index after it, or `None` when the
/// row never closes.
fn collect_row(lines: &[&str], start: usize, headered: bool) -> Option<(String, usize)> {
  let mut row = lines[start].to_owned();
  let mut next = start + 1;
  while !row.ends_with('|') {
    let line = lines.get(next)?;
    let stops_table = line.is_empty() || is_header_line(line);
    let starts_row = !headered && line.starts_with('|');
    if stops_table || starts_row {
      return None;
    }
    row.push('\n');
    row.push_str(line);
    next += 1;
  }
  Some((row, next))
}

/// Outcome of scanning from a `|` line.
enum Scan {
  Table(TableBlock, usize),
  /// A run that is already a Markdown table; skip it verbatim.
  Markdown(usize),
  NotATable,
}

/// `| ------ | :---: |`
fn is_markdown_separator(row: &str) -> bool {
  let cells = split_cells(row, "|");
  !cells.is_empty()
    && cells.iter().all(|cell| {
      let cell = cell.trim();
      cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':')
    })
}

/// Scan a table starting at `start`, which must be a header or data line.
fn scan_table(lines: &[&str], start: usize) -> Scan {
  let headered = is_header_line(lines[start]);
  let header = headered.then(|| lines[start].to_owned());
  let mut index = if headered { start + 1 } else { start };
  let mut rows = Vec::new();

  while let Some(line) = lines.get(index) {
    if !is_data_line(line) {
      break;
    }
    match collect_row(lines, index, headered) {
      Some((row, next)) => {
        rows.push(row);
        index = next;
      },
      None => break,
    }
  }

  if header.is_none() {
    if rows.is_empty() {
      return Scan::NotATable;
    }
    if rows.get(1).is_some_and(|row| is_markdown_separator(row)) {
      return Scan::Markdown(index);
    }
  }
  Scan::Table(TableBlock { header, rows }, index)
}

fn starts_table(line: &str) -> bool {
  is_header_line(line) || is_data_line(line)
}

/// A stretch of the source: either a line passed through as is, or a table.
enum Segment<'a> {
  Line(&'a str),
  Table(TableBlock),
}

/// Split `lines` into pass-through lines and tables, in order. Rows that never
/// close and tables that are already Markdown stay as plain lines.
fn segments<'a>(lines: &[&'a str]) -> Vec<Segment<'a>> {
  let mut out = Vec::with_capacity(lines.len());
  let mut index = 0;
  while index < lines.len() {
    if starts_table(lines[index]) {
      match scan_table(lines, index) {
        Scan::Table(table, next) => {
          out.push(Segment::Table(table));
          index = next;
          continue;
        },
        Scan::Markdown(next) => {
          out.extend(lines[index..next].iter().copied().map(Segment::Line));
          index = next;
          continue;
        },
        Scan::NotATable => {},
      }
    }
    out.push(Segment::Line(lines[index]));
    index += 1;
  }
  out
}

/// Replace every table in `text` with its Markdown rendering. Everything else
/// passes through untouched, including rows that never close and tables that
/// are already Markdown.
#[must_use]
pub fn convert_tables(text: &str) -> String {
  let lines: Vec<&str> = text.split('\n').collect();
  segments(&lines)
    .into_iter()
    .map(|segment| {
      match segment {
        Segment::Line(line) => line.to_owned(),
        Segment::Table(table) => table.to_markdown(),
      }
    })
    .collect::<Vec<_>>()
    .join("\n")
}
