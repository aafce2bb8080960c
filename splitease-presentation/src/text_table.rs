use std::{borrow::Cow, fmt::Write};

const COLUMN_GAP: usize = 2;
const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Renders a monospace table; cells past the header count are dropped.
    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| display_width(h).max(MIN_COLUMN_WIDTH))
            .collect();

        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(display_width(cell));
                }
            }
        }

        let mut table = String::with_capacity(256 * (1 + self.rows.len()));
        self.write_line(&mut table, self.headers, &col_widths);

        let rule_width = col_widths.iter().sum::<usize>() + COLUMN_GAP * (col_count - 1);
        table.push_str(&"-".repeat(rule_width));
        table.push('\n');

        for row in &self.rows {
            self.write_line(&mut table, row.as_ref(), &col_widths);
        }

        table
    }

    fn write_line(&self, out: &mut String, cells: &[Cow<'_, str>], col_widths: &[usize]) {
        let mut line = String::new();
        for (i, width) in col_widths.iter().copied().enumerate() {
            if i > 0 {
                line.push_str(&" ".repeat(COLUMN_GAP));
            }
            let cell = cells.get(i).map_or("", |cell| cell.as_ref());
            let alignment = self.alignments.get(i).copied().unwrap_or_default();
            let _ = write!(&mut line, "{}", pad(cell, width, alignment));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

/// Terminal columns taken by `text`; non-ASCII is assumed double width.
fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

fn pad(text: &str, width: usize, alignment: Alignment) -> Cow<'_, str> {
    let fill = width.saturating_sub(display_width(text));
    if fill == 0 {
        return Cow::Borrowed(text);
    }

    let (left, right) = match alignment {
        Alignment::Left => (0, fill),
        Alignment::Center => (fill / 2, fill - fill / 2),
        Alignment::Right => (fill, 0),
    };
    Cow::Owned(format!("{}{text}{}", " ".repeat(left), " ".repeat(right)))
}

/// Stacks rendered sections with a blank line between them.
pub fn combine_sections_vertically(sections: &[&str]) -> Option<String> {
    if sections.is_empty() {
        return None;
    }

    let mut combined = String::with_capacity(sections.iter().map(|s| s.len() + 1).sum());
    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            combined.push('\n');
        }
        combined.push_str(section.trim_end_matches('\n'));
        combined.push('\n');
    }
    Some(combined)
}
