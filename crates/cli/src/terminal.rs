//! Terminal rendering of page updates.

use std::io::{self, Write};

use userdesk_portal::ui::{Element, LOADING, LOGGING_IN, Page, REGISTERING, UserRow, UsersTableBody};

const HEADERS: [&str; 3] = ["ID", "Username", "Created At"];

/// [`Page`] that prints each settled element update to a writer.
///
/// Progress placeholders are skipped. The first write error is kept and
/// returned by [`finish`](Self::finish); later updates are dropped.
pub struct TerminalPage<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write + Send> TerminalPage<W> {
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flush and hand back the writer.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while writing.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{text}") {
            self.error = Some(e);
        }
    }
}

fn is_placeholder(text: &str) -> bool {
    matches!(text, REGISTERING | LOGGING_IN | LOADING)
}

/// Render rows as a left-aligned table with a header line.
fn format_table(rows: &[UserRow]) -> String {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(cells(row)) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut lines = vec![line(HEADERS)];
    lines.extend(rows.iter().map(|row| line(cells(row))));
    lines.join("\n")
}

fn cells(row: &UserRow) -> [&str; 3] {
    [row.id.as_str(), row.username.as_str(), row.created_at.as_str()]
}

impl<W: Write + Send> Page for TerminalPage<W> {
    fn set_text(&mut self, _element: Element, text: String) {
        if !is_placeholder(&text) {
            self.write(&text);
        }
    }

    fn set_users_table(&mut self, body: UsersTableBody) {
        match body {
            UsersTableBody::Message(message) if is_placeholder(&message) => {}
            UsersTableBody::Message(message) => self.write(&message),
            UsersTableBody::Rows(rows) if rows.is_empty() => self.write("No users."),
            UsersTableBody::Rows(rows) => self.write(&format_table(&rows)),
        }
    }
}
