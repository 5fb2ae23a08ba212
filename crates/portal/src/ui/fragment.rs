//! HTMX fragment rendering of page updates.
//!
//! A [`FragmentPage`] collects the writes a controller makes while handling
//! one request and renders them as out-of-band swaps, one per element. Only
//! the final value of each element is sent: intermediate placeholders are
//! shown client-side by HTMX indicators while the request is pending.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use super::{Element, Page, USERS_TABLE_COLUMNS, UserRow, UsersTableBody};
use crate::error::AppError;

/// Page implementation that renders HTMX out-of-band fragments.
#[derive(Debug, Default)]
pub struct FragmentPage {
    texts: Vec<(Element, String)>,
    users_table: Option<UsersTableBody>,
}

impl FragmentPage {
    /// Create a page with no pending updates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest text written to `element`, if any.
    #[must_use]
    pub fn text(&self, element: Element) -> Option<&str> {
        self.texts
            .iter()
            .find(|(el, _)| *el == element)
            .map(|(_, text)| text.as_str())
    }

    /// Latest users table body, if it was written.
    #[must_use]
    pub const fn users_table(&self) -> Option<&UsersTableBody> {
        self.users_table.as_ref()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.users_table.is_none()
    }

    /// Render all pending updates as an HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render(&self) -> Result<String, askama::Error> {
        let texts = self
            .texts
            .iter()
            .map(|(element, text)| TextSwap {
                dom_id: element.dom_id(),
                text,
            })
            .collect();

        let table = self.users_table.as_ref().map(|body| {
            let (rows, message) = match body {
                UsersTableBody::Rows(rows) => (rows.as_slice(), None),
                UsersTableBody::Message(message) => (&[][..], Some(message.as_str())),
            };
            TableSwap {
                dom_id: Element::UsersTable.dom_id(),
                colspan: USERS_TABLE_COLUMNS,
                rows,
                message,
            }
        });

        FragmentTemplate { texts, table }.render()
    }
}

impl Page for FragmentPage {
    fn set_text(&mut self, element: Element, text: String) {
        match self.texts.iter_mut().find(|(el, _)| *el == element) {
            Some((_, existing)) => *existing = text,
            None => self.texts.push((element, text)),
        }
    }

    fn set_users_table(&mut self, body: UsersTableBody) {
        self.users_table = Some(body);
    }
}

impl IntoResponse for FragmentPage {
    fn into_response(self) -> Response {
        match self.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => AppError::from(e).into_response(),
        }
    }
}

struct TextSwap<'a> {
    dom_id: &'static str,
    text: &'a str,
}

struct TableSwap<'a> {
    dom_id: &'static str,
    colspan: usize,
    rows: &'a [UserRow],
    message: Option<&'a str>,
}

/// Out-of-band swap fragment.
#[derive(Template)]
#[template(path = "fragments/updates.html")]
struct FragmentTemplate<'a> {
    texts: Vec<TextSwap<'a>>,
    table: Option<TableSwap<'a>>,
}
