use serde_json::{Map, Value};

use crate::FieldDescriptor;

/// Rows beyond this count are dropped from the rendered preview.
pub const MAX_PREVIEW_ROWS: usize = 10;

const EMPTY_MESSAGE: &str = "Нет данных для отображения";

/// One extracted record as sent by the server, keyed by field id.
pub type PreviewRow = Map<String, Value>;

/// Preview sample laid out for display: one column per selected field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl PreviewTable {
    /// Builds the table for `selected` field ids, in selection order.
    ///
    /// Headers use the display name of the matching descriptor and fall back to
    /// the raw id. Only the first [`MAX_PREVIEW_ROWS`] rows are kept.
    pub fn build(fields: &[FieldDescriptor], selected: &[String], data: &[PreviewRow]) -> Self {
        let headers = selected
            .iter()
            .map(|id| {
                fields
                    .iter()
                    .find(|field| &field.id == id)
                    .map(|field| field.name.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect();

        let rows = data
            .iter()
            .take(MAX_PREVIEW_ROWS)
            .map(|row| selected.iter().map(|id| cell_text(row.get(id))).collect())
            .collect();

        Self {
            headers,
            rows,
            total_rows: data.len(),
        }
    }

    pub fn shown_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }

    /// "Shown X of Y" line, present only when rows were cut off.
    pub fn note(&self) -> Option<String> {
        (self.total_rows > self.shown_rows()).then(|| {
            format!(
                "Показано {} из {} записей",
                self.shown_rows(),
                self.total_rows
            )
        })
    }

    pub fn empty_message() -> &'static str {
        EMPTY_MESSAGE
    }

    /// Standalone HTML fragment with every header and cell escaped.
    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return format!("<p>{EMPTY_MESSAGE}</p>");
        }

        let mut html = String::from("<table class=\"preview-table\"><thead><tr>");
        for header in &self.headers {
            html.push_str("<th>");
            html.push_str(&escape_html(header));
            html.push_str("</th>");
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str("<td>");
                html.push_str(&escape_html(cell));
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");

        if let Some(note) = self.note() {
            html.push_str("<p class=\"preview-note\">");
            html.push_str(&note);
            html.push_str("</p>");
        }
        html
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
