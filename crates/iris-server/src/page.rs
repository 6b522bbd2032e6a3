//! HTML rendering for the measurement form page

use iris_lib::{
    models::MeasurementField,
    presenter::{HistoryTable, HISTORY_COLUMNS},
    MeasurementForm, SuccessNotice,
};
use std::fmt::Write;

const PAGE_TITLE: &str = "Iris Classification App";
const SIDEBAR_BLURB: &str =
    "This classification app predicts the iris species from four flower measurements.";
const HISTORY_SUMMARY: &str = "See the predictions done until now..";

/// Everything one render of the page shows
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub form: Option<&'a MeasurementForm>,
    pub notice: Option<SuccessNotice>,
    pub error: Option<String>,
    pub history: Option<HistoryTable>,
}

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", PAGE_TITLE);
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(
        html,
        "<aside class=\"sidebar\">\n<p>{}</p>\n<p>{}</p>\n</aside>",
        PAGE_TITLE, SIDEBAR_BLURB
    );
    html.push_str("<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", PAGE_TITLE);

    if let Some(error) = &view.error {
        let _ = writeln!(html, "<p class=\"error\" role=\"alert\">{}</p>", escape(error));
    }

    render_form(&mut html, view.form);

    if let Some(notice) = &view.notice {
        html.push_str("<div class=\"notice\" role=\"status\">\n");
        for line in notice.lines() {
            let _ = writeln!(html, "<p>{}</p>", escape(&line));
        }
        html.push_str("</div>\n");
    }

    if let Some(history) = view.history.as_ref().filter(|h| !h.is_empty()) {
        let _ = writeln!(html, "<details>\n<summary>{}</summary>", HISTORY_SUMMARY);
        render_history(&mut html, history);
        html.push_str("</details>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Two rows of two inputs: sepal measurements, then petal measurements
fn render_form(html: &mut String, form: Option<&MeasurementForm>) {
    html.push_str("<form method=\"post\" action=\"/\">\n");
    for row in MeasurementField::ALL.chunks(2) {
        html.push_str("<div class=\"row\">\n");
        for &field in row {
            let value = form.map(|f| f.get(field)).unwrap_or("");
            let _ = writeln!(
                html,
                "<div class=\"field\">\n\
                 <label for=\"{key}\">{label}</label>\n\
                 <input id=\"{key}\" name=\"{key}\" type=\"text\" inputmode=\"decimal\" \
                 placeholder=\"0.0\" value=\"{value}\">\n\
                 </div>",
                key = field.key(),
                label = escape(field.label()),
                value = escape(value),
            );
        }
        html.push_str("</div>\n");
    }
    html.push_str("<button type=\"submit\">Submit</button>\n</form>\n");
}

fn render_history(html: &mut String, history: &HistoryTable) {
    html.push_str("<table>\n<thead><tr>");
    for column in HISTORY_COLUMNS {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in history.rows() {
        html.push_str("<tr>");
        for cell in row.cells() {
            let _ = write!(html, "<td>{}</td>", escape(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
}
