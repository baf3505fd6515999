//! Server-rendered HTML pages.

use axum::response::Html;
use domain::table_rows::TableRows;

const STYLE: &str = "body{font-family:system-ui,sans-serif;background:#020617;color:#f1f5f9;margin:0;padding:2.5rem 1.5rem}\
main{max-width:72rem;margin:0 auto}\
table{border-collapse:collapse;width:100%}\
th,td{border-bottom:1px solid #1e293b;padding:.75rem 1rem;text-align:left;vertical-align:top}\
.error{border:1px solid #fb7185;border-radius:.75rem;padding:2rem;max-width:42rem;margin:0 auto}\
a.button{display:inline-block;background:#38bdf8;color:#0f172a;border-radius:999px;padding:.5rem 1.25rem;text-decoration:none;font-weight:600}";

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape(title)
    ))
}

pub(crate) fn home(table_name: &str, table: &TableRows) -> Html<String> {
    let mut body = format!(
        "<main><header><h1>Data Viewer</h1>\
<p>Showing up to {} row(s) from the <code>{}</code> table.</p>\
<p><a class=\"button\" href=\"/protected\">Caption voting</a></p></header>",
        table.rows.len(),
        escape(table_name)
    );

    if table.rows.is_empty() {
        body.push_str(
            "<p>No rows were returned. Check that <code>SUPABASE_TABLE</code> points to a \
table with data and that row level security allows reads.</p>",
        );
    } else {
        body.push_str("<table><thead><tr>");
        for column in &table.columns {
            body.push_str(&format!("<th>{}</th>", escape(column)));
        }
        body.push_str("</tr></thead><tbody>");
        for row in &table.rows {
            body.push_str("<tr>");
            for cell in table.cells(row) {
                body.push_str(&format!("<td>{}</td>", escape(&cell)));
            }
            body.push_str("</tr>");
        }
        body.push_str("</tbody></table>");
    }
    body.push_str("</main>");

    layout("Data Viewer", &body)
}

pub(crate) fn configuration_error(message: &str) -> Html<String> {
    layout(
        "Configuration Error",
        &format!(
            "<main class=\"error\"><h1>Configuration Error</h1><p>{}</p>\
<p>Set the backend URL and API key in <code>.env</code> and restart the server.</p></main>",
            escape(message)
        ),
    )
}

/// The signed-in area, with the forms that drive the JSON API.
pub(crate) fn protected(email: Option<&str>) -> Html<String> {
    let who = email
        .map(|email| format!("<p>Signed in as <strong>{}</strong>.</p>", escape(email)))
        .unwrap_or_default();

    layout(
        "Caption Voting",
        &format!(
            "<main><header><h1>Upload Images, Generate Captions, Then Vote</h1>{who}\
<p><a href=\"/auth/logout\">Sign out</a></p></header>\
<section id=\"generate-caption\"><h2>Generate captions</h2>\
<form method=\"post\" action=\"/api/generate-captions\" enctype=\"multipart/form-data\">\
<input type=\"file\" name=\"image\" accept=\"image/jpeg,image/png,image/webp,image/gif,image/heic\">\
<button type=\"submit\">Generate</button></form></section>\
<section id=\"rate-caption\"><h2>Community Caption Voting</h2>\
<p>Fetch a caption from <code>GET /api/captions/random</code> and send \
<code>{{\"captionId\", \"score\"}}</code> to <code>POST /api/caption-votes</code>.</p>\
</section></main>"
        ),
    )
}

/// Shown on the protected route when there is no usable session.
pub(crate) fn sign_in_required(message: &str) -> Html<String> {
    layout(
        "Caption Voting",
        &format!(
            "<main><header><h1>Upload Images, Generate Captions, Then Vote</h1></header>\
<p>{}</p><p><a class=\"button\" href=\"/auth/login\">Sign in to continue</a></p></main>",
            escape(message)
        ),
    )
}

pub(crate) fn auth_error(message: &str, home_url: &str) -> Html<String> {
    layout(
        "Authentication Error",
        &format!(
            "<main class=\"error\"><h1>Authentication Error</h1><p>{}</p>\
<p>Go back to <a href=\"{}\">home</a> and try signing in again.</p></main>",
            escape(message),
            escape(home_url)
        ),
    )
}
