//! HTML rendering of the latest snapshot

use webmon_service::{SiteStatus, Snapshot};

const REFRESH_SECONDS: u32 = 10;

/// Full dashboard page; `None` renders the "no data yet" page
pub fn dashboard_page(snapshot: Option<&Snapshot>) -> String {
    let body = match snapshot {
        Some(snapshot) => snapshot_section(snapshot),
        None => r#"<p class="pending">No check has completed yet. This page refreshes automatically.</p>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta http-equiv="refresh" content="{REFRESH_SECONDS}">
    <title>webmon</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 1080px; margin: 0 auto; padding: 1rem; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 0.5rem; text-align: left; border-bottom: 1px solid #dee2e6; }}
        .badge {{ display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-weight: 600; }}
        .up {{ color: #155724; background-color: #d4edda; }}
        .down {{ color: #721c24; background-color: #f8d7da; }}
        .mismatch {{ color: #856404; background-color: #fff3cd; }}
        .pending {{ color: #383d41; }}
    </style>
</head>
<body>
    <h1>webmon</h1>
{body}
</body>
</html>"#
    )
}

fn snapshot_section(snapshot: &Snapshot) -> String {
    let mut rows = String::new();
    for status in &snapshot.sites {
        rows.push_str(&site_row(status));
    }

    format!(
        r#"    <p>Cycle {cycle} at {taken_at}: {up} up, {down} down</p>
    <table>
        <thead>
            <tr><th>Site</th><th>URL</th><th>Status</th><th>Code</th><th>Elapsed</th><th>Content</th><th>Error</th></tr>
        </thead>
        <tbody>
{rows}        </tbody>
    </table>"#,
        cycle = snapshot.cycle,
        taken_at = snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC"),
        up = snapshot.up_count(),
        down = snapshot.down_count(),
    )
}

fn site_row(status: &SiteStatus) -> String {
    let (class, label) = if status.up { ("up", "UP") } else { ("down", "DOWN") };

    let code = status.code.map(|code| code.to_string()).unwrap_or_default();
    let content = match status.matched {
        Some(true) => r#"<span class="badge up">match</span>"#,
        Some(false) => r#"<span class="badge mismatch">no match</span>"#,
        None => "",
    };
    let error = match (status.error, &status.error_message) {
        (Some(kind), Some(message)) => format!(r#"<span title="{}">{kind}</span>"#, escape(message)),
        (Some(kind), None) => kind.to_string(),
        _ => String::new(),
    };

    format!(
        r#"            <tr><td>{id}</td><td><a href="{url}">{url}</a></td><td><span class="badge {class}">{label}</span></td><td>{code}</td><td>{elapsed:.0} ms</td><td>{content}</td><td>{error}</td></tr>
"#,
        id = escape(&status.id),
        url = escape(&status.url),
        elapsed = status.elapsed.as_secs_f64() * 1000.0,
    )
}

/// Minimal HTML escaping for text and attribute values
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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
