//! Dashboard Views
//!
//! Server-rendered HTML for the public pages and the three dashboards. Every
//! value that came from storage or a form goes through [`escape`].

pub mod handlers;
pub mod views;

use crate::core::models::Session;
use crate::routing::{nav_links, NavKind};

/// Shown in place of an absent profile field.
pub const PLACEHOLDER: &str = "—";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Escaped value, or the placeholder when absent or blank.
pub fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => escape(v),
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn navbar(session: Option<&Session>) -> String {
    let items: String = nav_links(session)
        .into_iter()
        .map(|link| match link.kind {
            NavKind::Link => format!(r#"<li><a href="{}">{}</a></li>"#, link.href, link.label),
            NavKind::CallToAction => format!(
                r#"<li><a class="cta" href="{}">{}</a></li>"#,
                link.href, link.label
            ),
            // Signing out changes state, so it is a form post rather than a link.
            NavKind::SignOut => format!(
                r#"<li><form method="post" action="{}"><button type="submit">{}</button></form></li>"#,
                link.href, link.label
            ),
        })
        .collect();

    format!(
        r#"<nav class="navbar"><a class="brand" href="/">MDC Hackathon</a><ul>{}</ul></nav>"#,
        items
    )
}

pub fn layout(title: &str, session: Option<&Session>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | MDC Hackathon</title>
</head>
<body>
{nav}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = navbar(session),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Role;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(or_placeholder(None), PLACEHOLDER);
        assert_eq!(or_placeholder(Some("  ")), PLACEHOLDER);
        assert_eq!(or_placeholder(Some("Rust")), "Rust");
    }

    #[test]
    fn test_navbar_signed_out() {
        let html = navbar(None);
        assert!(html.contains(r#"href="/login""#));
        assert!(html.contains("Register Now"));
        assert!(!html.contains("Sign Out"));
    }

    #[test]
    fn test_navbar_both_role_sees_both_dashboards() {
        let session = Session {
            user_id: "u".into(),
            email: "u@x.io".into(),
            role: Some(Role::Both),
            is_admin: false,
            token: None,
        };
        let html = navbar(Some(&session));
        assert!(html.contains(r#"href="/participant/dashboard""#));
        assert!(html.contains(r#"href="/volunteer/dashboard""#));
        assert!(html.contains(r#"<form method="post" action="/logout">"#));
        assert!(!html.contains("Register Now"));
    }
}
