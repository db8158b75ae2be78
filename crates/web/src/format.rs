//! Server-side formatting helpers used by the page templates.

use {
    autodash_sessions::Attribute,
    chrono::{DateTime, Local, Locale, Utc},
    serde_json::Value,
};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
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
    out
}

/// Timestamp in server-local time, formatted for `locale`.
pub fn format_timestamp(ts: &DateTime<Utc>, locale: Locale) -> String {
    ts.with_timezone(&Local)
        .format_localized("%x %X", locale)
        .to_string()
}

/// Plain-text rendering of an attribute value. Strings are shown without
/// quotes, `null` as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeStyle<'a> {
    /// Label shown instead of the attribute name. An empty label drops the
    /// `label: ` prefix.
    pub label: Option<&'a str>,
    pub tooltip: bool,
    pub linebreak: bool,
}

impl Default for AttributeStyle<'_> {
    fn default() -> Self {
        Self {
            label: None,
            tooltip: true,
            linebreak: false,
        }
    }
}

/// HTML snippet for one attribute: `label: value unit`, wrapped in a tooltip
/// carrying the last updated and last changed timestamps. Disabled
/// attributes render as nothing.
pub fn format_attribute(attr: &Attribute, locale: Locale, style: AttributeStyle<'_>) -> String {
    if !attr.enabled {
        return String::new();
    }

    let mut out = escape_html(style.label.unwrap_or(&attr.name));
    if !out.is_empty() {
        out.push_str(": ");
    }

    if style.tooltip {
        let stamp = |ts: &Option<DateTime<Utc>>| {
            ts.as_ref()
                .map_or_else(|| "unknown".to_owned(), |ts| format_timestamp(ts, locale))
        };
        out.push_str(&format!(
            "<a href=\"#\" data-toggle=\"tooltip\" title=\"Last updated {} &#10;Last changed {}\" \
             class=\"text-decoration-none text-reset\">",
            escape_html(&stamp(&attr.last_updated)),
            escape_html(&stamp(&attr.last_changed)),
        ));
    }

    out.push_str(&escape_html(&display_value(&attr.value)));
    if let Some(unit) = &attr.unit {
        out.push_str(&escape_html(unit));
    }

    if style.tooltip {
        out.push_str("</a>");
    }
    if style.linebreak {
        out.push_str("<br>");
    }
    out
}

fn ansi_color(code: &str) -> Option<&'static str> {
    Some(match code {
        "30" | "90" => "black",
        "31" | "91" => "red",
        "32" | "92" => "green",
        "33" | "93" => "yellow",
        "34" | "94" => "blue",
        "35" | "95" => "magenta",
        "36" | "96" => "cyan",
        "37" | "97" => "white",
        _ => return None,
    })
}

/// Convert ANSI colour escapes in a log line to HTML spans. The text itself
/// is escaped first; unknown SGR sequences are dropped and any span still
/// open at the end is closed.
pub fn ansi_to_html(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut open = 0usize;
    let mut rest = escaped.as_str();

    while let Some(start) = rest.find("\u{1b}[") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('m') else {
            // Unterminated sequence: keep the text, drop the escape byte.
            rest = after;
            continue;
        };
        let code = &after[..end];
        if code == "0" || code.is_empty() {
            if open > 0 {
                out.push_str("</span>");
                open -= 1;
            }
        } else if let Some(color) = ansi_color(code) {
            out.push_str(&format!("<span style=\"color:{color};\">"));
            open += 1;
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    for _ in 0..open {
        out.push_str("</span>");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn values_render_without_json_quoting() {
        assert_eq!(display_value(&Value::from("parked")), "parked");
        assert_eq!(display_value(&Value::from(42.5)), "42.5");
        assert_eq!(display_value(&Value::Bool(true)), "true");
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn attribute_with_unit_and_tooltip() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let attr = Attribute::new("range", 312).with_unit("km").updated_at(ts);
        let html = format_attribute(&attr, Locale::en_US, AttributeStyle::default());

        assert!(html.starts_with("range: <a href=\"#\""), "{html}");
        assert!(html.contains("312km</a>"), "{html}");
        assert!(html.contains("Last updated 06/15/2024"), "{html}");
        assert!(html.contains("Last changed unknown"), "{html}");
    }

    #[test]
    fn attribute_plain_style() {
        let attr = Attribute::new("<state>", "parked");
        let style = AttributeStyle {
            label: Some("State"),
            tooltip: false,
            linebreak: true,
        };
        assert_eq!(
            format_attribute(&attr, Locale::en_US, style),
            "State: parked<br>"
        );

        let unlabeled = AttributeStyle {
            label: Some(""),
            tooltip: false,
            linebreak: false,
        };
        assert_eq!(format_attribute(&attr, Locale::en_US, unlabeled), "parked");
    }

    #[test]
    fn attribute_name_is_escaped() {
        let attr = Attribute::new("<b>", 1);
        let style = AttributeStyle {
            tooltip: false,
            ..AttributeStyle::default()
        };
        assert_eq!(format_attribute(&attr, Locale::en_US, style), "&lt;b&gt;: 1");
    }

    #[test]
    fn disabled_attribute_is_hidden() {
        let attr = Attribute::new("odometer", 1000).disabled();
        assert!(format_attribute(&attr, Locale::en_US, AttributeStyle::default()).is_empty());
    }

    #[test]
    fn timestamps_follow_locale() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(format_timestamp(&ts, Locale::de_DE).contains("15.06.2024"));
        assert!(format_timestamp(&ts, Locale::en_US).contains("06/15/2024"));
    }

    #[test]
    fn ansi_colors_become_spans() {
        assert_eq!(
            ansi_to_html("\u{1b}[31mERROR\u{1b}[0m done"),
            "<span style=\"color:red;\">ERROR</span> done"
        );
        assert_eq!(
            ansi_to_html("\u{1b}[92mok"),
            "<span style=\"color:green;\">ok</span>"
        );
    }

    #[test]
    fn ansi_text_is_escaped_and_unknown_codes_dropped() {
        assert_eq!(
            ansi_to_html("\u{1b}[1m<b>\u{1b}[0m"),
            "&lt;b&gt;"
        );
    }
}
