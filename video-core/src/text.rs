use chrono::{DateTime, Local, Locale, TimeZone};

// Applied in order, `&amp;` first: `&amp;lt;` ends up as `<`.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
];

/// Decodes the handful of HTML entities the search API puts in titles.
///
/// Unknown entities are left as they are.
pub fn decode_entities(input: &str) -> String {
    ENTITIES
        .iter()
        .fold(input.to_owned(), |text, (entity, replacement)| {
            text.replace(entity, replacement)
        })
}

/// Long French date with a capitalised month, e.g. `5 Janvier 2024`, in local time.
pub fn format_published_date(published_at: &str) -> Option<String> {
    format_published_date_in(published_at, &Local)
}

pub fn format_published_date_in<Tz: TimeZone>(published_at: &str, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let date = DateTime::parse_from_rfc3339(published_at)
        .ok()?
        .with_timezone(tz);
    let raw = date.format_localized("%-d %B %Y", Locale::fr_FR).to_string();
    Some(capitalize_month(&raw))
}

fn capitalize_month(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut done = false;
    let mut prev_space = false;
    for ch in raw.chars() {
        if !done && prev_space && ch.is_lowercase() {
            out.extend(ch.to_uppercase());
            done = true;
        } else {
            out.push(ch);
        }
        prev_space = ch == ' ';
    }
    out
}

pub fn accessibility_label(index: usize, title: &str, date: &str) -> String {
    format!("Video {}: {}. Published on {}", index + 1, title, date)
}
