use chrono::{DateTime, Utc};

/// Discord renders `<t:…:R>` as "3 minutes ago" in the reader's locale.
pub fn format_relative(datetime: DateTime<Utc>) -> String {
    format!("<t:{}:R>", datetime.timestamp())
}

/// `<t:…:f>`, a full date and time in the reader's timezone.
pub fn format_full(datetime: DateTime<Utc>) -> String {
    format!("<t:{}:f>", datetime.timestamp())
}

/// Plain UTC date for fixed-width tables, where timestamp markup is not rendered.
pub fn format_date_utc(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%d %H:%M").to_string()
}
