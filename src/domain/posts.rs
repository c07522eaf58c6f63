use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::domain::entities::PostRecord;

/// Number of characters used when a post is shown as a one-line label.
pub const PREVIEW_LENGTH: usize = 15;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[day padding:none] [month repr:long] [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month padding:zero]-[day padding:zero]");

/// Short label for a post: its first [`PREVIEW_LENGTH`] characters.
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_LENGTH).collect()
}

impl PostRecord {
    pub fn preview(&self) -> String {
        preview(&self.text)
    }

    pub fn is_authored_by(&self, author_id: i64) -> bool {
        self.author_id == author_id
    }
}

/// Normalize submitted post or comment text; `None` when nothing but whitespace remains.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn format_human_date(value: OffsetDateTime) -> String {
    value
        .format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| value.date().to_string())
}

pub fn format_iso_date(value: OffsetDateTime) -> String {
    value
        .format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| value.date().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn preview_counts_characters_not_bytes() {
        assert_eq!(preview("Тестовый пост для проверки"), "Тестовый пост д");
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn normalize_text_rejects_blank_input() {
        assert_eq!(normalize_text("   \n\t"), None);
        assert_eq!(normalize_text("  hello "), Some("hello".to_string()));
    }

    #[test]
    fn formats_dates_for_cards() {
        let value = datetime!(2024-03-07 10:00 UTC);
        assert_eq!(format_human_date(value), "7 March 2024");
        assert_eq!(format_iso_date(value), "2024-03-07");
    }
}
