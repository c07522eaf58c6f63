//! Page-number pagination shared by every feed.
//!
//! Page numbers are 1-based. Requests never fail: a missing or malformed
//! number selects the first page and an out-of-range number is clamped to the
//! nearest existing page.

use std::num::{IntErrorKind, NonZeroU32};

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(value) => value,
    None => unreachable!(),
};

/// A requested page number as received from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageNumber(i64);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    /// Interpret the raw `page` query value; anything but an integer means page 1.
    ///
    /// Integers too large for `i64` saturate so they still clamp to the last page.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(value) = raw else {
            return Self::FIRST;
        };
        match value.trim().parse::<i64>() {
            Ok(number) => Self(number),
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => Self(i64::MAX),
            Err(_) => Self::FIRST,
        }
    }

    /// The first `page` parameter of a raw query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let raw = query.and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, _)| name == "page")
                .map(|(_, value)| value.into_owned())
        });
        Self::parse(raw.as_deref())
    }

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Resolved position of one page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub per_page: u32,
    pub num_pages: u32,
    pub total: u64,
}

impl PageWindow {
    /// Clamp `requested` into `1..=num_pages` for `total` rows.
    pub fn resolve(total: u64, per_page: NonZeroU32, requested: PageNumber) -> Self {
        let per_page = per_page.get();
        let num_pages = num_pages(total, per_page);
        let number = requested.get().clamp(1, i64::from(num_pages)) as u32;

        Self {
            number,
            per_page,
            num_pages,
            total,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    /// Number of rows this page holds once fetched.
    pub fn expected_len(&self) -> u64 {
        self.total
            .saturating_sub(self.offset())
            .min(u64::from(self.per_page))
    }
}

fn num_pages(total: u64, per_page: u32) -> u32 {
    let pages = total.div_ceil(u64::from(per_page)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of items together with its window.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }
}
