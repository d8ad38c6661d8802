//! Offset paging for list endpoints.

use std::fmt;

/// Items returned per page.
pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeOffset;

impl fmt::Display for NegativeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset must not be negative")
    }
}

impl std::error::Error for NegativeOffset {}

/// Number of items to skip, never negative.
///
/// # Examples
/// ```
/// use blog_backend::domain::Offset;
///
/// assert_eq!(Offset::new(20).unwrap().get(), 20);
/// assert!(Offset::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Offset(i64);

impl Offset {
    pub const ZERO: Self = Self(0);

    pub fn new(value: i64) -> Result<Self, NegativeOffset> {
        if value < 0 {
            return Err(NegativeOffset);
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: Offset,
    pub page_size: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, offset: Offset, page_size: i64, total: i64) -> Self {
        Self {
            items,
            offset,
            page_size,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            page_size: self.page_size,
            total: self.total,
        }
    }

    /// Whether more items follow this page.
    pub fn has_more(&self) -> bool {
        self.offset.get().saturating_add(self.page_size) < self.total
    }
}
