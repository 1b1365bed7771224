/// Page numbering for the remote feed
///
/// Pages are numbered from 1 and advance by exactly one per crawl cycle.
use std::fmt;
use std::num::NonZeroU64;

/// Identifies one page of the remote feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU64);

impl PageNumber {
    /// The first page of the feed
    pub const FIRST: PageNumber = PageNumber(NonZeroU64::MIN);

    /// Creates a page number, or `None` for page 0
    pub const fn new(value: u64) -> Option<Self> {
        match NonZeroU64::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the raw page number
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    /// Returns the following page, or `None` if the counter would overflow
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
