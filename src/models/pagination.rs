/// Page size used when a request does not specify one.
pub const DEFAULT_LIMIT: u32 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Missing or zero values fall back to page 1 and `DEFAULT_LIMIT`.
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Like `from_query`, but from raw query-string values. Anything that is not a
    /// non-negative integer is treated as missing.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let number = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<u32>().ok());
        Self::from_query(number(page), number(limit))
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page.max(1)) - 1).saturating_mul(i64::from(self.limit))
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}
