// Repository Layer
// Create/read/update/delete per entity over a rusqlite Connection
//
// Every write runs in its own transaction and commits before returning.
// Dropping an uncommitted transaction rolls it back, so an early `?` or a
// failed commit leaves the store untouched.

pub mod bank_accounts;
pub mod banks;
pub mod companies;

/// Page window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub fn new(skip: u32, limit: u32) -> Self {
        Page { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
