//! Target addresses

use std::fmt;

/// One destination the operation is run against.
///
/// The address is opaque to the dispatch core; only the operation knows how
/// to interpret it (a hostname for `impala-shell -i`, for example).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    address: String,
}

impl Target {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl From<&str> for Target {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Target {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}
