//! Request budget for rate-limited providers.
//!
//! The public BLS v1 API allows 25 queries per day without a key. The budget
//! is an explicit session object owned by the extractor: every outgoing
//! request must first be acquired from it, and once it is spent no further
//! requests are issued.

use serde::Serialize;

use super::provider::DataError;

/// Daily request cap of the unregistered BLS API.
pub const DEFAULT_MAX_REQUESTS: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestBudget {
    max_requests: u32,
    used: u32,
}

impl RequestBudget {
    pub fn new(max_requests: u32) -> Self {
        Self {
            max_requests,
            used: 0,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max_requests.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Claim one request. Fails without side effects once the cap is hit.
    pub fn try_acquire(&mut self) -> Result<(), DataError> {
        if self.is_exhausted() {
            return Err(DataError::LimitReached {
                used: self.used,
                max: self.max_requests,
            });
        }
        self.used += 1;
        Ok(())
    }
}

impl Default for RequestBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full() {
        let b = RequestBudget::default();
        assert_eq!(b.remaining(), 25);
        assert_eq!(b.used(), 0);
    }

    #[test]
    fn exhausts_at_cap() {
        let mut b = RequestBudget::new(2);
        b.try_acquire().unwrap();
        b.try_acquire().unwrap();
        assert!(b.is_exhausted());
        let err = b.try_acquire().unwrap_err();
        assert!(matches!(err, DataError::LimitReached { used: 2, max: 2 }));
        assert_eq!(b.used(), 2); // failed acquire does not count
    }

    #[test]
    fn zero_budget_refuses_immediately() {
        let mut b = RequestBudget::new(0);
        assert!(b.try_acquire().is_err());
    }
}
