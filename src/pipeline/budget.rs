/// How many new filings a source may still process in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Unlimited,
    AtMost(usize),
}

impl Quota {
    /// Operator limit where anything `<= 0` means unlimited.
    pub fn from_limit(limit: i64) -> Self {
        if limit <= 0 {
            Quota::Unlimited
        } else {
            Quota::AtMost(limit as usize)
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Quota::AtMost(0))
    }

    /// The `limit` argument understood by `filter_new` (0 = unlimited).
    /// Callers must check `is_exhausted` first.
    pub fn as_filter_limit(&self) -> usize {
        match self {
            Quota::Unlimited => 0,
            Quota::AtMost(n) => *n,
        }
    }
}

/// Quota left for the second source once the first has run.
///
/// A disabled first source leaves the full limit. When it ran, its count of
/// new filings is deducted and the remainder never goes below zero; an
/// exhausted remainder stays exhausted.
pub fn remaining_quota(overall: Quota, first_source_count: usize, first_source_ran: bool) -> Quota {
    match overall {
        Quota::Unlimited => Quota::Unlimited,
        Quota::AtMost(limit) if !first_source_ran => Quota::AtMost(limit),
        Quota::AtMost(limit) => Quota::AtMost(limit.saturating_sub(first_source_count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_limit() {
        assert_eq!(Quota::from_limit(0), Quota::Unlimited);
        assert_eq!(Quota::from_limit(-3), Quota::Unlimited);
        assert_eq!(Quota::from_limit(10), Quota::AtMost(10));
    }

    #[test]
    fn test_budget_conservation() {
        let overall = Quota::AtMost(10);
        assert_eq!(remaining_quota(overall, 4, true), Quota::AtMost(6));
        assert_eq!(remaining_quota(overall, 4, false), Quota::AtMost(10));
        assert_eq!(remaining_quota(overall, 0, true), Quota::AtMost(10));
    }

    #[test]
    fn test_exhausted_budget_stays_exhausted() {
        let remaining = remaining_quota(Quota::AtMost(3), 5, true);
        assert_eq!(remaining, Quota::AtMost(0));
        assert!(remaining.is_exhausted());
    }

    #[test]
    fn test_unlimited_passes_through() {
        assert_eq!(remaining_quota(Quota::Unlimited, 50, true), Quota::Unlimited);
        assert_eq!(Quota::Unlimited.as_filter_limit(), 0);
    }
}
