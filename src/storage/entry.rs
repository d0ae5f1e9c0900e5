//! Wrapped entries and expiry resolution.

use std::time::Instant;

use super::StoreOptions;

/// Value that carries its own absolute deadline.
///
/// When a store is built with [`StoreOptions::deadline_from_value`], the
/// returned instant is used verbatim and the store TTL is ignored.
pub trait ExpiresAt {
    fn expires_at(&self) -> Option<Instant>;
}

/// Value that carries the instant its lifetime is measured from.
///
/// Expiry becomes `reference_time + ttl`.
pub trait ReferenceTime {
    fn reference_time(&self) -> Option<Instant>;
}

/// Entry in the store with value and expiration
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub(crate) value: V,
    /// `None` when the deadline overflows the clock, i.e. never expires.
    pub(crate) expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// Wrap `value`, resolving its deadline once against `now`.
    pub(crate) fn wrap(value: V, options: &StoreOptions<V>, now: Instant) -> Self {
        let expires_at = resolve_expiry(&value, options, now);
        Self { value, expires_at }
    }

    /// Expired once `now` reaches the deadline.
    #[inline]
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.map(|t| now >= t).unwrap_or(false)
    }

    #[inline]
    pub(crate) fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Deadline precedence: value deadline, then value reference time plus TTL,
/// then insertion time plus TTL.
pub(crate) fn resolve_expiry<V>(
    value: &V,
    options: &StoreOptions<V>,
    now: Instant,
) -> Option<Instant> {
    if let Some(deadline) = options.deadline.as_ref().and_then(|hook| hook(value)) {
        return Some(deadline);
    }

    let base = options
        .reference_time
        .as_ref()
        .and_then(|hook| hook(value))
        .unwrap_or(now);
    base.checked_add(options.ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Ticket {
        deadline: Option<Instant>,
        issued: Option<Instant>,
    }

    impl ExpiresAt for Ticket {
        fn expires_at(&self) -> Option<Instant> {
            self.deadline
        }
    }

    impl ReferenceTime for Ticket {
        fn reference_time(&self) -> Option<Instant> {
            self.issued
        }
    }

    fn options() -> StoreOptions<Ticket> {
        StoreOptions::new()
            .with_ttl(Duration::from_secs(10))
            .deadline_from_value()
            .reference_from_value()
    }

    #[test]
    fn test_insertion_time_fallback() {
        let now = Instant::now();
        let ticket = Ticket {
            deadline: None,
            issued: None,
        };
        let entry = Entry::wrap(ticket, &options(), now);
        assert_eq!(entry.expires_at, Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_reference_time_plus_ttl() {
        let now = Instant::now();
        let issued = now - Duration::from_secs(4);
        let ticket = Ticket {
            deadline: None,
            issued: Some(issued),
        };
        let entry = Entry::wrap(ticket, &options(), now);
        assert_eq!(entry.expires_at, Some(issued + Duration::from_secs(10)));
    }

    #[test]
    fn test_deadline_wins() {
        let now = Instant::now();
        let deadline = now + Duration::from_millis(5);
        let ticket = Ticket {
            deadline: Some(deadline),
            issued: Some(now),
        };
        let entry = Entry::wrap(ticket, &options(), now);
        assert_eq!(entry.expires_at, Some(deadline));
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(deadline));
    }

    #[test]
    fn test_hooks_ignored_without_options() {
        let now = Instant::now();
        let ticket = Ticket {
            deadline: Some(now),
            issued: None,
        };
        let plain = StoreOptions::new().with_ttl(Duration::from_secs(1));
        let entry = Entry::wrap(ticket, &plain, now);
        assert_eq!(entry.expires_at, Some(now + Duration::from_secs(1)));
    }
}
