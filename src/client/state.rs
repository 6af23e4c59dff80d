//! Per-screen fetch state and the shared date range / unit selection.

use super::http::ApiError;
use crate::domain::{DateRange, Unit};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading { previous: Option<T> },
    Success(T),
    Error { message: String, stale: Option<T> },
}

impl<T> FetchState<T> {
    /// The value a screen should render, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { previous } => previous.as_ref(),
            FetchState::Success(value) => Some(value),
            FetchState::Error { stale, .. } => stale.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    fn into_data(self) -> Option<T> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { previous } => previous,
            FetchState::Success(value) => Some(value),
            FetchState::Error { stale, .. } => stale,
        }
    }
}

/// What a screen shows after a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Keep the last good data next to the error.
    RetainStale,
    /// Drop the data and only show the error.
    Clear,
}

/// Sequence number of a request issued by a [`Screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

struct Slot<T> {
    state: FetchState<T>,
    latest: u64,
}

/// Fetch state of one screen. Only the response to the most recently
/// issued request is applied; older responses are dropped.
#[derive(Clone)]
pub struct Screen<T> {
    name: &'static str,
    policy: ErrorPolicy,
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T: Clone> Screen<T> {
    pub fn new(name: &'static str, policy: ErrorPolicy) -> Self {
        Self {
            name,
            policy,
            slot: Arc::new(Mutex::new(Slot {
                state: FetchState::Idle,
                latest: 0,
            })),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // The slot holds plain data, a panic mid-update cannot leave it torn.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> FetchState<T> {
        self.lock().state.clone()
    }

    pub fn begin(&self) -> Ticket {
        let mut slot = self.lock();
        slot.latest += 1;
        let previous = std::mem::replace(&mut slot.state, FetchState::Idle).into_data();
        slot.state = FetchState::Loading { previous };
        Ticket(slot.latest)
    }

    /// Apply a response. Returns false when a newer request was issued since.
    pub fn complete(&self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        let mut slot = self.lock();
        if ticket.0 != slot.latest {
            tracing::debug!(screen = self.name, ticket = ticket.0, "discarding stale response");
            return false;
        }
        slot.state = match result {
            Ok(value) => FetchState::Success(value),
            Err(err) => {
                warn!(screen = self.name, error = %err, "fetch failed");
                let previous = std::mem::replace(&mut slot.state, FetchState::Idle).into_data();
                FetchState::Error {
                    message: err.to_string(),
                    stale: match self.policy {
                        ErrorPolicy::RetainStale => previous,
                        ErrorPolicy::Clear => None,
                    },
                }
            }
        };
        true
    }

    pub async fn load<F>(&self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let ticket = self.begin();
        let result = fetch.await;
        self.complete(ticket, result)
    }
}

/// Date range and unit shared by every screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub range: DateRange,
    pub unit: Unit,
}

#[derive(Clone)]
pub struct DashboardContext {
    tx: Arc<watch::Sender<Selection>>,
}

impl DashboardContext {
    pub fn new(range: DateRange, unit: Unit) -> Self {
        let (tx, _rx) = watch::channel(Selection { range, unit });
        Self { tx: Arc::new(tx) }
    }

    pub fn selection(&self) -> Selection {
        self.tx.borrow().clone()
    }

    pub fn set_range(&self, range: DateRange) {
        self.tx.send_if_modified(|s| {
            let changed = s.range != range;
            s.range = range;
            changed
        });
    }

    pub fn set_unit(&self, unit: Unit) {
        self.tx.send_if_modified(|s| {
            let changed = s.unit != unit;
            s.unit = unit;
            changed
        });
    }

    /// Cycle kVAh -> kWh -> currency.
    pub fn toggle_unit(&self) -> Unit {
        let mut next = Unit::default();
        self.tx.send_modify(|s| {
            s.unit = s.unit.next();
            next = s.unit;
        });
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn range(day: u32) -> DateRange {
        let d = NaiveDate::from_ymd_opt(2025, 4, day).unwrap();
        DateRange::new(
            d.and_hms_opt(0, 0, 0).unwrap(),
            d.and_hms_opt(23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_success_flow() {
        let screen: Screen<i32> = Screen::new("test", ErrorPolicy::Clear);
        assert_eq!(screen.state(), FetchState::Idle);

        let ticket = screen.begin();
        assert!(screen.state().is_loading());
        assert!(screen.complete(ticket, Ok(5)));
        assert_eq!(screen.state(), FetchState::Success(5));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let screen: Screen<&str> = Screen::new("test", ErrorPolicy::Clear);
        let first = screen.begin();
        let second = screen.begin();

        assert!(screen.complete(second, Ok("new")));
        assert!(!screen.complete(first, Ok("old")));
        assert_eq!(screen.state(), FetchState::Success("new"));
    }

    #[test]
    fn test_error_policy_retain_stale() {
        let screen: Screen<i32> = Screen::new("test", ErrorPolicy::RetainStale);
        let t = screen.begin();
        screen.complete(t, Ok(1));

        let t = screen.begin();
        assert_eq!(screen.state(), FetchState::Loading { previous: Some(1) });
        screen.complete(t, Err(ApiError::Network("refused".into())));

        let state = screen.state();
        assert_eq!(state.data(), Some(&1));
        assert_eq!(state.error(), Some("Network error: refused"));
    }

    #[test]
    fn test_error_policy_clear() {
        let screen: Screen<i32> = Screen::new("test", ErrorPolicy::Clear);
        let t = screen.begin();
        screen.complete(t, Ok(1));

        let t = screen.begin();
        screen.complete(
            t,
            Err(ApiError::Http {
                status: 400,
                message: "bad".into(),
            }),
        );
        assert_eq!(
            screen.state(),
            FetchState::Error {
                message: "HTTP error 400: bad".into(),
                stale: None
            }
        );
    }

    #[tokio::test]
    async fn test_load_applies_result() {
        let screen: Screen<u8> = Screen::new("test", ErrorPolicy::Clear);
        assert!(screen.load(async { Ok(7) }).await);
        assert_eq!(screen.state().data(), Some(&7));
    }

    #[tokio::test]
    async fn test_context_notifies_subscribers() {
        let ctx = DashboardContext::new(range(1), Unit::Kvah);
        let mut rx = ctx.subscribe();

        ctx.set_range(range(2));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().range, range(2));

        // Setting the same value is not a change.
        ctx.set_range(range(2));
        assert!(!rx.has_changed().unwrap());

        assert_eq!(ctx.toggle_unit(), Unit::Kwh);
        assert_eq!(ctx.toggle_unit(), Unit::Currency);
        assert_eq!(ctx.toggle_unit(), Unit::Kvah);
        assert_eq!(ctx.selection().unit, Unit::Kvah);
    }
}
