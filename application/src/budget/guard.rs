//! Budget guard: per-requester cost and concurrency ceilings.
//!
//! Each requester has an [`Account`] behind its own mutex, so admitting one
//! requester never waits on another. The outer map lock is held only long
//! enough to find or create the account.

use super::ledger::CostLedger;
use crate::ports::collaborators::BillingPort;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use synod_domain::{CostUnits, DenialReason, Mode, ModelId, RequesterId};
use tokio::time::Instant;
use tracing::{debug, info};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Account {
    /// Committed charges inside the rolling window, oldest first
    charges: VecDeque<(Instant, CostUnits)>,
    /// Estimated cost of admitted requests not yet committed
    reserved: CostUnits,
    in_flight: usize,
}

impl Account {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some((at, _)) = self.charges.front() {
            if now.saturating_duration_since(*at) >= window {
                self.charges.pop_front();
            } else {
                break;
            }
        }
    }

    fn spent(&self) -> CostUnits {
        self.charges.iter().map(|(_, units)| units).sum()
    }
}

/// Snapshot of a requester's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub spent: CostUnits,
    pub reserved: CostUnits,
    pub in_flight: usize,
}

pub struct BudgetGuard {
    billing: Arc<dyn BillingPort>,
    window: Duration,
    max_concurrent: usize,
    accounts: Mutex<HashMap<RequesterId, Arc<Mutex<Account>>>>,
}

impl BudgetGuard {
    pub fn new(billing: Arc<dyn BillingPort>) -> Self {
        Self {
            billing,
            window: Duration::from_secs(3600),
            max_concurrent: 4,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    fn account(&self, requester: &RequesterId) -> Arc<Mutex<Account>> {
        let mut accounts = lock(&self.accounts);
        Arc::clone(accounts.entry(requester.clone()).or_default())
    }

    /// Admission check, called before any provider is invoked.
    ///
    /// Checks in order: the tier permits `mode`, the estimate fits the
    /// request's own ceiling, the requester is under the concurrency limit,
    /// and the rolling window has room for the estimate. On success the
    /// estimate is reserved until the returned [`Admission`] is dropped.
    pub async fn admit(
        &self,
        requester: &RequesterId,
        mode: Mode,
        estimated: CostUnits,
        request_ceiling: CostUnits,
    ) -> Result<Admission, DenialReason> {
        if !self.billing.check_mode_permitted(requester, mode).await {
            info!(requester = %requester, mode = %mode, "denied: mode not permitted");
            return Err(DenialReason::ModeNotPermitted);
        }
        if estimated > request_ceiling {
            info!(requester = %requester, estimated, request_ceiling, "denied: over request ceiling");
            return Err(DenialReason::OverBudget);
        }
        let ceiling = self.billing.get_budget_ceiling(requester).await;

        let account = self.account(requester);
        {
            let mut acc = lock(&account);
            acc.prune(Instant::now(), self.window);

            if acc.in_flight >= self.max_concurrent {
                info!(requester = %requester, in_flight = acc.in_flight, "denied: rate limited");
                return Err(DenialReason::RateLimited);
            }
            let committed = acc.spent() + acc.reserved;
            if committed + estimated > ceiling {
                info!(
                    requester = %requester,
                    committed,
                    estimated,
                    ceiling,
                    "denied: over budget"
                );
                return Err(DenialReason::OverBudget);
            }

            acc.in_flight += 1;
            acc.reserved += estimated;
        }

        debug!(requester = %requester, estimated, "admitted");
        Ok(Admission {
            requester: requester.clone(),
            account,
            remaining: Mutex::new(estimated),
            spent: Mutex::new(0),
        })
    }

    pub fn usage(&self, requester: &RequesterId) -> Usage {
        let account = self.account(requester);
        let mut acc = lock(&account);
        acc.prune(Instant::now(), self.window);
        Usage {
            spent: acc.spent(),
            reserved: acc.reserved,
            in_flight: acc.in_flight,
        }
    }
}

/// An admitted request. Commits reconcile the reservation against actual
/// cost; dropping it frees the concurrency slot and whatever reservation
/// is left.
pub struct Admission {
    requester: RequesterId,
    account: Arc<Mutex<Account>>,
    remaining: Mutex<CostUnits>,
    spent: Mutex<CostUnits>,
}

impl Admission {
    /// Units committed through this admission so far.
    pub fn spent(&self) -> CostUnits {
        *lock(&self.spent)
    }
}

impl CostLedger for Admission {
    fn commit(&self, model: &ModelId, units: CostUnits) {
        let mut acc = lock(&self.account);
        acc.charges.push_back((Instant::now(), units));

        let mut remaining = lock(&self.remaining);
        let released = (*remaining).min(units);
        *remaining -= released;
        acc.reserved = acc.reserved.saturating_sub(released);

        *lock(&self.spent) += units;
        debug!(requester = %self.requester, model = %model, units, "cost committed");
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        let remaining = *lock(&self.remaining);
        let mut acc = lock(&self.account);
        acc.in_flight = acc.in_flight.saturating_sub(1);
        acc.reserved = acc.reserved.saturating_sub(remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::collaborators::StaticBilling;

    fn guard(ceiling: CostUnits) -> BudgetGuard {
        BudgetGuard::new(Arc::new(StaticBilling::new(ceiling)))
    }

    fn alice() -> RequesterId {
        RequesterId::new("alice")
    }

    #[tokio::test]
    async fn test_admit_reserves_and_drop_releases() {
        let guard = guard(100);
        let admission = guard.admit(&alice(), Mode::Quick, 30, 100).await.unwrap();
        assert_eq!(
            guard.usage(&alice()),
            Usage {
                spent: 0,
                reserved: 30,
                in_flight: 1
            }
        );

        admission.commit(&ModelId::new("m"), 10);
        assert_eq!(guard.usage(&alice()).reserved, 20);
        assert_eq!(admission.spent(), 10);

        drop(admission);
        assert_eq!(
            guard.usage(&alice()),
            Usage {
                spent: 10,
                reserved: 0,
                in_flight: 0
            }
        );
    }

    #[tokio::test]
    async fn test_over_budget_when_window_is_spent() {
        let guard = guard(50);
        let admission = guard.admit(&alice(), Mode::Quick, 40, 100).await.unwrap();
        admission.commit(&ModelId::new("m"), 45);
        drop(admission);

        let denied = guard.admit(&alice(), Mode::Quick, 10, 100).await;
        assert_eq!(denied.err(), Some(DenialReason::OverBudget));

        // other requesters are unaffected
        assert!(
            guard
                .admit(&RequesterId::new("bob"), Mode::Quick, 10, 100)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_estimate_over_request_ceiling() {
        let guard = guard(1000);
        let denied = guard.admit(&alice(), Mode::Council, 30, 20).await;
        assert_eq!(denied.err(), Some(DenialReason::OverBudget));
    }

    #[tokio::test]
    async fn test_mode_not_permitted() {
        let billing = StaticBilling::new(100).with_permitted_modes([Mode::Quick]);
        let guard = BudgetGuard::new(Arc::new(billing));
        let denied = guard.admit(&alice(), Mode::Tribunal, 1, 100).await;
        assert_eq!(denied.err(), Some(DenialReason::ModeNotPermitted));
    }

    #[tokio::test]
    async fn test_rate_limited_by_concurrency() {
        let guard = guard(1000).with_max_concurrent(2);
        let _a = guard.admit(&alice(), Mode::Quick, 1, 100).await.unwrap();
        let b = guard.admit(&alice(), Mode::Quick, 1, 100).await.unwrap();
        let denied = guard.admit(&alice(), Mode::Quick, 1, 100).await;
        assert_eq!(denied.err(), Some(DenialReason::RateLimited));

        drop(b);
        assert!(guard.admit(&alice(), Mode::Quick, 1, 100).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rolling_window_expires_charges() {
        let guard = guard(50).with_window(Duration::from_secs(60));
        let admission = guard.admit(&alice(), Mode::Quick, 50, 100).await.unwrap();
        admission.commit(&ModelId::new("m"), 50);
        drop(admission);
        assert!(guard.admit(&alice(), Mode::Quick, 1, 100).await.is_err());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(guard.admit(&alice(), Mode::Quick, 1, 100).await.is_ok());
    }
}
