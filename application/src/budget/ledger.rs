//! Cost ledger seam between the panel orchestrator and the budget guard.

use synod_domain::{CostUnits, ModelId};

/// Receives the actual cost of every finished invocation.
pub trait CostLedger: Send + Sync {
    fn commit(&self, model: &ModelId, units: CostUnits);
}

/// Discards every charge.
pub struct NoLedger;

impl CostLedger for NoLedger {
    fn commit(&self, _model: &ModelId, _units: CostUnits) {}
}
