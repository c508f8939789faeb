//! Scripted provider and helpers shared by the use case tests.

use crate::budget::CostLedger;
use crate::ports::provider::{ErrorKind, InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use synod_domain::prompt::SYNTHESIS_SYSTEM;
use synod_domain::{
    CapabilityScores, CostClass, CostUnits, ModelDefinition, ModelId, ModelRegistry,
    ProviderFamily,
};

/// Registry of cheap, equally scored local models. Priority and synthesizer
/// choice both fall back to id order.
pub(crate) fn registry(ids: &[&str]) -> ModelRegistry {
    ModelRegistry::new(ids.iter().map(|id| {
        ModelDefinition::new(
            *id,
            ProviderFamily::Local,
            CapabilityScores::new(8.0, 8.0, 8.0, 8.0, 8.0),
            CostClass::Cheap,
        )
    }))
    .unwrap()
}

#[derive(Debug, Clone)]
enum Behaviour {
    Reply(String),
    Fail(ErrorKind, String),
    Hang,
}

#[derive(Debug, Clone)]
pub(crate) struct Script {
    behaviour: Behaviour,
    delay: Duration,
    cost: CostUnits,
    billed: CostUnits,
    fail_first: usize,
    succeed_times: Option<usize>,
}

impl Script {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            delay: Duration::ZERO,
            cost: 1,
            billed: 0,
            fail_first: 0,
            succeed_times: None,
        }
    }

    pub fn reply(text: &str) -> Self {
        Self::with(Behaviour::Reply(text.to_string()))
    }

    pub fn fail_permanent(message: &str) -> Self {
        Self::with(Behaviour::Fail(ErrorKind::Permanent, message.to_string()))
    }

    pub fn fail_transient(message: &str) -> Self {
        Self::with(Behaviour::Fail(ErrorKind::Transient, message.to_string()))
    }

    pub fn hang() -> Self {
        Self::with(Behaviour::Hang)
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn billed(mut self, units: CostUnits) -> Self {
        self.billed = units;
        self
    }

    /// The first `n` calls fail with a transient error.
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    /// Succeed for the first `n` calls, then fail permanently.
    pub fn only_times(mut self, n: usize) -> Self {
        self.succeed_times = Some(n);
        self
    }
}

/// A provider whose per-model behaviour is scripted. Synthesizer prompts
/// use the synthesis script when one is set.
pub(crate) struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    synthesis: Option<Script>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            synthesis: None,
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    pub fn script(mut self, model: &str, script: Script) -> Self {
        self.scripts.insert(model.to_string(), script);
        self
    }

    pub fn with_synthesis(mut self, script: Script) -> Self {
        self.synthesis = Some(script);
        self
    }

    pub fn calls_for(&self, model: &str) -> usize {
        self.calls.lock().unwrap().get(model).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, ProviderError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(request.model.to_string()).or_insert(0);
            *n += 1;
            *n
        };

        let script = if request.prompt.system == SYNTHESIS_SYSTEM && self.synthesis.is_some() {
            self.synthesis.clone()
        } else {
            self.scripts.get(request.model.as_str()).cloned()
        };
        let Some(script) = script else {
            return Err(ProviderError::permanent("unscripted model"));
        };

        tokio::time::sleep(script.delay).await;

        if call <= script.fail_first {
            return Err(ProviderError::transient("scripted transient failure"));
        }
        if let Some(times) = script.succeed_times
            && call > times
        {
            return Err(ProviderError::permanent("scripted exhaustion"));
        }

        match script.behaviour {
            Behaviour::Reply(text) => Ok(InvokeOutput::new(text, script.cost)),
            Behaviour::Fail(kind, message) => Err(ProviderError {
                kind,
                message,
                billed_units: script.billed,
            }),
            Behaviour::Hang => {
                std::future::pending::<()>().await;
                Err(ProviderError::transient("unreachable"))
            }
        }
    }
}

/// Ledger that remembers every charge.
#[derive(Default)]
pub(crate) struct RecordingLedger {
    charges: Mutex<Vec<(ModelId, CostUnits)>>,
}

impl RecordingLedger {
    pub fn total(&self) -> CostUnits {
        self.charges.lock().unwrap().iter().map(|(_, u)| u).sum()
    }
}

impl CostLedger for RecordingLedger {
    fn commit(&self, model: &ModelId, units: CostUnits) {
        self.charges.lock().unwrap().push((model.clone(), units));
    }
}
