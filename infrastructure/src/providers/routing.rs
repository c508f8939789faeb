use super::anthropic::AnthropicAdapter;
use super::local::LocalAdapter;
use super::openai::OpenAiCompatibleAdapter;
use crate::config::FileProvidersConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use synod_application::{InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError};
use synod_domain::ProviderFamily;
use tracing::{debug, info};

/// Dispatches each call to the adapter registered for the model's family.
///
/// Routing is by [`ProviderFamily`] only; a model whose family has no
/// adapter fails permanently so the panel records it and moves on.
#[derive(Default, Clone)]
pub struct RoutingProvider {
    adapters: BTreeMap<ProviderFamily, Arc<dyn ProviderAdapter>>,
}

impl RoutingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(
        mut self,
        family: ProviderFamily,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Self {
        self.adapters.insert(family, adapter);
        self
    }

    /// Every family answered in-process. No network access.
    pub fn offline() -> Self {
        let local: Arc<dyn ProviderAdapter> = Arc::new(LocalAdapter::new());
        [
            ProviderFamily::Anthropic,
            ProviderFamily::OpenAi,
            ProviderFamily::Google,
            ProviderFamily::Local,
        ]
        .into_iter()
        .fold(Self::new(), |routing, family| {
            routing.with_adapter(family, local.clone())
        })
    }

    /// HTTP adapters for every family with an API key, plus the local one.
    pub fn from_config(config: &FileProvidersConfig) -> Self {
        let client = Client::new();
        let mut routing =
            Self::new().with_adapter(ProviderFamily::Local, Arc::new(LocalAdapter::new()));

        if let Some(key) = config.anthropic.api_key() {
            let adapter = AnthropicAdapter::new(client.clone(), key)
                .with_base_url(config.anthropic.base_url.clone())
                .with_api_version(config.anthropic.api_version.clone());
            routing = routing.with_adapter(ProviderFamily::Anthropic, Arc::new(adapter));
        }

        if let Some(key) = config.openai.api_key() {
            let adapter = OpenAiCompatibleAdapter::new(
                "openai",
                client.clone(),
                key,
                config.openai.base_url.clone(),
            );
            routing = routing.with_adapter(ProviderFamily::OpenAi, Arc::new(adapter));
        }

        if let Some(key) = config.google.api_key() {
            let adapter =
                OpenAiCompatibleAdapter::new("google", client, key, config.google.base_url.clone());
            routing = routing.with_adapter(ProviderFamily::Google, Arc::new(adapter));
        }

        info!(families = ?routing.families(), "provider routing ready");
        routing
    }

    pub fn families(&self) -> Vec<ProviderFamily> {
        self.adapters.keys().copied().collect()
    }

    pub fn supports(&self, family: ProviderFamily) -> bool {
        self.adapters.contains_key(&family)
    }
}

#[async_trait]
impl ProviderAdapter for RoutingProvider {
    fn name(&self) -> &str {
        "routing"
    }

    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, ProviderError> {
        let Some(adapter) = self.adapters.get(&request.family) else {
            return Err(ProviderError::permanent(format!(
                "no provider configured for family {}",
                request.family
            )));
        };
        debug!(model = %request.model, provider = adapter.name(), "routing call");
        adapter.invoke(request).await
    }
}
