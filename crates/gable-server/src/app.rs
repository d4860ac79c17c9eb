//! Process wiring: settings → components → runner.

use std::sync::Arc;

use anyhow::Context as _;
use gable_llm::provider::LlmProvider;
use gable_llm::{AnthropicConfig, AnthropicProvider};
use gable_notices::artifact::FsArtifactStore;
use gable_runtime::{EventBus, ToolExecutor, TurnConfig, TurnRunner};
use gable_store::Store;
use gable_tools::ToolRegistry;
use gable_tools::escalation::SetEscalationLevelTool;
use gable_tools::legal::IssueLegalNoticeTool;
use gable_tools::maintenance::CreateMaintenanceRequestTool;
use gable_tools::payments::QueryPaymentStatusTool;
use tracing::info;

use crate::settings::GableSettings;

/// Build the turn runner from settings: open the store, construct the
/// provider, register the four tools.
pub fn build_app(settings: &GableSettings) -> anyhow::Result<Arc<TurnRunner>> {
    let store = Store::open(&settings.database.path)
        .with_context(|| format!("opening store at {}", settings.database.path.display()))?;

    let api_key = std::env::var(&settings.llm.api_key_env)
        .with_context(|| format!("missing API key env var {}", settings.llm.api_key_env))?;
    let provider: Arc<dyn LlmProvider> = Arc::new(AnthropicProvider::new(AnthropicConfig {
        base_url: settings.llm.base_url.clone(),
        api_key,
        model: settings.llm.model.clone(),
    })?);

    let runner = build_runner(store, provider, settings);
    info!(model = %settings.llm.model, "agent runner ready");
    Ok(runner)
}

/// Assemble the runner over an already-open store and provider. Split out
/// so tests can inject a scripted provider and an in-memory store.
pub fn build_runner(
    store: Store,
    provider: Arc<dyn LlmProvider>,
    settings: &GableSettings,
) -> Arc<TurnRunner> {
    let artifacts = Arc::new(FsArtifactStore::new(settings.notices.artifact_dir.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(QueryPaymentStatusTool::new(store.clone())));
    registry.register(Arc::new(CreateMaintenanceRequestTool::new(store.clone())));
    registry.register(Arc::new(IssueLegalNoticeTool::new(store.clone(), artifacts)));
    registry.register(Arc::new(SetEscalationLevelTool::new(store.clone())));

    let events = EventBus::default();
    let executor = ToolExecutor::new(Arc::new(registry), store.clone(), events.clone());
    let config = TurnConfig {
        max_round_trips: settings.agent.max_round_trips,
        llm_timeout_secs: settings.agent.llm_timeout_secs,
        max_tokens: settings.agent.max_tokens,
    };
    Arc::new(TurnRunner::new(store, provider, executor, events, config))
}
