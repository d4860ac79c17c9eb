//! The turn runner: one inbound message in, one reply out.
//!
//! Same-lease turns are serialized through a per-lease async mutex, so the
//! agent never reasons over a snapshot another in-flight turn is mutating.
//! The tool loop is bounded, the generative round-trip is bounded, and a
//! reply is always produced; on any failure the tenant gets a generic
//! retry message rather than silence or a half-truth about actions taken.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use gable_core::errors::CoreError;
use gable_core::events::{BaseEvent, GableEvent};
use gable_core::snapshot::TenancyContext;
use gable_core::ids::LeaseId;
use gable_llm::protocol::{ChatMessage, ChatRequest, ContentBlock, Role};
use gable_llm::provider::LlmProvider;
use gable_store::Store;
use gable_store::repositories::conversation::{ConversationRepo, MessageRepo};
use gable_store::repositories::tenancy::TenantRepo;
use gable_tools::ToolContext;
use metrics::{counter, histogram};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

use crate::aggregator;
use crate::compiler;
use crate::errors::RuntimeError;
use crate::events::EventBus;
use crate::executor::ToolExecutor;

/// Reply sent when the turn cannot complete. Deliberately claims nothing.
const RETRY_REPLY: &str =
    "Sorry, I wasn't able to deal with your message just now. Please send it again in a few minutes.";

/// Upper bound on the rolling conversation summary, in characters.
const SUMMARY_LIMIT: usize = 2000;

/// Turn bounds.
#[derive(Clone, Copy, Debug)]
pub struct TurnConfig {
    /// Maximum generative round-trips per turn.
    pub max_round_trips: usize,
    /// Per-round-trip timeout in seconds.
    pub llm_timeout_secs: u64,
    /// Output token cap per round-trip.
    pub max_tokens: u32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_round_trips: 4,
            llm_timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

/// What a turn produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The reply to send back to the tenant.
    pub reply: String,
    /// Tool calls executed during the turn.
    pub tool_calls: usize,
    /// Whether this was a redelivery answered from the stored reply.
    pub duplicate: bool,
}

/// Runs turns. One instance serves all tenancies; per-lease locking keeps
/// concurrent webhook deliveries for the same tenancy sequential.
pub struct TurnRunner {
    store: Store,
    provider: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    events: EventBus,
    locks: DashMap<String, Arc<Mutex<()>>>,
    config: TurnConfig,
}

impl TurnRunner {
    /// Build a runner.
    pub fn new(
        store: Store,
        provider: Arc<dyn LlmProvider>,
        executor: ToolExecutor,
        events: EventBus,
        config: TurnConfig,
    ) -> Self {
        Self {
            store,
            provider,
            executor,
            events,
            locks: DashMap::new(),
            config,
        }
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GableEvent> {
        self.events.subscribe()
    }

    /// Run one turn for an inbound message.
    #[instrument(skip(self, body))]
    pub async fn handle_message(
        &self,
        from: &str,
        body: &str,
        provider_message_id: &str,
    ) -> Result<TurnOutcome, RuntimeError> {
        // Redelivery fast path, before any locking.
        if let Some(reply) = self.stored_reply(provider_message_id)? {
            counter!("gable_turns_total", "outcome" => "duplicate").increment(1);
            return Ok(TurnOutcome {
                reply,
                tool_calls: 0,
                duplicate: true,
            });
        }

        let lease_id = self.resolve_lease(from)?;
        let lock = self
            .locks
            .entry(lease_id.as_str().to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check under the lock: a racing delivery may have completed the
        // turn while this one waited.
        {
            let conn = self.store.conn()?;
            if !MessageRepo::insert_inbound(&conn, &lease_id, provider_message_id, body)? {
                let reply = MessageRepo::reply_for(&conn, provider_message_id)?
                    .unwrap_or_else(|| RETRY_REPLY.to_owned());
                counter!("gable_turns_total", "outcome" => "duplicate").increment(1);
                return Ok(TurnOutcome {
                    reply,
                    tool_calls: 0,
                    duplicate: true,
                });
            }
        }

        let started = Instant::now();
        self.events.emit(GableEvent::TurnStarted {
            base: BaseEvent::now(lease_id.as_str()),
            provider_message_id: provider_message_id.to_owned(),
        });

        let snapshot = Arc::new(aggregator::aggregate(&self.store, from)?);
        let outcome = self
            .run_tool_loop(&snapshot, body, provider_message_id)
            .await?;
        self.persist_reply(&lease_id, provider_message_id, &snapshot.summary, body, &outcome.reply)?;

        histogram!("gable_turn_duration_ms").record(started.elapsed().as_millis() as f64);
        info!(
            lease_id = %lease_id,
            tool_calls = outcome.tool_calls,
            duration_ms = started.elapsed().as_millis() as u64,
            "turn finished"
        );
        Ok(outcome)
    }

    /// The bounded generative exchange. Any failure inside degrades to the
    /// generic retry reply; only store errors propagate.
    async fn run_tool_loop(
        &self,
        snapshot: &Arc<TenancyContext>,
        body: &str,
        provider_message_id: &str,
    ) -> Result<TurnOutcome, RuntimeError> {
        let lease_id = snapshot.lease.id.as_str();
        let instructions = compiler::compile(snapshot);
        let tools = self.executor.definitions();
        let mut messages = vec![ChatMessage::user_text(body)];
        let mut tool_calls_executed = 0usize;
        let mut last_text = String::new();

        for _round in 0..self.config.max_round_trips {
            let request = ChatRequest {
                system: instructions.system.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
                max_tokens: self.config.max_tokens,
            };
            let reply = match timeout(
                Duration::from_secs(self.config.llm_timeout_secs),
                self.provider.complete(&request),
            )
            .await
            {
                Ok(Ok(reply)) => reply,
                Ok(Err(err)) => {
                    error!(error = %err, "generative round-trip failed");
                    return Ok(self.fail_soft(lease_id, &err.to_string(), tool_calls_executed));
                }
                Err(_elapsed) => {
                    let err = CoreError::Timeout(self.config.llm_timeout_secs);
                    warn!(%err, "generative round-trip timed out");
                    return Ok(self.fail_soft(lease_id, &err.to_string(), tool_calls_executed));
                }
            };

            if !reply.wants_tools() {
                let text = reply.text();
                let final_text = if text.trim().is_empty() { RETRY_REPLY.to_owned() } else { text };
                self.events.emit(GableEvent::TurnCompleted {
                    base: BaseEvent::now(lease_id),
                    tool_call_count: tool_calls_executed,
                });
                counter!("gable_turns_total", "outcome" => "completed").increment(1);
                return Ok(TurnOutcome {
                    reply: final_text,
                    tool_calls: tool_calls_executed,
                    duplicate: false,
                });
            }

            last_text = reply.text();
            let calls = reply.tool_calls();
            let mut result_blocks = Vec::with_capacity(calls.len());
            for call in &calls {
                let ctx = ToolContext {
                    tool_call_id: call.id.clone(),
                    snapshot: Arc::clone(snapshot),
                };
                let result = match self.executor.execute(call, &ctx).await {
                    Ok(result) => result,
                    Err(err) => {
                        error!(error = %err, tool = %call.name, "tool infrastructure failure");
                        return Ok(self.fail_soft(lease_id, &err.to_string(), tool_calls_executed));
                    }
                };
                tool_calls_executed += 1;
                result_blocks.push(ContentBlock::ToolResult {
                    tool_use_id: call.id.clone(),
                    content: result.content,
                    is_error: result.is_error,
                });
            }
            messages.push(ChatMessage {
                role: Role::Assistant,
                content: reply.content,
            });
            messages.push(ChatMessage::tool_results(result_blocks));
        }

        // Round-trip bound hit with the model still asking for tools.
        // Fall back to its last text, or the generic retry reply. Never
        // claim actions that did not run.
        warn!(provider_message_id, "turn hit the round-trip bound");
        let reply = if last_text.trim().is_empty() { RETRY_REPLY.to_owned() } else { last_text };
        self.events.emit(GableEvent::TurnCompleted {
            base: BaseEvent::now(lease_id),
            tool_call_count: tool_calls_executed,
        });
        counter!("gable_turns_total", "outcome" => "truncated").increment(1);
        Ok(TurnOutcome {
            reply,
            tool_calls: tool_calls_executed,
            duplicate: false,
        })
    }

    fn fail_soft(&self, lease_id: &str, reason: &str, tool_calls: usize) -> TurnOutcome {
        self.events.emit(GableEvent::TurnFailed {
            base: BaseEvent::now(lease_id),
            reason: reason.to_owned(),
        });
        counter!("gable_turns_total", "outcome" => "failed").increment(1);
        TurnOutcome {
            reply: RETRY_REPLY.to_owned(),
            tool_calls,
            duplicate: false,
        }
    }

    fn persist_reply(
        &self,
        lease_id: &LeaseId,
        provider_message_id: &str,
        prior_summary: &str,
        inbound: &str,
        reply: &str,
    ) -> Result<(), RuntimeError> {
        let conn = self.store.conn()?;
        MessageRepo::insert_outbound(&conn, lease_id, provider_message_id, reply)?;
        let summary = rolled_summary(prior_summary, inbound, reply);
        ConversationRepo::update_summary(&conn, lease_id, &summary)?;
        Ok(())
    }

    fn stored_reply(&self, provider_message_id: &str) -> Result<Option<String>, RuntimeError> {
        let conn = self.store.conn()?;
        Ok(MessageRepo::reply_for(&conn, provider_message_id)?)
    }

    fn resolve_lease(&self, messaging_address: &str) -> Result<LeaseId, RuntimeError> {
        let conn = self.store.conn()?;
        let tenants = TenantRepo::find_by_messaging_address(&conn, messaging_address)?;
        match tenants.first() {
            Some(tenant) if tenants.len() == 1 => Ok(tenant.lease_id.clone()),
            Some(_) => Err(CoreError::InvalidAction(format!(
                "messaging address {messaging_address} resolves to {} tenants",
                tenants.len()
            ))
            .into()),
            None => Err(CoreError::NotFound {
                entity: "tenant",
                lookup: messaging_address.to_owned(),
            }
            .into()),
        }
    }
}

/// Roll the turn's exchange into the bounded summary, keeping the tail.
fn rolled_summary(prior: &str, inbound: &str, reply: &str) -> String {
    let mut summary = if prior.is_empty() {
        String::new()
    } else {
        format!("{prior}\n")
    };
    summary.push_str(&format!("Tenant: {inbound}\nAgent: {reply}"));
    if summary.chars().count() > SUMMARY_LIMIT {
        let tail: String = summary
            .chars()
            .skip(summary.chars().count() - SUMMARY_LIMIT)
            .collect();
        summary = tail;
    }
    summary
}
