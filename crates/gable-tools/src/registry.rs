//! Tool registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use gable_core::tools::ToolDefinition;

use crate::traits::GableTool;

/// Name-keyed registry of the agent's tools. The registry is the single
/// source of the tool vocabulary: what is not registered does not exist
/// for the generative caller.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn GableTool>>,
}

impl ToolRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name.
    pub fn register(&mut self, tool: Arc<dyn GableTool>) {
        let _ = self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn GableTool>> {
        self.tools.get(name)
    }

    /// All definitions, in stable name order; this exact list goes to
    /// the provider.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
