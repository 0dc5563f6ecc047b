//! Action registry and dispatcher.

use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use webhands_protocols::action::{
    Action, ActionContext, ActionDefinition, ActionOutcome, COMPLETE_ACTION,
};
use webhands_protocols::error::ActionError;
use webhands_protocols::provider::OutputSchema;
use webhands_protocols::task::ActionCall;

use super::base::{BaseRegistry, Registerable, RegistryError};

impl Registerable for dyn Action {
    fn registry_id(&self) -> &str {
        self.action_type()
    }
}

/// Type name to action map used by the step loop.
///
/// `complete` is reserved: it can only be set through
/// [`ActionRegistry::install_complete_action`].
pub struct ActionRegistry {
    inner: BaseRegistry<dyn Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Build a registry from a list of actions, failing on the first bad one.
    pub fn with_actions(actions: Vec<Arc<dyn Action>>) -> Result<Self, ActionError> {
        let registry = Self::new();
        for action in actions {
            registry.register(action)?;
        }
        Ok(registry)
    }

    pub fn register(&self, action: Arc<dyn Action>) -> Result<(), ActionError> {
        if action.action_type() == COMPLETE_ACTION {
            return Err(ActionError::ReservedName(COMPLETE_ACTION.to_string()));
        }
        self.inner.register(action).map_err(|e| match e {
            RegistryError::AlreadyRegistered(id) => ActionError::AlreadyRegistered(id),
            RegistryError::NotFound(id) => ActionError::NotFound(id),
        })
    }

    /// Install (or replace) the completion action.
    pub fn install_complete_action(&self, action: Arc<dyn Action>) -> Result<(), ActionError> {
        if action.action_type() != COMPLETE_ACTION {
            return Err(ActionError::InvalidParameters(format!(
                "completion action must be named '{}', got '{}'",
                COMPLETE_ACTION,
                action.action_type()
            )));
        }
        self.inner.upsert(action);
        Ok(())
    }

    pub fn unregister(&self, action_type: &str) -> Result<(), ActionError> {
        self.inner
            .unregister(action_type)
            .map(|_| ())
            .map_err(|_| ActionError::NotFound(action_type.to_string()))
    }

    pub fn get(&self, action_type: &str) -> Result<Arc<dyn Action>, ActionError> {
        self.inner
            .get(action_type)
            .ok_or_else(|| ActionError::NotFound(action_type.to_string()))
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.inner.contains(action_type)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Definitions in registration order.
    pub fn list(&self) -> Vec<ActionDefinition> {
        self.inner
            .values()
            .iter()
            .map(|a| a.definition().clone())
            .collect()
    }

    /// Copy of this registry with `complete` bound to the given action.
    ///
    /// Each task dispatches against its own copy, so swapping the completion
    /// variant for one task does not leak into others.
    pub fn for_task(&self, complete: Arc<dyn Action>) -> Result<Self, ActionError> {
        let task_registry = Self::new();
        for action in self.inner.values() {
            if action.action_type() != COMPLETE_ACTION {
                task_registry.inner.upsert(action);
            }
        }
        task_registry.install_complete_action(complete)?;
        Ok(task_registry)
    }

    /// Run one model-requested action.
    ///
    /// An unknown type is returned as [`ActionError::NotFound`]. Any error the
    /// executor raises is folded into a failed outcome.
    pub async fn dispatch(
        &self,
        call: &ActionCall,
        ctx: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let action = self.get(&call.action_type)?;
        debug!("Dispatching action {} with {}", call.action_type, call.params);

        let result = match action.validate(&call.params) {
            Ok(()) => action.run(call.params.clone(), ctx).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("Action {} failed: {}", call.action_type, e);
                Ok(ActionOutcome::failure(format!(
                    "Action {} failed: {}",
                    call.action_type, e
                )))
            }
        }
    }

    /// Human readable form of a call, falling back to the raw JSON.
    pub fn pprint(&self, call: &ActionCall) -> String {
        self.inner
            .get(&call.action_type)
            .and_then(|a| a.pprint(&call.params))
            .unwrap_or_else(|| {
                json!({"type": call.action_type, "params": call.params}).to_string()
            })
    }

    /// Model-facing schema: the agent output with `actions` folded over every
    /// registered action.
    pub fn output_schema(&self) -> OutputSchema {
        let variants: Vec<Value> = self
            .inner
            .values()
            .iter()
            .map(|a| a.definition().schema_variant())
            .collect();

        let schema = json!({
            "type": "object",
            "properties": {
                "thoughts": {"type": "string"},
                "memory": {"type": "string"},
                "nextGoal": {"type": "string"},
                "actions": {
                    "type": "array",
                    "items": {"anyOf": variants},
                },
            },
            "required": ["thoughts", "memory", "nextGoal", "actions"],
            "additionalProperties": false,
        });

        OutputSchema::new("AgentOutput", schema)
            .with_description("The agent's reasoning and the next actions to perform")
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
