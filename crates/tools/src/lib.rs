//! Tools the PolicyDesk domain agents can call.
//!
//! Agents are told to hand arithmetic and eligibility checks to
//! `workflow_executor` instead of computing them in the reply.

pub mod expression;
pub mod workflow_executor;

use policydesk_core::tool::ToolRegistry;

pub use workflow_executor::{Comparison, Workflow, WorkflowExecutorTool};

/// Registry holding every built-in tool.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WorkflowExecutorTool));
    registry
}
