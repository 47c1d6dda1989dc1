//! Routing and answering for PolicyDesk.
//!
//! For every question the [`Assistant`]:
//!
//! 1. **Records** it as an open turn in the conversation history
//! 2. **Retrieves** the single most similar policy document
//! 3. **Routes** it to a domain (keywords first, LLM coordinator on a miss)
//! 4. **Prompts** the finance or medicaid agent with document + history
//! 5. **Completes** the turn with the agent's answer

pub mod assistant;
pub mod classifier;
pub mod domain_agent;
pub mod prompt;

pub use assistant::{Assistant, NO_RETRIEVAL_MESSAGE, OUT_OF_DOMAIN_MESSAGE};
pub use classifier::{CoordinatorAgent, DomainRouter, Exchange, KeywordClassifier, RouteVia, Routing};
pub use domain_agent::{AgentReply, DomainAgent};
pub use prompt::build_rag_prompt;

#[cfg(test)]
pub(crate) mod test_helpers;
