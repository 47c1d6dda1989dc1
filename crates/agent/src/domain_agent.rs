//! Domain agents: a role prompt plus a bounded tool-calling loop.
//!
//! Each call to [`DomainAgent::run`] starts from a fresh
//! `[system(role), user(prompt)]` conversation. Agents keep no memory of
//! their own; the RAG prompt carries the conversation history.

use std::sync::Arc;

use policydesk_core::error::ToolError;
use policydesk_core::message::Message;
use policydesk_core::provider::{Provider, ProviderRequest};
use policydesk_core::tool::{ToolCall, ToolRegistry};
use tracing::{debug, info, warn};

/// Returned when the model keeps calling tools past the iteration limit.
pub const ITERATION_LIMIT_MESSAGE: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

pub const FINANCE_ROLE: &str = "\
You are a Finance Policy Assistant specializing in:
- AML / KYC rules
- Trading surveillance patterns
- Risk controls
- Margin rules
- SAR reporting
- Finance calculations

Tone: professional, compliance-oriented.

Rules:
- Use ONLY the retrieved document chunk + chat history.
- Never hallucinate or invent financial rules.
- If a calculation is required, call the workflow_executor tool.";

pub const MEDICAID_ROLE: &str = "\
You are a Healthcare/Medicaid Policy Assistant specializing in:
- Medicaid eligibility
- Income thresholds
- Covered benefits
- Prior authorization rules

Tone: supportive, patient-friendly.

Rules:
- Use ONLY the retrieved document chunk + chat history.
- Never hallucinate medical or Medicaid facts.
- For eligibility checks, use the workflow_executor tool.";

/// Outcome of one [`DomainAgent::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub answer: String,
    /// Provider calls made
    pub iterations: u32,
    /// Tool calls executed, failed ones included
    pub tool_calls: usize,
}

pub struct DomainAgent {
    name: String,
    role: String,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    max_iterations: u32,
}

impl DomainAgent {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: 5,
        }
    }

    pub fn finance(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::new("FinanceAgent", FINANCE_ROLE, provider, model, temperature, tools)
    }

    pub fn medicaid(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::new("MedicaidAgent", MEDICAID_ROLE, provider, model, temperature, tools)
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Answer `prompt`, executing any tool calls the model makes.
    ///
    /// Tool failures are reported back to the model as `Error: ..` tool
    /// results rather than aborting the run. Provider failures abort it.
    pub async fn run(&self, prompt: &str) -> Result<AgentReply, policydesk_core::Error> {
        info!(agent = %self.name, "Running domain agent");

        let mut messages = vec![Message::system(&self.role), Message::user(prompt)];
        let tool_definitions = self.tools.definitions();
        let mut tool_calls_made = 0usize;

        for iteration in 1..=self.max_iterations {
            debug!(agent = %self.name, iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };
            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                return Ok(AgentReply {
                    answer: response.message.content,
                    iterations: iteration,
                    tool_calls: tool_calls_made,
                });
            }

            let requested = response.message.tool_calls.clone();
            debug!(agent = %self.name, count = requested.len(), "Executing tool calls");
            messages.push(response.message);

            for tc in &requested {
                tool_calls_made += 1;
                let result = match serde_json::from_str(&tc.arguments) {
                    Ok(arguments) => {
                        let call = ToolCall {
                            id: tc.id.clone(),
                            name: tc.name.clone(),
                            arguments,
                        };
                        self.tools.execute(&call).await.map(|r| r.output)
                    }
                    Err(e) => Err(ToolError::InvalidArguments(format!(
                        "arguments are not valid JSON: {e}"
                    ))),
                };

                let content = match result {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(agent = %self.name, tool = %tc.name, error = %e, "Tool execution failed");
                        format!("Error: {e}")
                    }
                };
                messages.push(Message::tool_result(&tc.id, content));
            }
        }

        warn!(
            agent = %self.name,
            max_iterations = self.max_iterations,
            "Max tool iterations reached"
        );
        Ok(AgentReply {
            answer: ITERATION_LIMIT_MESSAGE.into(),
            iterations: self.max_iterations,
            tool_calls: tool_calls_made,
        })
    }
}
