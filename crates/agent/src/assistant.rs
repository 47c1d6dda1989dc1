//! The question-answering pipeline behind the REPL.

use std::sync::Arc;

use policydesk_config::AppConfig;
use policydesk_core::domain::Domain;
use policydesk_core::history::ConversationHistory;
use policydesk_core::provider::Provider;
use policydesk_knowledge::KnowledgeBase;
use tracing::{debug, info};

use crate::classifier::{CoordinatorAgent, DomainRouter, KeywordClassifier};
use crate::domain_agent::DomainAgent;
use crate::prompt::build_rag_prompt;

pub const NO_RETRIEVAL_MESSAGE: &str = "I couldn't retrieve relevant content from the document.";
pub const OUT_OF_DOMAIN_MESSAGE: &str =
    "This question does not match the domain of the uploaded documents.";

/// Retrieves, routes, prompts and records one question at a time.
pub struct Assistant {
    knowledge: KnowledgeBase,
    router: DomainRouter,
    finance: DomainAgent,
    medicaid: DomainAgent,
    history: ConversationHistory,
}

impl Assistant {
    pub fn new(
        knowledge: KnowledgeBase,
        router: DomainRouter,
        finance: DomainAgent,
        medicaid: DomainAgent,
    ) -> Self {
        Self {
            knowledge,
            router,
            finance,
            medicaid,
            history: ConversationHistory::new(),
        }
    }

    /// Wire the coordinator and both domain agents to `provider` using the
    /// model and agent settings from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        knowledge: KnowledgeBase,
    ) -> Self {
        let tools = Arc::new(policydesk_tools::default_registry());
        let model = &config.default_model;
        let temperature = config.default_temperature;

        let domain_agent = |agent: DomainAgent| {
            agent
                .with_max_iterations(config.agents.max_tool_iterations)
                .with_max_tokens(config.default_max_tokens)
        };
        let finance = domain_agent(DomainAgent::finance(
            provider.clone(),
            model,
            temperature,
            tools.clone(),
        ));
        let medicaid = domain_agent(DomainAgent::medicaid(
            provider.clone(),
            model,
            temperature,
            tools,
        ));

        let router = DomainRouter::new(
            KeywordClassifier::from_config(&config.routing),
            CoordinatorAgent::new(provider, model, config.agents.coordinator_temperature),
        );

        Self::new(knowledge, router, finance, medicaid)
    }

    /// Answer one user question.
    ///
    /// The question is recorded as an open turn first. The turn is completed
    /// with the answer unless retrieval finds nothing, in which case it stays
    /// open and the fixed apology is returned.
    pub async fn answer_query(&mut self, query: &str) -> Result<String, policydesk_core::Error> {
        self.history.begin_turn(query);

        let Some(hit) = self.knowledge.retrieve(query).await? else {
            info!("No document retrieved");
            return Ok(NO_RETRIEVAL_MESSAGE.into());
        };
        debug!(source = %hit.document.source, similarity = hit.similarity, "Using retrieved document");

        let history_text = self.history.render();
        let routing = self.router.route(query).await?;
        let prompt = build_rag_prompt(&hit.document.source, &hit.document.text, &history_text, query);

        let answer = match routing.domain {
            Domain::Finance => self.finance.run(&prompt).await?.answer,
            Domain::Medicaid => self.medicaid.run(&prompt).await?.answer,
            Domain::Unknown => OUT_OF_DOMAIN_MESSAGE.into(),
        };

        self.history.complete_turn(answer.clone());
        Ok(answer)
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use policydesk_core::document::Document;
    use policydesk_knowledge::HashingEmbedder;
    use serde_json::json;

    async fn knowledge() -> KnowledgeBase {
        KnowledgeBase::build(
            vec![
                Document::new(
                    0,
                    "aml_policy.txt",
                    "AML policy: file a suspicious activity report (SAR) within 30 days. \
                     Margin accounts need 25 percent equity.",
                ),
                Document::new(
                    1,
                    "medicaid_rules.txt",
                    "Medicaid eligibility: household income must be at most 20783 per year. \
                     Dental coverage is a covered benefit.",
                ),
            ],
            Arc::new(HashingEmbedder::default()),
        )
        .await
        .unwrap()
    }

    async fn assistant(provider: Arc<SequentialMockProvider>) -> Assistant {
        Assistant::from_config(&AppConfig::default(), provider, knowledge().await)
    }

    #[tokio::test]
    async fn finance_question_goes_to_finance_agent() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Within 30 days."]));
        let mut assistant = assistant(provider.clone()).await;

        let answer = assistant.answer_query("When is a SAR due under AML policy?").await.unwrap();
        assert_eq!(answer, "Within 30 days.");
        assert_eq!(provider.call_count(), 1);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].content, crate::domain_agent::FINANCE_ROLE);
        let prompt = &request.messages[1].content;
        assert!(prompt.contains("(from aml_policy.txt)"));
        assert!(prompt.contains("### Conversation History:\nUser: When is a SAR due under AML policy?\n\n\n"));

        let turn = &assistant.history().turns()[0];
        assert_eq!(turn.assistant.as_deref(), Some("Within 30 days."));
    }

    #[tokio::test]
    async fn history_accumulates_across_questions() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Up to 20783.", "Yes, dental is covered."]));
        let mut assistant = assistant(provider.clone()).await;

        assistant.answer_query("What is the medicaid income limit?").await.unwrap();
        assistant.answer_query("Is dental coverage included?").await.unwrap();

        let prompt = &provider.requests()[1].messages[1].content;
        assert!(prompt.contains(
            "User: What is the medicaid income limit?\nAssistant: Up to 20783.\n\n\
             User: Is dental coverage included?\n"
        ));
        assert_eq!(provider.requests()[1].messages[0].content, crate::domain_agent::MEDICAID_ROLE);
        assert_eq!(assistant.history().len(), 2);
    }

    #[tokio::test]
    async fn unknown_domain_returns_fixed_message_and_records_it() {
        let provider = Arc::new(SequentialMockProvider::texts(&["unknown"]));
        let mut assistant = assistant(provider.clone()).await;

        let answer = assistant.answer_query("What's the weather?").await.unwrap();
        assert_eq!(answer, OUT_OF_DOMAIN_MESSAGE);
        // coordinator only, no domain agent
        assert_eq!(provider.call_count(), 1);
        assert_eq!(assistant.history().turns()[0].assistant.as_deref(), Some(OUT_OF_DOMAIN_MESSAGE));
    }

    #[tokio::test]
    async fn coordinator_can_route_to_a_domain_agent() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Medicaid", "Dental is covered."]));
        let mut assistant = assistant(provider.clone()).await;

        let answer = assistant.answer_query("Can my kid see a dentist?").await.unwrap();
        assert_eq!(answer, "Dental is covered.");
        assert_eq!(provider.requests()[1].messages[0].content, crate::domain_agent::MEDICAID_ROLE);
    }

    #[tokio::test]
    async fn no_retrieval_leaves_turn_open() {
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let kb = knowledge().await.with_min_similarity(Some(0.99));
        let mut assistant = Assistant::from_config(&AppConfig::default(), provider.clone(), kb);

        let answer = assistant.answer_query("zebra").await.unwrap();
        assert_eq!(answer, NO_RETRIEVAL_MESSAGE);
        assert_eq!(provider.call_count(), 0);
        assert!(assistant.history().turns()[0].is_open());
    }

    #[tokio::test]
    async fn agent_tool_use_flows_through() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![make_tool_call(
                "call_1",
                "workflow_executor",
                json!({"workflow": "threshold_check", "value": 18000, "limit": 20783}),
            )]),
            make_text_response("With 18000 you are under the income limit."),
        ]));
        let mut assistant = assistant(provider.clone()).await;

        let answer = assistant
            .answer_query("Is an income of 18000 under the medicaid eligibility limit?")
            .await
            .unwrap();
        assert_eq!(answer, "With 18000 you are under the income limit.");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn provider_failure_is_an_error_and_turn_stays_open() {
        let mut assistant = Assistant::from_config(
            &AppConfig::default(),
            Arc::new(FailingProvider),
            knowledge().await,
        );
        assert!(assistant.answer_query("What is KYC?").await.is_err());
        assert!(assistant.history().turns()[0].is_open());
    }
}
