//! Domain classification: a keyword fast path with an LLM fallback.
//!
//! ```text
//! query ──► KeywordClassifier ──► Finance / Medicaid
//!                 │
//!              Unknown
//!                 ▼
//!          CoordinatorAgent ──► Finance / Medicaid / Unknown
//! ```

use std::sync::Arc;

use policydesk_config::RoutingConfig;
use policydesk_core::domain::Domain;
use policydesk_core::error::ProviderError;
use policydesk_core::message::Message;
use policydesk_core::provider::{Provider, ProviderRequest};
use tracing::{debug, info};

pub const COORDINATOR_ROLE: &str = "\
You are a smart routing agent.

Your responsibilities:
1. Detect if question belongs to FINANCE or MEDICAID domain.
2. Choose the correct agent:
   - FinanceAgent
   - MedicaidAgent
3. Only when unclear, respond:
   \"This question does not match the document domain.\"

Domain signals:
- Finance → AML, KYC, compliance, trading, risk, margin, wire, SAR.
- Medicaid → eligibility, coverage, benefits, income, prior authorization.

Always return the agent name: \"finance\" or \"medicaid\" or \"unknown\".";

/// Substring matching against two keyword lists. Finance is checked first.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    finance_keywords: Vec<String>,
    medicaid_keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<F, M>(finance_keywords: F, medicaid_keywords: M) -> Self
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        let lower = |k: &str| k.trim().to_lowercase();
        Self {
            finance_keywords: finance_keywords.into_iter().map(|k| lower(k.as_ref())).collect(),
            medicaid_keywords: medicaid_keywords.into_iter().map(|k| lower(k.as_ref())).collect(),
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(&config.finance_keywords, &config.medicaid_keywords)
    }

    pub fn classify(&self, query: &str) -> Domain {
        let q = query.to_lowercase();
        let hit = |keywords: &[String]| keywords.iter().any(|k| !k.is_empty() && q.contains(k.as_str()));

        if hit(&self.finance_keywords) {
            Domain::Finance
        } else if hit(&self.medicaid_keywords) {
            Domain::Medicaid
        } else {
            Domain::Unknown
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::from_config(&RoutingConfig::default())
    }
}

/// One request/reply pair in the coordinator's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub request: String,
    pub reply: String,
}

/// LLM classifier consulted when no keyword matches.
///
/// Keeps every exchange for the session and replays them ahead of each new
/// request.
pub struct CoordinatorAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    exchanges: Vec<Exchange>,
}

impl CoordinatorAgent {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            exchanges: Vec::new(),
        }
    }

    pub async fn classify(&mut self, query: &str) -> Result<Domain, ProviderError> {
        let request_text = format!("Question: {query}\nReturn domain only.");

        let mut messages = Vec::with_capacity(2 + self.exchanges.len() * 2);
        messages.push(Message::system(COORDINATOR_ROLE));
        for exchange in &self.exchanges {
            messages.push(Message::user(&exchange.request));
            messages.push(Message::assistant(&exchange.reply));
        }
        messages.push(Message::user(&request_text));

        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: None,
                tools: vec![],
            })
            .await?;

        let reply = response.message.content;
        let domain = Domain::from_reply(&reply);
        debug!(reply = %reply.trim(), %domain, "Coordinator classified question");

        self.exchanges.push(Exchange {
            request: request_text,
            reply,
        });
        Ok(domain)
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteVia {
    Keyword,
    Coordinator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routing {
    pub domain: Domain,
    pub via: RouteVia,
}

pub struct DomainRouter {
    keywords: KeywordClassifier,
    coordinator: CoordinatorAgent,
}

impl DomainRouter {
    pub fn new(keywords: KeywordClassifier, coordinator: CoordinatorAgent) -> Self {
        Self {
            keywords,
            coordinator,
        }
    }

    /// Pick a domain for `query`. The coordinator is only called when the
    /// keyword classifier returns `Unknown`.
    pub async fn route(&mut self, query: &str) -> Result<Routing, ProviderError> {
        let domain = self.keywords.classify(query);
        let routing = if domain != Domain::Unknown {
            Routing {
                domain,
                via: RouteVia::Keyword,
            }
        } else {
            Routing {
                domain: self.coordinator.classify(query).await?,
                via: RouteVia::Coordinator,
            }
        };

        info!(domain = %routing.domain, via = ?routing.via, "Routed question");
        Ok(routing)
    }

    pub fn coordinator(&self) -> &CoordinatorAgent {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use policydesk_core::message::Role;

    #[test]
    fn every_default_keyword_routes_to_its_domain() {
        let routing = RoutingConfig::default();
        let c = KeywordClassifier::from_config(&routing);

        for keyword in &routing.finance_keywords {
            let query = format!("Tell me about {} please", keyword.to_uppercase());
            assert_eq!(c.classify(&query), Domain::Finance, "keyword {keyword}");
        }
        for keyword in &routing.medicaid_keywords {
            let query = format!("Tell me about {} please", keyword.to_uppercase());
            assert_eq!(c.classify(&query), Domain::Medicaid, "keyword {keyword}");
        }
    }

    #[test]
    fn finance_keywords_route_to_finance() {
        let c = KeywordClassifier::default();
        assert_eq!(c.classify("What are the KYC steps?"), Domain::Finance);
        assert_eq!(c.classify("explain MARGIN calls"), Domain::Finance);
    }

    #[test]
    fn medicaid_keywords_route_to_medicaid() {
        let c = KeywordClassifier::default();
        assert_eq!(c.classify("Does Medicaid cover dental?"), Domain::Medicaid);
        assert_eq!(c.classify("Is PRIOR AUTHORIZATION needed for an MRI?"), Domain::Medicaid);
    }

    #[test]
    fn finance_wins_when_both_match() {
        let c = KeywordClassifier::default();
        assert_eq!(c.classify("income risk for medicaid"), Domain::Finance);
    }

    #[test]
    fn substring_matching_is_literal() {
        let c = KeywordClassifier::default();
        // "sar" inside "necessary"
        assert_eq!(c.classify("is this necessary?"), Domain::Finance);
        assert_eq!(c.classify("hello there"), Domain::Unknown);
    }

    #[test]
    fn configured_keywords_are_lowercased() {
        let c = KeywordClassifier::new(["Wire"], ["SNAP"]);
        assert_eq!(c.classify("a wire transfer"), Domain::Finance);
        assert_eq!(c.classify("snap benefits"), Domain::Medicaid);
        assert_eq!(c.classify("kyc"), Domain::Unknown);
    }

    #[tokio::test]
    async fn coordinator_parses_reply_and_keeps_log() {
        let provider = Arc::new(SequentialMockProvider::texts(&["  Finance\n", "unknown"]));
        let mut coordinator = CoordinatorAgent::new(provider.clone(), "m", 0.0);

        assert_eq!(coordinator.classify("wire limits?").await.unwrap(), Domain::Finance);
        assert_eq!(coordinator.classify("weather today?").await.unwrap(), Domain::Unknown);

        let requests = provider.requests();
        let first = &requests[0].messages;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].content, COORDINATOR_ROLE);
        assert_eq!(first[1].content, "Question: wire limits?\nReturn domain only.");

        // prior exchange replayed ahead of the new question
        let second = &requests[1].messages;
        assert_eq!(second.len(), 4);
        assert_eq!(second[2].role, Role::Assistant);
        assert_eq!(second[2].content, "  Finance\n");
        assert_eq!(second[3].content, "Question: weather today?\nReturn domain only.");
        assert_eq!(coordinator.exchanges().len(), 2);
        assert!(requests[0].tools.is_empty());
    }

    #[tokio::test]
    async fn router_skips_coordinator_on_keyword_hit() {
        let provider = Arc::new(SequentialMockProvider::texts(&[]));
        let mut router = DomainRouter::new(
            KeywordClassifier::default(),
            CoordinatorAgent::new(provider.clone(), "m", 0.0),
        );

        let routing = router.route("What is AML?").await.unwrap();
        assert_eq!(
            routing,
            Routing {
                domain: Domain::Finance,
                via: RouteVia::Keyword
            }
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn router_falls_back_to_coordinator() {
        let provider = Arc::new(SequentialMockProvider::texts(&["medicaid"]));
        let mut router = DomainRouter::new(
            KeywordClassifier::default(),
            CoordinatorAgent::new(provider.clone(), "m", 0.0),
        );

        let routing = router.route("Can my child see a dentist?").await.unwrap();
        assert_eq!(routing.domain, Domain::Medicaid);
        assert_eq!(routing.via, RouteVia::Coordinator);
        assert_eq!(router.coordinator().exchanges().len(), 1);
    }

    #[tokio::test]
    async fn coordinator_failure_propagates() {
        let mut router = DomainRouter::new(
            KeywordClassifier::default(),
            CoordinatorAgent::new(Arc::new(FailingProvider), "m", 0.0),
        );
        assert!(router.route("hello").await.is_err());
    }
}
