//! Flow tests for partition → schedule → summarize

#[cfg(test)]
mod tests {
    use crate::{partition, run_batches, BatchConfig, BatchError, SummarizationGateway};
    use sift_domain::ExtractedDocument;
    use sift_llm::{ChainError, MockProvider, ProviderChain, ProviderSlot};
    use std::sync::Arc;
    use std::time::Duration;

    /// Builds a valid response for whatever files the prompt lists
    fn echo_response(prompt: &str) -> String {
        let entries: Vec<String> = prompt
            .lines()
            .filter_map(|line| line.strip_prefix("### File: "))
            .map(|path| {
                format!(
                    r#""{path}": {{
                        "summary": "Summary of {path}",
                        "key_facts": ["Fact from {path} [source: {path}:1]", "Uncited fact"],
                        "insights": ["Insight [source: {path}]"],
                        "statistics": {{"lines": 1}},
                        "sources": ["{path}"]
                    }}"#
                )
            })
            .collect();
        format!("{{{}}}", entries.join(","))
    }

    fn echo_provider(name: &str) -> MockProvider {
        MockProvider::from_fn(|prompt| Ok(echo_response(prompt))).with_name(name)
    }

    fn docs(n: usize) -> Vec<ExtractedDocument> {
        (0..n)
            .map(|i| ExtractedDocument::new(format!("notes/doc{}.md", i), format!("Document {} text", i)))
            .collect()
    }

    fn gateway(primary: ProviderSlot, fallback: ProviderSlot) -> SummarizationGateway {
        let chain = Arc::new(ProviderChain::new(primary, fallback));
        SummarizationGateway::new(chain, &BatchConfig::default())
    }

    #[tokio::test]
    async fn test_full_summarization_flow() {
        let gateway = gateway(
            ProviderSlot::configured(echo_provider("primary")),
            ProviderSlot::unavailable("openai/gpt-4o-mini", "OPENAI_API_KEY is not set"),
        );

        let batches = partition(docs(3), 20).unwrap();
        let summaries = gateway.summarize_batch(&batches[0]).await.unwrap();

        assert_eq!(summaries.len(), 3);
        for (i, summary) in summaries.iter().enumerate() {
            assert_eq!(summary.document, format!("notes/doc{}.md", i));
            assert_eq!(summary.model, "primary");
            // 2 of 3 facts+insights carry a marker
            assert!((summary.confidence - 2.0 / 3.0).abs() < 1e-9);
            assert!(summary.token_count > 0);
        }
        assert_eq!(gateway.stats().batches_summarized, 1);
        assert_eq!(gateway.stats().fallback_batches, 0);
    }

    #[tokio::test]
    async fn test_failing_primary_uses_fallback() {
        let primary = MockProvider::failing("connection refused").with_name("primary");
        let fallback = echo_provider("fallback");
        let gateway = gateway(
            ProviderSlot::configured(primary.clone()),
            ProviderSlot::configured(fallback.clone()),
        );

        let batches = partition(docs(2), 20).unwrap();
        let summaries = gateway.summarize_batch(&batches[0]).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.model == "fallback"));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
        assert_eq!(gateway.stats().fallback_batches, 1);
        assert_eq!(gateway.stats().failed_batches, 0);
        assert_eq!(gateway.stats().batches_summarized, 1);
    }

    #[tokio::test]
    async fn test_entry_without_facts_uses_fallback() {
        let primary =
            MockProvider::new(r#"{"notes/doc0.md": {"summary": "only a summary"}}"#).with_name("primary");
        let fallback = echo_provider("fallback");
        let gateway = gateway(
            ProviderSlot::configured(primary.clone()),
            ProviderSlot::configured(fallback.clone()),
        );

        let batches = partition(docs(1), 20).unwrap();
        let summaries = gateway.summarize_batch(&batches[0]).await.unwrap();

        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.call_count(), 1);
        assert_eq!(summaries[0].model, "fallback");
        assert_eq!(summaries[0].key_facts.len(), 2);
        assert!(summaries[0].confidence > 0.0);
        assert_eq!(gateway.stats().fallback_batches, 1);
    }

    #[tokio::test]
    async fn test_schema_violation_uses_fallback() {
        let primary = MockProvider::new(r#"{"unrelated": {"summary": "x"}}"#).with_name("primary");
        let gateway = gateway(
            ProviderSlot::configured(primary),
            ProviderSlot::configured(echo_provider("fallback")),
        );

        let batches = partition(docs(1), 20).unwrap();
        let summaries = gateway.summarize_batch(&batches[0]).await.unwrap();
        assert_eq!(summaries[0].model, "fallback");
    }

    #[tokio::test]
    async fn test_both_providers_failing_fails_batch() {
        let gateway = gateway(
            ProviderSlot::configured(MockProvider::new("This is not JSON")),
            ProviderSlot::configured(MockProvider::failing("down")),
        );

        let batches = partition(docs(2), 20).unwrap();
        let result = gateway.summarize_batch(&batches[0]).await;

        assert!(matches!(
            result,
            Err(BatchError::Provider(ChainError::Exhausted { .. }))
        ));
        assert_eq!(gateway.stats().failed_batches, 1);
    }

    #[tokio::test]
    async fn test_no_providers_configured() {
        let gateway = gateway(
            ProviderSlot::unavailable("anthropic/x", "missing key"),
            ProviderSlot::unavailable("openai/y", "missing key"),
        );

        let batches = partition(docs(1), 20).unwrap();
        let result = gateway.summarize_batch(&batches[0]).await;
        assert_eq!(result.unwrap_err(), BatchError::Provider(ChainError::NoProviders));
    }

    #[tokio::test]
    async fn test_confidence_bounds() {
        let cited = MockProvider::from_fn(|prompt| {
            let path = prompt
                .lines()
                .find_map(|l| l.strip_prefix("### File: "))
                .unwrap_or_default()
                .to_string();
            Ok(format!(
                r#"{{"{path}": {{"summary": "s", "key_facts": ["a [source: {path}:3]"], "insights": ["b [source: {path}]"]}}}}"#
            ))
        });
        let gateway_cited = gateway(
            ProviderSlot::configured(cited),
            ProviderSlot::unavailable("none", "none"),
        );
        let batch = partition(docs(1), 20).unwrap().remove(0);
        assert_eq!(gateway_cited.summarize_batch(&batch).await.unwrap()[0].confidence, 1.0);

        let uncited = MockProvider::new(
            r#"{"notes/doc0.md": {"summary": "s", "key_facts": ["a", "b"], "insights": []}}"#,
        );
        let gateway_uncited = gateway(
            ProviderSlot::configured(uncited),
            ProviderSlot::unavailable("none", "none"),
        );
        assert_eq!(gateway_uncited.summarize_batch(&batch).await.unwrap()[0].confidence, 0.0);
    }

    #[tokio::test]
    async fn test_scheduler_bounds_concurrency_across_batches() {
        let provider = echo_provider("primary").with_delay(Duration::from_millis(20));
        let gateway = gateway(
            ProviderSlot::configured(provider.clone()),
            ProviderSlot::unavailable("none", "none"),
        );

        // 9 documents in batches of 2 → 5 batches
        let batches = partition(docs(9), 2).unwrap();
        assert_eq!(batches.len(), 5);

        let summaries = run_batches(&batches, 2, |batch| gateway.summarize_batch(batch))
            .await
            .unwrap();

        assert_eq!(summaries.len(), 9);
        assert_eq!(provider.call_count(), 5);
        assert!(provider.peak_in_flight() <= 2);
        assert_eq!(summaries[8].document, "notes/doc8.md");
    }

    #[tokio::test]
    async fn test_provider_token_usage_split_across_documents() {
        struct Metered;

        #[async_trait::async_trait]
        impl sift_llm::SummaryProvider for Metered {
            fn name(&self) -> &str {
                "metered"
            }

            async fn complete(
                &self,
                request: &sift_llm::CompletionRequest,
            ) -> Result<sift_llm::Completion, sift_llm::LlmError> {
                Ok(sift_llm::Completion {
                    text: echo_response(&request.prompt),
                    model: "metered".to_string(),
                    tokens_used: Some(100),
                })
            }
        }

        let gateway = gateway(
            ProviderSlot::configured(Metered),
            ProviderSlot::unavailable("none", "none"),
        );
        let batch = partition(docs(3), 20).unwrap().remove(0);
        let summaries = gateway.summarize_batch(&batch).await.unwrap();

        let tokens: Vec<u32> = summaries.iter().map(|s| s.token_count).collect();
        assert_eq!(tokens, vec![34, 33, 33]);
        assert_eq!(gateway.stats().total_tokens, 100);
    }
}
