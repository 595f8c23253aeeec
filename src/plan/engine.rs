use tracing::{error, info, warn};

use super::lang::Lang;
use super::prompts::{plan_prompt, term_prompt};
use crate::completion::{ChatMessage, CompletionClient, CompletionError};
use crate::literature::{LiteratureOutcome, LiteratureSource};

#[derive(Debug)]
pub struct PlanRequest<'a> {
    pub idea: &'a str,
    pub lang: Lang,
    /// Maximum number of papers embedded in the synthesis prompt.
    pub context_limit: usize,
}

#[derive(Debug)]
pub struct PlanReport {
    pub idea: String,
    pub search_terms: String,
    pub literature: LiteratureOutcome,
    pub plan: String,
}

impl PlanReport {
    /// True when the plan was synthesized without literature context.
    pub fn is_degraded(&self) -> bool {
        self.literature.is_degraded()
    }
}

/// Hard failures. Retrieval problems never appear here; they degrade
/// the report through `LiteratureOutcome` instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("research idea must not be empty")]
    EmptyIdea,

    #[error("search term generation failed: {0}")]
    TermGeneration(#[source] CompletionError),

    #[error("plan synthesis failed: {0}")]
    PlanSynthesis(#[source] CompletionError),
}

pub async fn run(
    completion: &impl CompletionClient,
    source: &impl LiteratureSource,
    req: &PlanRequest<'_>,
) -> Result<PlanReport, PipelineError> {
    let idea = req.idea.trim();
    if idea.is_empty() {
        return Err(PipelineError::EmptyIdea);
    }

    info!(phase = "1/3", "generating optimized search terms");
    let search_terms = completion
        .complete(&[ChatMessage::user(term_prompt(idea))])
        .await
        .map_err(|e| {
            error!(error = %e, "search term generation failed");
            PipelineError::TermGeneration(e)
        })?
        .trim()
        .to_string();
    info!(terms = %search_terms, "search terms generated");

    info!(phase = "2/3", "searching for the most relevant papers");
    let literature = LiteratureOutcome::from_search(source.search(&search_terms).await);
    match &literature {
        LiteratureOutcome::Found(records) => info!(
            papers = records.len(),
            used = records.len().min(req.context_limit),
            "papers with abstracts found"
        ),
        LiteratureOutcome::Empty => {
            warn!("no papers with abstracts found; planning from general knowledge only")
        }
        LiteratureOutcome::Unavailable(e) => {
            warn!(error = %e, "paper search failed; planning from general knowledge only")
        }
    }
    let context = literature.context(req.context_limit);

    info!(phase = "3/3", "synthesizing the work plan from the literature");
    let plan = completion
        .complete(&[ChatMessage::user(plan_prompt(idea, &context, req.lang))])
        .await
        .map_err(|e| {
            error!(error = %e, "plan synthesis failed");
            PipelineError::PlanSynthesis(e)
        })?;

    info!(degraded = literature.is_degraded(), "plan generated");
    Ok(PlanReport {
        idea: idea.to_string(),
        search_terms,
        literature,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literature::client::LiteratureError;
    use crate::literature::context::NO_LITERATURE_PLACEHOLDER;
    use crate::literature::types::PaperRecord;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockCompletion {
        responses: Mutex<VecDeque<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockCompletion {
        fn with(responses: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn captured_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl CompletionClient for MockCompletion {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
            self.prompts
                .lock()
                .unwrap()
                .push(messages[0].content.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompletionError::RateLimited))
        }
    }

    struct MockLiterature {
        result: Mutex<Option<Result<Vec<PaperRecord>, LiteratureError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl MockLiterature {
        fn returning(result: Result<Vec<PaperRecord>, LiteratureError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn captured_queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl LiteratureSource for MockLiterature {
        async fn search(&self, query: &str) -> Result<Vec<PaperRecord>, LiteratureError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.result.lock().unwrap().take().unwrap_or(Ok(vec![]))
        }
    }

    fn papers(n: usize) -> Vec<PaperRecord> {
        (1..=n)
            .map(|i| PaperRecord {
                title: format!("Paper {i}"),
                abstract_text: format!("Abstract {i}"),
            })
            .collect()
    }

    fn request(idea: &str) -> PlanRequest<'_> {
        PlanRequest {
            idea,
            lang: Lang::En,
            context_limit: 7,
        }
    }

    #[tokio::test]
    async fn empty_idea_issues_no_requests() {
        for idea in ["", "   \n\t"] {
            let completion = MockCompletion::with(vec![]);
            let literature = MockLiterature::returning(Ok(papers(1)));

            let err = run(&completion, &literature, &request(idea))
                .await
                .unwrap_err();

            assert!(matches!(err, PipelineError::EmptyIdea));
            assert!(completion.captured_prompts().is_empty());
            assert!(literature.captured_queries().is_empty());
        }
    }

    #[tokio::test]
    async fn term_failure_halts_before_retrieval_and_synthesis() {
        let completion = MockCompletion::with(vec![Err(CompletionError::Api {
            code: 500,
            message: "boom".into(),
        })]);
        let literature = MockLiterature::returning(Ok(papers(3)));

        let err = run(&completion, &literature, &request("an idea"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::TermGeneration(_)));
        assert_eq!(completion.captured_prompts().len(), 1);
        assert!(literature.captured_queries().is_empty());
    }

    #[tokio::test]
    async fn terms_are_trimmed_before_search() {
        let completion = MockCompletion::with(vec![
            Ok("  protein hydrolysate, DPPH assay \n".into()),
            Ok("plan".into()),
        ]);
        let literature = MockLiterature::returning(Ok(papers(1)));

        let report = run(&completion, &literature, &request("idea")).await.unwrap();

        assert_eq!(report.search_terms, "protein hydrolysate, DPPH assay");
        assert_eq!(
            literature.captured_queries(),
            ["protein hydrolysate, DPPH assay"]
        );
    }

    #[tokio::test]
    async fn no_abstracts_uses_placeholder_and_still_synthesizes() {
        let completion = MockCompletion::with(vec![Ok("terms".into()), Ok("the plan".into())]);
        let literature = MockLiterature::returning(Ok(vec![]));

        let report = run(&completion, &literature, &request("idea")).await.unwrap();

        assert_eq!(report.plan, "the plan");
        assert!(matches!(report.literature, LiteratureOutcome::Empty));
        assert!(report.is_degraded());
        let prompts = completion.captured_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains(NO_LITERATURE_PLACEHOLDER));
        assert!(!prompts[1].contains("Title: "));
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_instead_of_aborting() {
        let completion = MockCompletion::with(vec![Ok("terms".into()), Ok("the plan".into())]);
        let literature = MockLiterature::returning(Err(LiteratureError::RateLimited));

        let report = run(&completion, &literature, &request("idea")).await.unwrap();

        assert!(matches!(
            report.literature,
            LiteratureOutcome::Unavailable(LiteratureError::RateLimited)
        ));
        assert_eq!(report.plan, "the plan");
        assert!(completion.captured_prompts()[1].contains(NO_LITERATURE_PLACEHOLDER));
    }

    #[tokio::test]
    async fn ten_papers_put_first_seven_in_prompt() {
        let completion = MockCompletion::with(vec![Ok("terms".into()), Ok("plan".into())]);
        let literature = MockLiterature::returning(Ok(papers(10)));

        let report = run(&completion, &literature, &request("idea")).await.unwrap();

        assert_eq!(report.literature.records().len(), 10);
        let prompt = &completion.captured_prompts()[1];
        assert_eq!(prompt.matches("Title: Paper").count(), 7);
        let positions: Vec<usize> = (1..=7)
            .map(|i| prompt.find(&format!("Title: Paper {i}\n")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!prompt.contains("Paper 8"));
    }

    #[tokio::test]
    async fn synthesis_failure_is_hard() {
        let completion = MockCompletion::with(vec![
            Ok("terms".into()),
            Err(CompletionError::MalformedResponse("no choices".into())),
        ]);
        let literature = MockLiterature::returning(Ok(papers(2)));

        let err = run(&completion, &literature, &request("idea"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::PlanSynthesis(_)));
        assert!(err.to_string().contains("no choices"));
        assert_eq!(literature.captured_queries().len(), 1);
    }
}
