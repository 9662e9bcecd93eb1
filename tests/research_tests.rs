//! Research Engine Integration Tests
//!
//! Drives the full decompose → refine → merge → report pipeline against
//! scripted generators and search engines.

mod common;

use common::mocks::{PromptKind, ScriptedLlm, ScriptedSearch, summarized_query};
use deepsearch::research::{
    BranchRefiner, CallBudget, QueryDecomposer, ResearchCoordinator, ResearchStage,
};
use deepsearch::types::AppError;
use deepsearch::utils::toml_config::ResearchConfig;
use std::time::Duration;

const AI_QUERY: &str = "What are the latest advancements in AI?";

fn coordinator(llm: &ScriptedLlm, search: &ScriptedSearch, config: ResearchConfig) -> ResearchCoordinator {
    ResearchCoordinator::new(Box::new(llm.clone()), Box::new(search.clone()), config)
}

fn sources(outcome: &deepsearch::ResearchOutcome) -> Vec<&str> {
    outcome.findings.iter().map(|f| f.source_query()).collect()
}

// ============= End-to-End Scenarios =============

#[tokio::test]
async fn test_three_branches_depth_two() {
    let llm = ScriptedLlm::research(
        "large language models, AI hardware, AI regulation",
        "deeper question, another angle",
    );
    let search = ScriptedSearch::hits();
    let coordinator = coordinator(&llm, &search, ResearchConfig::default());

    let outcome = coordinator.research_with_depth(AI_QUERY, 2).await.unwrap();

    assert_eq!(outcome.sub_queries.len(), 3);
    assert_eq!(outcome.findings.len(), 6);
    assert_eq!(
        sources(&outcome),
        vec![
            "large language models",
            "deeper question",
            "AI hardware",
            "deeper question",
            "AI regulation",
            "deeper question",
        ]
    );
    assert_eq!(llm.count(PromptKind::Decompose), 1);
    assert_eq!(llm.count(PromptKind::Summarize), 6);
    // The last permitted iteration never asks for follow-ups
    assert_eq!(llm.count(PromptKind::FollowUp), 3);
    assert_eq!(llm.count(PromptKind::Merge), 1);
    assert_eq!(llm.count(PromptKind::Report), 1);
    assert_eq!(search.queries().len(), 6);
    assert_eq!(outcome.calls_used, 1 + 6 + 6 + 3 + 2);
    assert_eq!(outcome.report, "# Final report");
}

#[tokio::test]
async fn test_deep_search_returns_report() {
    let llm = ScriptedLlm::research("a, b", "");
    let search = ScriptedSearch::hits();

    let report = coordinator(&llm, &search, ResearchConfig::default())
        .deep_search(AI_QUERY, 3)
        .await
        .unwrap();

    assert!(!report.is_empty());
    assert_eq!(report, "# Final report");
}

#[tokio::test]
async fn test_empty_decomposition_runs_original_query() {
    let llm = ScriptedLlm::research("", "");
    let search = ScriptedSearch::hits();

    let outcome = coordinator(&llm, &search, ResearchConfig::default())
        .research_with_depth(AI_QUERY, 3)
        .await
        .unwrap();

    assert_eq!(outcome.sub_queries, vec![AI_QUERY.to_string()]);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(search.queries(), vec![AI_QUERY.to_string()]);
}

#[tokio::test]
async fn test_failing_search_still_completes() {
    let llm = ScriptedLlm::research("a, b", "next");
    let search = ScriptedSearch::failing();

    let outcome = coordinator(&llm, &search, ResearchConfig::default())
        .research_with_depth(AI_QUERY, 2)
        .await
        .unwrap();

    assert_eq!(outcome.findings.len(), 4);
    for prompt in llm.prompts_of(PromptKind::Summarize) {
        assert!(prompt.contains("No search results found for query:"));
    }
    assert!(outcome.findings.iter().all(|f| f.urls().is_empty()));
}

#[tokio::test]
async fn test_empty_search_still_produces_finding() {
    let llm = ScriptedLlm::research("only branch", "");
    let search = ScriptedSearch::empty();

    let outcome = coordinator(&llm, &search, ResearchConfig::default())
        .research(AI_QUERY)
        .await
        .unwrap();

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].summary(), "Summary of only branch");
    let summarize = llm.prompts_of(PromptKind::Summarize);
    assert!(summarize[0].contains("No search results found for query: 'only branch'"));
}

// ============= Branch Properties =============

#[tokio::test]
async fn test_depth_bound_is_absolute() {
    let llm = ScriptedLlm::research("single", "always more, and more");
    let search = ScriptedSearch::hits();

    for max_depth in 1..=4 {
        let refiner = BranchRefiner::new(&llm, &search, Duration::from_secs(5));
        let findings = refiner.refine("single", AI_QUERY, max_depth).await.unwrap();
        assert_eq!(findings.len(), max_depth);
    }
}

#[tokio::test]
async fn test_only_first_follow_up_is_pursued() {
    let llm = ScriptedLlm::research("start", "first candidate, second candidate, third");
    let search = ScriptedSearch::hits();

    let refiner = BranchRefiner::new(&llm, &search, Duration::from_secs(5));
    let findings = refiner.refine("start", AI_QUERY, 3).await.unwrap();

    assert_eq!(
        search.queries(),
        vec!["start", "first candidate", "first candidate"]
    );
    assert_eq!(findings[1].source_query(), "first candidate");
}

#[tokio::test]
async fn test_follow_up_prompt_uses_original_query() {
    let llm = ScriptedLlm::research("start", "next");
    let search = ScriptedSearch::hits();

    let refiner = BranchRefiner::new(&llm, &search, Duration::from_secs(5));
    refiner.refine("start", AI_QUERY, 2).await.unwrap();

    let follow_up = &llm.prompts_of(PromptKind::FollowUp)[0];
    assert!(follow_up.contains(&format!("Original question: {}", AI_QUERY)));
    assert!(follow_up.contains("- [start] Summary of start"));
}

#[tokio::test]
async fn test_empty_follow_up_stops_branch() {
    let llm = ScriptedLlm::research("start", "  , ");
    let search = ScriptedSearch::hits();

    let refiner = BranchRefiner::new(&llm, &search, Duration::from_secs(5));
    let findings = refiner.refine("start", AI_QUERY, 5).await.unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].urls(), ["https://example.org/start"]);
}

#[tokio::test]
async fn test_accumulation_is_branch_major() {
    let llm = ScriptedLlm::new(|kind, prompt| {
        Ok(match kind {
            PromptKind::Decompose => "b1, b2".to_string(),
            PromptKind::Summarize => summarized_query(prompt),
            PromptKind::FollowUp if prompt.contains("- [b1]") && !prompt.contains("- [b1b]") => {
                "b1b".to_string()
            }
            PromptKind::FollowUp => String::new(),
            _ => "done".to_string(),
        })
    });
    let search = ScriptedSearch::hits();

    let outcome = coordinator(&llm, &search, ResearchConfig::default())
        .research_with_depth(AI_QUERY, 3)
        .await
        .unwrap();

    assert_eq!(sources(&outcome), vec!["b1", "b1b", "b2"]);

    let merge = &llm.prompts_of(PromptKind::Merge)[0];
    assert!(merge.contains(
        "- b1 (Source: Web Search)\n- b1b (Source: Web Search)\n- b2 (Source: Web Search)\n"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_parallel_branches_keep_branch_order() {
    let llm = ScriptedLlm::research("slow, fast, faster", "")
        .with_delay(PromptKind::Summarize, Duration::from_secs(3));
    let search = ScriptedSearch::hits();
    let config = ResearchConfig {
        parallel_branches: true,
        max_concurrent_branches: 3,
        ..Default::default()
    };

    let outcome = coordinator(&llm, &search, config)
        .research_with_depth(AI_QUERY, 2)
        .await
        .unwrap();

    assert_eq!(sources(&outcome), vec!["slow", "fast", "faster"]);
}

// ============= Decomposition =============

#[tokio::test]
async fn test_decomposer_never_returns_empty() {
    for output in ["", "   ", ",,,", " , \n , "] {
        let llm = ScriptedLlm::research(output, "");
        let decomposer = QueryDecomposer::new(&llm, 5, Duration::from_secs(5));
        assert_eq!(
            decomposer.decompose("rust ownership").await.unwrap(),
            vec!["rust ownership"]
        );
    }
}

#[tokio::test]
async fn test_decomposer_caps_sub_queries() {
    let llm = ScriptedLlm::research("a, b, c, d, e, f, g", "");
    let decomposer = QueryDecomposer::new(&llm, 5, Duration::from_secs(5));

    let sub_queries = decomposer.decompose("q").await.unwrap();
    assert_eq!(sub_queries, vec!["a", "b", "c", "d", "e"]);
}

// ============= Failure Propagation =============

async fn failure_stage(kind: PromptKind) -> (ResearchStage, String) {
    let llm = ScriptedLlm::failing_at("alpha, beta", "gamma", kind);
    let search = ScriptedSearch::hits();

    let err = coordinator(&llm, &search, ResearchConfig::default())
        .research_with_depth(AI_QUERY, 2)
        .await
        .unwrap_err();

    match err {
        AppError::WorkflowAborted { stage, query, source } => {
            assert!(matches!(*source, AppError::LLM(_)));
            (stage, query)
        }
        other => panic!("Expected WorkflowAborted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generation_failures_abort_with_context() {
    assert_eq!(
        failure_stage(PromptKind::Decompose).await,
        (ResearchStage::Decomposing, AI_QUERY.to_string())
    );
    assert_eq!(
        failure_stage(PromptKind::Summarize).await,
        (ResearchStage::BranchIterating, "alpha".to_string())
    );
    assert_eq!(
        failure_stage(PromptKind::FollowUp).await,
        (ResearchStage::BranchIterating, "alpha".to_string())
    );
    assert_eq!(
        failure_stage(PromptKind::Merge).await,
        (ResearchStage::Merging, AI_QUERY.to_string())
    );
    assert_eq!(
        failure_stage(PromptKind::Report).await,
        (ResearchStage::Reporting, AI_QUERY.to_string())
    );
}

#[tokio::test]
async fn test_invalid_input() {
    let llm = ScriptedLlm::research("a", "");
    let search = ScriptedSearch::hits();
    let coordinator = coordinator(&llm, &search, ResearchConfig::default());

    assert!(matches!(
        coordinator.deep_search("  \n", 2).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        coordinator.deep_search(AI_QUERY, 0).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(llm.prompts().is_empty());
}

// ============= Deadlines =============

fn short_deadline() -> ResearchConfig {
    ResearchConfig {
        call_timeout_secs: 1,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_search_timeout_degrades_to_empty_results() {
    let llm = ScriptedLlm::research("a", "");
    let search = ScriptedSearch::hanging();

    let outcome = coordinator(&llm, &search, short_deadline())
        .research(AI_QUERY)
        .await
        .unwrap();

    assert_eq!(outcome.findings.len(), 1);
    assert!(llm.prompts_of(PromptKind::Summarize)[0].contains("No search results found"));
}

#[tokio::test(start_paused = true)]
async fn test_follow_up_timeout_is_branch_local() {
    let llm = ScriptedLlm::research("a, b", "more")
        .with_delay(PromptKind::FollowUp, Duration::from_secs(30));
    let search = ScriptedSearch::hits();

    let outcome = coordinator(&llm, &search, short_deadline())
        .research_with_depth(AI_QUERY, 3)
        .await
        .unwrap();

    assert_eq!(sources(&outcome), vec!["a", "b"]);
    assert_eq!(outcome.report, "# Final report");
}

#[tokio::test(start_paused = true)]
async fn test_summary_timeout_aborts() {
    let llm = ScriptedLlm::research("a", "")
        .with_delay(PromptKind::Summarize, Duration::from_secs(30));
    let search = ScriptedSearch::hits();

    let err = coordinator(&llm, &search, short_deadline())
        .research(AI_QUERY)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(ResearchStage::BranchIterating));
    match err {
        AppError::WorkflowAborted { source, .. } => {
            assert!(matches!(*source, AppError::Timeout { seconds: 1, .. }))
        }
        other => panic!("Expected WorkflowAborted, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_late_summary_timeout_keeps_branch_findings() {
    let llm = ScriptedLlm::research("a, b", "slow topic").with_delay_matching(
        PromptKind::Summarize,
        "\"slow topic\"",
        Duration::from_secs(30),
    );
    let search = ScriptedSearch::hits();

    let outcome = coordinator(&llm, &search, short_deadline())
        .research_with_depth(AI_QUERY, 3)
        .await
        .unwrap();

    // Each branch keeps its first finding and stops at the slow follow-up
    assert_eq!(sources(&outcome), vec!["a", "b"]);
    assert_eq!(search.queries(), vec!["a", "slow topic", "b", "slow topic"]);
    assert_eq!(outcome.report, "# Final report");
    assert_eq!(
        outcome.calls_used,
        llm.prompts().len() + search.queries().len()
    );
}

// ============= Call Budget =============

#[tokio::test]
async fn test_binding_budget_still_covers_every_sub_query() {
    for parallel_branches in [false, true] {
        let llm = ScriptedLlm::research("a, b, c, d, e", "more");
        let search = ScriptedSearch::hits();
        let config = ResearchConfig {
            parallel_branches,
            ..Default::default()
        };

        let outcome = coordinator(&llm, &search, config)
            .research_with_depth("q", 6)
            .await
            .unwrap();

        // 3 fixed + 5 first iterations leave room for 17 deeper ones
        assert_eq!(outcome.sub_queries, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(outcome.findings.len(), 22, "parallel: {}", parallel_branches);
        assert_eq!(outcome.calls_used, 64);
        assert_eq!(llm.prompts().len() + search.queries().len(), 64);

        let first_findings: Vec<&str> = sources(&outcome)
            .into_iter()
            .filter(|source| *source != "more")
            .collect();
        assert_eq!(first_findings, vec!["a", "b", "c", "d", "e"]);
    }
}

#[tokio::test]
async fn test_sequential_deeper_iterations_drawn_in_branch_order() {
    let llm = ScriptedLlm::research("a, b, c, d, e", "more");
    let search = ScriptedSearch::hits();

    let outcome = coordinator(&llm, &search, ResearchConfig::default())
        .research_with_depth("q", 6)
        .await
        .unwrap();

    let mut expected = Vec::new();
    for (branch, deeper) in [("a", 5), ("b", 5), ("c", 5), ("d", 2), ("e", 0)] {
        expected.push(branch);
        expected.extend(std::iter::repeat_n("more", deeper));
    }
    assert_eq!(sources(&outcome), expected);
}

#[tokio::test]
async fn test_budget_drops_trailing_sub_queries_it_cannot_cover() {
    let llm = ScriptedLlm::research("a, b, c, d, e", "more");
    let search = ScriptedSearch::hits();
    let config = ResearchConfig {
        max_total_calls: 10,
        ..Default::default()
    };

    let outcome = coordinator(&llm, &search, config)
        .research_with_depth(AI_QUERY, 3)
        .await
        .unwrap();

    assert_eq!(outcome.sub_queries, vec!["a", "b", "c"]);
    assert_eq!(sources(&outcome), vec!["a", "b", "c"]);
    assert_eq!(llm.count(PromptKind::FollowUp), 0);
    assert_eq!(outcome.calls_used, 9);
    assert_eq!(llm.prompts().len() + search.queries().len(), 9);
}

#[tokio::test]
async fn test_budget_never_exceeded() {
    for limit in [6, 7, 10, 13, 20] {
        let llm = ScriptedLlm::research("a, b, c, d", "x, y");
        let search = ScriptedSearch::hits();
        let config = ResearchConfig {
            max_total_calls: limit,
            ..Default::default()
        };

        let outcome = coordinator(&llm, &search, config)
            .research_with_depth(AI_QUERY, 3)
            .await
            .unwrap();

        let actual = llm.prompts().len() + search.queries().len();
        assert!(actual <= limit, "{} calls with limit {}", actual, limit);
        assert_eq!(outcome.calls_used, actual);

        let found = sources(&outcome);
        for sub_query in &outcome.sub_queries {
            assert!(found.contains(&sub_query.as_str()), "{} has no finding", sub_query);
        }
    }
}

#[tokio::test]
async fn test_refiner_with_spent_budget_keeps_first_iteration() {
    let llm = ScriptedLlm::research("a", "b");
    let search = ScriptedSearch::hits();
    let budget = CallBudget::new(0);

    let refiner = BranchRefiner::new(&llm, &search, Duration::from_secs(5)).with_budget(&budget);
    let findings = refiner.refine("a", AI_QUERY, 3).await.unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].source_query(), "a");
    assert_eq!(search.queries(), vec!["a"]);
    assert_eq!(llm.count(PromptKind::FollowUp), 0);
}

#[tokio::test]
async fn test_empty_follow_up_returns_reserved_calls() {
    let llm = ScriptedLlm::research("a", "");
    let search = ScriptedSearch::hits();
    let budget = CallBudget::new(10);

    let refiner = BranchRefiner::new(&llm, &search, Duration::from_secs(5)).with_budget(&budget);
    let findings = refiner.refine("a", AI_QUERY, 3).await.unwrap();

    assert_eq!(findings.len(), 1);
    // Only the follow-up generation was charged
    assert_eq!(budget.used(), 1);
}

// ============= Outcome =============

#[tokio::test]
async fn test_outcome_serializes() {
    let llm = ScriptedLlm::research("a", "");
    let search = ScriptedSearch::hits();

    let outcome = coordinator(&llm, &search, ResearchConfig::default())
        .research(AI_QUERY)
        .await
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["query"], AI_QUERY);
    assert_eq!(json["consolidated"], "Consolidated findings");
    assert_eq!(json["findings"][0]["source_label"], "Web Search");
    assert_eq!(json["findings"][0]["urls"][0], "https://example.org/a");
    assert!(json["run_id"].is_string());
}
