//! Prompt builders and the query-list parser.
//!
//! Generator output is never trusted to follow a format. Everything that has to
//! be read back (sub-queries, follow-ups) goes through [`parse_query_list`],
//! whose grammar is deliberately tiny: trim the whole response, split on
//! commas, trim each entry, drop the empty ones.

use crate::research::findings::Finding;
use std::fmt::Write;

/// Follow-up candidates requested per iteration. Only the first is used.
pub const FOLLOW_UP_CANDIDATES: usize = 3;

/// Parse a comma-delimited list of queries.
pub fn parse_query_list(raw: &str) -> Vec<String> {
    raw.trim()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

pub fn decompose_prompt(user_query: &str, max_sub_queries: usize) -> String {
    let max = max_sub_queries.max(1);
    let min = max.min(3);
    format!(
        r#"You are planning a web research task.
Break the question below into {min} to {max} diverse, specific web search queries that together cover it from different angles.

Question: {user_query}

Return ONLY the search queries as one comma-separated list on a single line.
Do not number them and do not add any other text."#
    )
}

pub fn summarize_prompt(query: &str, rendered_results: &str) -> String {
    format!(
        r#"Summarize the search results below for the query "{query}".
Keep only facts that help answer the query and mention the URLs they come from.
If there are no useful results, say so in one sentence.

{rendered_results}

Summary:"#
    )
}

pub fn follow_up_prompt(original_query: &str, findings: &[Finding]) -> String {
    let mut notes = String::new();
    for finding in findings {
        let _ = writeln!(notes, "- [{}] {}", finding.source_query(), finding.summary());
    }

    format!(
        r#"You are deepening a research branch.
Original question: {original_query}

Findings so far:
{notes}
Suggest up to {FOLLOW_UP_CANDIDATES} follow-up web search queries that would fill the most important remaining gaps.
Return ONLY a comma-separated list of queries on a single line.
Return nothing at all if the findings already answer the question."#
    )
}

pub fn merge_prompt(findings: &[Finding]) -> String {
    let mut bullets = String::new();
    for finding in findings {
        let _ = writeln!(bullets, "{}", finding.bullet());
    }

    let mut sources = String::new();
    let mut seen = Vec::new();
    for url in findings.iter().flat_map(|f| f.urls()) {
        if !seen.contains(&url) {
            let _ = writeln!(sources, "- {}", url);
            seen.push(url);
        }
    }
    if sources.is_empty() {
        sources.push_str("(none)\n");
    }

    format!(
        r#"Consolidate the research findings below into one coherent findings document.
Merge duplicate points and resolve contradictions, noting which claim is better supported.
Organize the result by theme. If there are no findings, say that nothing was found.

Findings:
{bullets}
Source URLs:
{sources}"#
    )
}

pub fn report_prompt(consolidated: &str, original_query: &str) -> String {
    format!(
        r#"Write a research report that answers the question: {original_query}

Use only the consolidated findings below. Structure the report with a short
summary, sections for the main themes, and a closing list of sources. Cite the
source URLs inline wherever the findings provide them.

Consolidated findings:
{consolidated}"#
    )
}
