//! # Export Module
//!
//! CSV and JSON rendering of collected feedback, and the research export
//! that joins judgments with the click log for offline evaluation of the
//! relevance heuristic.

use crate::errors::Result;
use crate::storage::{ClickEntry, FeedbackEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One feedback judgment joined with click information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchExportEntry {
    pub query_id: String,
    pub query_text: String,
    pub decision_id: String,
    pub decision_title: String,
    pub court: String,
    pub date: String,
    pub system_relevance_score: u32,
    pub user_feedback: crate::storage::FeedbackValue,
    pub matched_terms: Vec<String>,
    pub clicked: bool,
    pub timestamp: i64,
}

/// Quote a CSV field when it contains a comma, quote, or newline, doubling
/// embedded quotes
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render feedback entries as CSV with a fixed header row
pub fn feedback_to_csv(entries: &[FeedbackEntry]) -> String {
    let headers = [
        "queryId",
        "decisionId",
        "value",
        "timestamp",
        "queryText",
        "decisionTitle",
        "court",
        "date",
        "scoreAtTime",
        "matchedTerms",
    ];

    let mut lines = vec![headers.join(",")];
    for entry in entries {
        let row = [
            entry.query_id.clone(),
            entry.decision_id.clone(),
            entry.value.to_string(),
            entry.timestamp.to_string(),
            escape_csv(&entry.query_text),
            escape_csv(&entry.decision_title),
            escape_csv(&entry.court),
            escape_csv(&entry.date),
            entry.score_at_time.to_string(),
            escape_csv(&entry.matched_terms.join("; ")),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// Render feedback entries as pretty-printed JSON
pub fn feedback_to_json(entries: &[FeedbackEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Join feedback with the click log. An entry is marked clicked when any
/// click exists for its (query id, decision id) pair.
pub fn build_research_export(
    feedback: &[FeedbackEntry],
    clicks: &[ClickEntry],
) -> Vec<ResearchExportEntry> {
    let clicked_pairs: HashSet<(&str, &str)> = clicks
        .iter()
        .map(|c| (c.query_id.as_str(), c.decision_id.as_str()))
        .collect();

    feedback
        .iter()
        .map(|entry| ResearchExportEntry {
            query_id: entry.query_id.clone(),
            query_text: entry.query_text.clone(),
            decision_id: entry.decision_id.clone(),
            decision_title: entry.decision_title.clone(),
            court: entry.court.clone(),
            date: entry.date.clone(),
            system_relevance_score: entry.score_at_time,
            user_feedback: entry.value,
            matched_terms: entry.matched_terms.clone(),
            clicked: clicked_pairs
                .contains(&(entry.query_id.as_str(), entry.decision_id.as_str())),
            timestamp: entry.timestamp,
        })
        .collect()
}

/// Render research export entries as CSV with a fixed header row
pub fn research_to_csv(entries: &[ResearchExportEntry]) -> String {
    let headers = [
        "queryId",
        "queryText",
        "decisionId",
        "decisionTitle",
        "court",
        "date",
        "systemRelevanceScore",
        "userFeedback",
        "matchedTerms",
        "clicked",
        "timestamp",
    ];

    let mut lines = vec![headers.join(",")];
    for entry in entries {
        let row = [
            entry.query_id.clone(),
            escape_csv(&entry.query_text),
            entry.decision_id.clone(),
            escape_csv(&entry.decision_title),
            escape_csv(&entry.court),
            escape_csv(&entry.date),
            entry.system_relevance_score.to_string(),
            entry.user_feedback.to_string(),
            escape_csv(&entry.matched_terms.join("; ")),
            entry.clicked.to_string(),
            entry.timestamp.to_string(),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// Render research export entries as pretty-printed JSON
pub fn research_to_json(entries: &[ResearchExportEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FeedbackValue;

    fn entry(query_id: &str, decision_id: &str) -> FeedbackEntry {
        FeedbackEntry {
            query_id: query_id.to_string(),
            decision_id: decision_id.to_string(),
            value: FeedbackValue::Relevant,
            timestamp: 1_700_000_000_000,
            query_text: "vadeli, \"future\" işlemi".to_string(),
            decision_title: "Vadeli döviz\nalım-satım".to_string(),
            court: "Yargıtay 11. Hukuk Dairesi".to_string(),
            date: "2022-03-14".to_string(),
            score_at_time: 68,
            matched_terms: vec!["vadeli".to_string(), "future".to_string()],
        }
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_feedback_csv_shape() {
        let csv = feedback_to_csv(&[entry("q1", "d1")]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "queryId,decisionId,value,timestamp,queryText,decisionTitle,court,date,scoreAtTime,matchedTerms"
        );
        // The title field carries an embedded newline inside its quotes, so
        // the record spans two physical lines.
        let row = lines.next().unwrap();
        assert!(row.starts_with("q1,d1,relevant,1700000000000,"));
        assert!(row.contains("\"vadeli, \"\"future\"\" işlemi\""));
        assert!(csv.contains("\"Vadeli döviz\nalım-satım\""));
        assert!(csv.contains("vadeli; future"));
    }

    #[test]
    fn test_feedback_json_round_trip() {
        let entries = vec![entry("q1", "d1"), entry("q2", "d2")];
        let json = feedback_to_json(&entries).unwrap();
        let parsed: Vec<FeedbackEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_research_export_join_marks_clicks() {
        let feedback = vec![entry("q1", "d1"), entry("q1", "d2")];
        let clicks = vec![ClickEntry {
            query_id: "q1".to_string(),
            decision_id: "d1".to_string(),
            timestamp: 1_700_000_000_500,
        }];

        let export = build_research_export(&feedback, &clicks);
        assert_eq!(export.len(), 2);
        assert!(export[0].clicked);
        assert!(!export[1].clicked);
        assert_eq!(export[0].system_relevance_score, 68);

        let csv = research_to_csv(&export);
        assert!(csv.lines().next().unwrap().ends_with("clicked,timestamp"));
        assert!(csv.contains(",true,"));
        assert!(csv.contains(",false,"));
    }
}
