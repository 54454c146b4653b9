//! Workflow listing.

use asc_types::{WorkflowDocument, WorkflowSummary};

/// Summaries of the document's workflows sorted by name; private ones only when `include_private`.
pub fn list_workflows(document: &WorkflowDocument, include_private: bool) -> Vec<WorkflowSummary> {
    let mut summaries: Vec<WorkflowSummary> = document
        .workflows
        .iter()
        .filter(|(_, workflow)| include_private || !workflow.private)
        .map(|(name, workflow)| WorkflowSummary {
            name: name.clone(),
            description: workflow.description.clone().filter(|description| !description.trim().is_empty()),
            private: workflow.private,
            step_count: workflow.steps.len(),
        })
        .collect();
    summaries.sort_by(|left, right| left.name.cmp(&right.name));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::document::parse_document;

    fn names(summaries: &[WorkflowSummary]) -> Vec<&str> {
        summaries.iter().map(|summary| summary.name.as_str()).collect()
    }

    #[test]
    fn sorts_by_name_and_hides_private_workflows() {
        let document = parse_document(
            r#"{"workflows":{
                "release":{"description":"Ship it","steps":["echo r"]},
                "helper":{"private":true,"steps":["echo h"]},
                "alpha":{"steps":["echo a","echo b"]}
            }}"#,
        )
        .expect("parse document");

        let visible = list_workflows(&document, false);
        assert_eq!(names(&visible), vec!["alpha", "release"]);
        assert_eq!(visible[0].step_count, 2);
        assert_eq!(visible[1].description.as_deref(), Some("Ship it"));

        let all = list_workflows(&document, true);
        assert_eq!(names(&all), vec!["alpha", "helper", "release"]);
        assert!(all[1].private);
        assert!(visible.iter().all(|summary| all.contains(summary)));
    }

    #[test]
    fn all_flag_changes_nothing_without_private_workflows() {
        let document = parse_document(r#"{"workflows":{"b":{"steps":["true"]},"a":{"steps":["true"]}}}"#).expect("parse document");
        assert_eq!(list_workflows(&document, false), list_workflows(&document, true));
    }
}
