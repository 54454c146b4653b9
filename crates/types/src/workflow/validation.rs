//! Structural validation and cycle detection for workflow documents.
//!
//! Validation never stops at the first problem: every defect in the document
//! is collected so a single `workflow validate` run reports all of them. Each
//! issue carries a stable machine-readable [`ValidationCode`].
//!
//! Workflow-to-workflow references form a directed graph that is checked for
//! cycles with a three-colour depth-first search. Iteration order is sorted by
//! workflow name so the report is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{StepDefect, WorkflowDocument, WorkflowStep};

static WORKFLOW_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("workflow name pattern compiles"));

/// Stable identifiers for validation failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    NoWorkflows,
    InvalidWorkflowName,
    EmptySteps,
    StepNoAction,
    StepEmptyRun,
    #[serde(rename = "step_run_and_workflow")]
    StepConflict,
    StepWithOnRun,
    WorkflowNotFound,
    CyclicReference,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::NoWorkflows => "no_workflows",
            ValidationCode::InvalidWorkflowName => "invalid_workflow_name",
            ValidationCode::EmptySteps => "empty_steps",
            ValidationCode::StepNoAction => "step_no_action",
            ValidationCode::StepEmptyRun => "step_empty_run",
            ValidationCode::StepConflict => "step_run_and_workflow",
            ValidationCode::StepWithOnRun => "step_with_on_run",
            ValidationCode::WorkflowNotFound => "workflow_not_found",
            ValidationCode::CyclicReference => "cyclic_reference",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: ValidationCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    /// 1-based step index, when the issue belongs to a specific step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    pub message: String,
}

impl ValidationIssue {
    fn for_workflow(code: ValidationCode, workflow: &str, message: String) -> Self {
        Self {
            code,
            workflow: Some(workflow.to_string()),
            step: None,
            message,
        }
    }

    fn for_step(code: ValidationCode, workflow: &str, step: usize, message: String) -> Self {
        Self {
            code,
            workflow: Some(workflow.to_string()),
            step: Some(step),
            message,
        }
    }
}

/// Document printed by `workflow validate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates `document`, accumulating every structural error and reference cycle.
pub fn validate_document(document: &WorkflowDocument) -> ValidationReport {
    let mut issues = Vec::new();

    if document.workflows.is_empty() {
        issues.push(ValidationIssue {
            code: ValidationCode::NoWorkflows,
            workflow: None,
            step: None,
            message: "workflow file must define at least one workflow".to_string(),
        });
        return ValidationReport::from_issues(issues);
    }

    let mut names: Vec<&str> = document.workflows.keys().map(String::as_str).collect();
    names.sort_unstable();

    for name in &names {
        if !WORKFLOW_NAME.is_match(name) {
            issues.push(ValidationIssue::for_workflow(
                ValidationCode::InvalidWorkflowName,
                name,
                format!("workflow name \"{name}\" must start with a letter and contain only letters, digits, hyphens, underscores"),
            ));
        }
    }

    for name in &names {
        check_steps(document, name, &mut issues);
    }

    let graph = ReferenceGraph::from_document(document);
    issues.extend(graph.find_cycles());

    ValidationReport::from_issues(issues)
}

fn check_steps(document: &WorkflowDocument, name: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(workflow) = document.workflow(name) else {
        return;
    };

    if workflow.steps.is_empty() {
        issues.push(ValidationIssue::for_workflow(
            ValidationCode::EmptySteps,
            name,
            format!("workflow \"{name}\" must have at least one step"),
        ));
        return;
    }

    for (offset, step) in workflow.steps.iter().enumerate() {
        let index = offset + 1;
        if let WorkflowStep::Invalid(invalid) = step {
            for defect in &invalid.defects {
                let (code, message) = match defect {
                    StepDefect::NoAction => (
                        ValidationCode::StepNoAction,
                        format!("workflow \"{name}\" step {index} must have run or workflow"),
                    ),
                    StepDefect::EmptyRun => (
                        ValidationCode::StepEmptyRun,
                        format!("workflow \"{name}\" step {index} has empty run command"),
                    ),
                    StepDefect::RunAndWorkflow => (
                        ValidationCode::StepConflict,
                        format!("workflow \"{name}\" step {index} has both run and workflow (only one allowed)"),
                    ),
                    StepDefect::WithOnRun => (
                        ValidationCode::StepWithOnRun,
                        format!("workflow \"{name}\" step {index} has 'with' on a run step (only allowed on workflow steps)"),
                    ),
                };
                issues.push(ValidationIssue::for_step(code, name, index, message));
            }
        }
        if let Some(target) = step.target()
            && document.workflow(target).is_none()
        {
            issues.push(ValidationIssue::for_step(
                ValidationCode::WorkflowNotFound,
                name,
                index,
                format!("workflow \"{name}\" step {index} references unknown workflow \"{target}\""),
            ));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Adjacency list of workflow references, keyed and iterated in name order.
struct ReferenceGraph<'a> {
    edges: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> ReferenceGraph<'a> {
    fn from_document(document: &'a WorkflowDocument) -> Self {
        let mut edges: BTreeMap<&'a str, Vec<&'a str>> = BTreeMap::new();
        for (name, workflow) in &document.workflows {
            let targets = edges.entry(name.as_str()).or_default();
            for step in &workflow.steps {
                if let Some(target) = step.target()
                    && let Some((target, _)) = document.workflows.get_key_value(target)
                {
                    targets.push(target.as_str());
                }
            }
        }
        Self { edges }
    }

    /// Runs the three-colour DFS from every unvisited node, reporting one issue per back edge.
    fn find_cycles(&self) -> Vec<ValidationIssue> {
        let mut search = CycleSearch {
            graph: self,
            colors: self.edges.keys().map(|name| (*name, Color::White)).collect(),
            path: Vec::new(),
            issues: Vec::new(),
        };
        for &name in self.edges.keys() {
            if search.colors.get(name) == Some(&Color::White) {
                search.visit(name);
            }
        }
        search.issues
    }
}

struct CycleSearch<'g, 'a> {
    graph: &'g ReferenceGraph<'a>,
    colors: BTreeMap<&'a str, Color>,
    path: Vec<&'a str>,
    issues: Vec<ValidationIssue>,
}

impl<'a> CycleSearch<'_, 'a> {
    fn visit(&mut self, name: &'a str) {
        self.colors.insert(name, Color::Gray);
        self.path.push(name);

        let graph = self.graph;
        let targets = graph.edges.get(name).map(Vec::as_slice).unwrap_or_default();
        for &target in targets {
            match self.colors.get(target).copied().unwrap_or(Color::Black) {
                Color::Gray => self.report_cycle(name, target),
                Color::White => self.visit(target),
                Color::Black => {}
            }
        }

        self.path.pop();
        self.colors.insert(name, Color::Black);
    }

    fn report_cycle(&mut self, from: &str, target: &str) {
        let start = self.path.iter().position(|node| *node == target).unwrap_or(0);
        let mut cycle: Vec<&str> = self.path[start..].to_vec();
        cycle.push(target);
        self.issues.push(ValidationIssue::for_workflow(
            ValidationCode::CyclicReference,
            from,
            format!("cyclic workflow reference: {}", cycle.join(" -> ")),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(json: &str) -> WorkflowDocument {
        serde_json::from_str(json).expect("deserialize workflow document")
    }

    fn codes(report: &ValidationReport) -> Vec<ValidationCode> {
        report.errors.iter().map(|issue| issue.code).collect()
    }

    #[test]
    fn well_formed_document_is_valid() {
        let report = validate_document(&document(
            r#"{"workflows":{"beta":{"steps":["echo hi",{"workflow":"helper"}]},"helper":{"private":true,"steps":["true"]}}}"#,
        ));
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn empty_document_reports_no_workflows() {
        let report = validate_document(&document(r#"{}"#));
        assert!(!report.valid);
        assert_eq!(codes(&report), vec![ValidationCode::NoWorkflows]);
        assert_eq!(report.errors[0].workflow, None);
    }

    #[test]
    fn accumulates_every_structural_error() {
        let report = validate_document(&document(
            r#"{"workflows":{
                "alpha":{"steps":[]},
                "beta":{"steps":[{"name":"orphan"},{"run":"echo","workflow":"alpha"}]},
                "gamma":{"steps":[{"workflow":"missing"}]}
            }}"#,
        ));
        assert!(!report.valid);
        assert_eq!(
            codes(&report),
            vec![
                ValidationCode::EmptySteps,
                ValidationCode::StepNoAction,
                ValidationCode::StepConflict,
                ValidationCode::WorkflowNotFound,
            ]
        );
        assert_eq!(report.errors[1].workflow.as_deref(), Some("beta"));
        assert_eq!(report.errors[1].step, Some(1));
        assert_eq!(report.errors[2].step, Some(2));
    }

    #[test]
    fn detects_two_node_cycle() {
        let report = validate_document(&document(r#"{"workflows":{"a":{"steps":[{"workflow":"b"}]},"b":{"steps":[{"workflow":"a"}]}}}"#));
        assert!(!report.valid);
        assert_eq!(codes(&report), vec![ValidationCode::CyclicReference]);
        let issue = &report.errors[0];
        assert_eq!(issue.workflow.as_deref(), Some("b"));
        assert_eq!(issue.message, "cyclic workflow reference: a -> b -> a");
    }

    #[test]
    fn conflicting_step_reports_each_problem() {
        let report = validate_document(&document(
            r#"{"workflows":{"x":{"steps":[{"run":"echo","workflow":"missing","with":{"A":"1"}}]}}}"#,
        ));
        assert_eq!(
            codes(&report),
            vec![
                ValidationCode::StepConflict,
                ValidationCode::StepWithOnRun,
                ValidationCode::WorkflowNotFound
            ]
        );
        assert!(report.errors.iter().all(|issue| issue.step == Some(1)));
    }

    #[test]
    fn cycle_through_a_conflicting_step_is_reported() {
        let report = validate_document(&document(
            r#"{"workflows":{"a":{"steps":[{"run":"echo","workflow":"b"}]},"b":{"steps":[{"workflow":"a"}]}}}"#,
        ));
        assert_eq!(codes(&report), vec![ValidationCode::StepConflict, ValidationCode::CyclicReference]);
        assert_eq!(report.errors[1].message, "cyclic workflow reference: a -> b -> a");
    }

    #[test]
    fn detects_self_reference() {
        let report = validate_document(&document(r#"{"workflows":{"loop":{"steps":[{"workflow":"loop"}]}}}"#));
        assert_eq!(codes(&report), vec![ValidationCode::CyclicReference]);
        assert!(report.errors[0].message.ends_with("loop -> loop"));
    }

    #[test]
    fn diamond_references_are_not_cycles() {
        let report = validate_document(&document(
            r#"{"workflows":{
                "top":{"steps":[{"workflow":"left"},{"workflow":"right"}]},
                "left":{"steps":[{"workflow":"base"}]},
                "right":{"steps":[{"workflow":"base"}]},
                "base":{"steps":["true"]}
            }}"#,
        ));
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn independent_cycles_and_structural_errors_are_reported_together() {
        let report = validate_document(&document(
            r#"{"workflows":{
                "a":{"steps":[{"workflow":"b"}]},
                "b":{"steps":[{"workflow":"a"}]},
                "c":{"steps":[{"workflow":"d"}]},
                "d":{"steps":[{"workflow":"c"}]},
                "e":{"steps":[]}
            }}"#,
        ));
        assert_eq!(
            codes(&report),
            vec![
                ValidationCode::EmptySteps,
                ValidationCode::CyclicReference,
                ValidationCode::CyclicReference
            ]
        );
    }

    #[test]
    fn rejects_names_that_do_not_start_with_a_letter() {
        let report = validate_document(&document(r#"{"workflows":{"1st":{"steps":["true"]},"ok_name-2":{"steps":["true"]}}}"#));
        assert_eq!(codes(&report), vec![ValidationCode::InvalidWorkflowName]);
        assert_eq!(report.errors[0].workflow.as_deref(), Some("1st"));
    }

    #[test]
    fn codes_serialize_to_stable_strings() {
        let issue = ValidationIssue::for_step(ValidationCode::StepConflict, "x", 3, "msg".into());
        let json = serde_json::to_value(&issue).expect("serialize issue");
        assert_eq!(json["code"], "step_run_and_workflow");
        assert_eq!(json["step"], 3);
        assert_eq!(ValidationCode::CyclicReference.to_string(), "cyclic_reference");
    }
}
