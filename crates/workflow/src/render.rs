//! `formatWorkflowAsGoal` (spec.md §4.C12): renders a [`WorkflowDefinition`]
//! as plain text suitable for feeding to the agent loop (C10) as its `goal`
//! string.

use core_types::{RuleDef, StepDef, WorkflowDefinition};

pub fn format_workflow_as_goal(workflow: &WorkflowDefinition) -> String {
    let mut out = String::new();

    out.push_str(&format!("Workflow: {}\n", workflow.name));
    if !workflow.description.is_empty() {
        out.push_str(&format!("{}\n", workflow.description));
    }
    if !workflow.applications.is_empty() {
        out.push_str(&format!("Applications: {}\n", workflow.applications.join(", ")));
    }

    if !workflow.variables.is_empty() {
        out.push_str("\nVariables:\n");
        for variable in &workflow.variables {
            out.push_str(&format!(
                "  - {} ({}, from {}): {}\n",
                variable.name, variable.kind, variable.source, variable.description
            ));
        }
    }

    out.push_str("\nSteps:\n");
    for (i, step) in workflow.steps.iter().enumerate() {
        render_step(&mut out, i + 1, step, 0);
    }

    if let Some(loop_def) = &workflow.loops {
        out.push_str(&format!(
            "\nLoop: for each {} in {} (over {}):\n",
            loop_def.variable, loop_def.source, loop_def.over
        ));
        for (i, step) in loop_def.steps_in_loop.iter().enumerate() {
            render_step(&mut out, i + 1, step, 1);
        }
    }

    if !workflow.rules.is_empty() {
        out.push_str("\nRules:\n");
        for rule in &workflow.rules {
            render_rule(&mut out, rule);
        }
    }

    out
}

fn render_step(out: &mut String, index: usize, step: &StepDef, indent: usize) {
    let pad = "  ".repeat(indent + 1);
    out.push_str(&format!(
        "{pad}{index}. [{}.{}] {}\n",
        step.layer, step.action, step.description
    ));
    if let Some(app) = &step.application {
        out.push_str(&format!("{pad}   application: {app}\n"));
    }
    if !step.params.is_null() {
        out.push_str(&format!("{pad}   params: {}\n", step.params));
    }
    if let Some(verification) = &step.verification {
        out.push_str(&format!("{pad}   verification: {verification}\n"));
    }
    if let Some(fallback) = &step.fallback_layer {
        out.push_str(&format!("{pad}   fallback layer: {fallback}\n"));
    }
}

fn render_rule(out: &mut String, rule: &RuleDef) {
    out.push_str(&format!(
        "  - when {}: {} (source: {})\n",
        rule.condition, rule.action, rule.source
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{LoopDef, RuleDef, VariableDef};
    use serde_json::json;

    fn sample_workflow() -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf1".to_string(),
            name: "Process invoices".to_string(),
            description: "Download and file each invoice.".to_string(),
            applications: vec!["Mail".to_string(), "Finder".to_string()],
            variables: vec![VariableDef {
                name: "month".to_string(),
                description: "Target month".to_string(),
                source: "user".to_string(),
                kind: "string".to_string(),
            }],
            steps: vec![StepDef {
                id: "s1".to_string(),
                description: "Open Mail".to_string(),
                application: Some("Mail".to_string()),
                layer: "shell".to_string(),
                action: "launch_app".to_string(),
                params: json!({ "app": "Mail" }),
                output: None,
                verification: Some("Mail window visible".to_string()),
                fallback_layer: None,
            }],
            loops: Some(LoopDef {
                over: "invoices".to_string(),
                source: "mail_search".to_string(),
                variable: "invoice".to_string(),
                steps_in_loop: vec![StepDef {
                    id: "l1".to_string(),
                    description: "Save attachment".to_string(),
                    application: None,
                    layer: "accessibility".to_string(),
                    action: "press_button".to_string(),
                    params: json!({ "ref": "ax_1" }),
                    output: None,
                    verification: None,
                    fallback_layer: Some("vision".to_string()),
                }],
            }),
            rules: vec![RuleDef {
                condition: "attachment missing".to_string(),
                action: "skip".to_string(),
                source: "policy".to_string(),
            }],
        }
    }

    #[test]
    fn rendering_includes_every_section() {
        let text = format_workflow_as_goal(&sample_workflow());
        assert!(text.contains("Workflow: Process invoices"));
        assert!(text.contains("Applications: Mail, Finder"));
        assert!(text.contains("Variables:"));
        assert!(text.contains("month"));
        assert!(text.contains("[shell.launch_app] Open Mail"));
        assert!(text.contains("Loop: for each invoice in mail_search (over invoices):"));
        assert!(text.contains("[accessibility.press_button] Save attachment"));
        assert!(text.contains("fallback layer: vision"));
        assert!(text.contains("Rules:"));
        assert!(text.contains("when attachment missing: skip (source: policy)"));
    }

    #[test]
    fn loop_steps_are_indented_deeper_than_top_level_steps() {
        let text = format_workflow_as_goal(&sample_workflow());
        let top_level_line = text.lines().find(|l| l.contains("Open Mail")).unwrap();
        let loop_line = text.lines().find(|l| l.contains("Save attachment")).unwrap();
        let top_indent = top_level_line.len() - top_level_line.trim_start().len();
        let loop_indent = loop_line.len() - loop_line.trim_start().len();
        assert!(loop_indent > top_indent);
    }
}
