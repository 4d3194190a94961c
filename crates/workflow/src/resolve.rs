//! `resolveVariables` (spec.md §4.C12): deep-copies a workflow and
//! substitutes every `{{name}}` token recursively in step descriptions, all
//! string values inside params (nested into arrays/objects), and
//! verification strings. All missing variable names are collected before
//! raising a single error naming the complete set.

use std::collections::{BTreeSet, HashMap};

use core_types::{StepDef, WorkflowDefinition};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::errors::WorkflowError;

fn token_pattern() -> Regex {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("token pattern is a valid regex literal")
}

pub fn resolve_variables(
    workflow: &WorkflowDefinition,
    values: &HashMap<String, String>,
) -> Result<WorkflowDefinition, WorkflowError> {
    let token_re = token_pattern();
    let mut missing = BTreeSet::new();

    let mut resolved = workflow.clone();
    resolved.description = substitute_text(&token_re, &workflow.description, values, &mut missing);
    resolved.steps = workflow
        .steps
        .iter()
        .map(|step| substitute_step(&token_re, step, values, &mut missing))
        .collect();
    if let Some(loop_def) = resolved.loops.as_mut() {
        loop_def.steps_in_loop = workflow
            .loops
            .as_ref()
            .expect("loops is Some because resolved.loops was cloned from it")
            .steps_in_loop
            .iter()
            .map(|step| substitute_step(&token_re, step, values, &mut missing))
            .collect();
    }

    if !missing.is_empty() {
        let names: Vec<String> = missing.into_iter().collect();
        return Err(WorkflowError::UnresolvedVariables(names.join(", ")));
    }

    Ok(resolved)
}

fn substitute_text(
    re: &Regex,
    text: &str,
    values: &HashMap<String, String>,
    missing: &mut BTreeSet<String>,
) -> String {
    re.replace_all(text, |caps: &Captures| match values.get(&caps[1]) {
        Some(value) => value.clone(),
        None => {
            missing.insert(caps[1].to_string());
            caps[0].to_string()
        }
    })
    .into_owned()
}

fn substitute_value(
    re: &Regex,
    value: &Value,
    values: &HashMap<String, String>,
    missing: &mut BTreeSet<String>,
) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_text(re, s, values, missing)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(re, item, values, missing))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key.clone(), substitute_value(re, value, values, missing));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn substitute_step(
    re: &Regex,
    step: &StepDef,
    values: &HashMap<String, String>,
    missing: &mut BTreeSet<String>,
) -> StepDef {
    StepDef {
        id: step.id.clone(),
        description: substitute_text(re, &step.description, values, missing),
        application: step.application.clone(),
        layer: step.layer.clone(),
        action: step.action.clone(),
        params: substitute_value(re, &step.params, values, missing),
        output: step.output.clone(),
        verification: step
            .verification
            .as_ref()
            .map(|v| substitute_text(re, v, values, missing)),
        fallback_layer: step.fallback_layer.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::VariableDef;
    use serde_json::json;

    fn workflow() -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf1".to_string(),
            name: "Fill form".to_string(),
            description: "Fill the form for {{customer}}".to_string(),
            applications: vec!["Browser".to_string()],
            variables: vec![VariableDef {
                name: "customer".to_string(),
                description: "Customer name".to_string(),
                source: "user".to_string(),
                kind: "string".to_string(),
            }],
            steps: vec![StepDef {
                id: "s1".to_string(),
                description: "Type {{customer}} into the name field".to_string(),
                application: Some("Browser".to_string()),
                layer: "browser".to_string(),
                action: "type".to_string(),
                params: json!({ "ref": "e1", "text": "Hello {{customer}}" }),
                output: None,
                verification: Some("field shows {{customer}}".to_string()),
                fallback_layer: None,
            }],
            loops: None,
            rules: vec![],
        }
    }

    #[test]
    fn substitutes_every_occurrence_when_value_present() {
        let mut values = HashMap::new();
        values.insert("customer".to_string(), "Acme Corp".to_string());

        let resolved = resolve_variables(&workflow(), &values).unwrap();
        assert_eq!(resolved.description, "Fill the form for Acme Corp");
        assert_eq!(resolved.steps[0].description, "Type Acme Corp into the name field");
        assert_eq!(
            resolved.steps[0].params.get("text").and_then(Value::as_str),
            Some("Hello Acme Corp")
        );
        assert_eq!(resolved.steps[0].verification.as_deref(), Some("field shows Acme Corp"));
    }

    #[test]
    fn missing_variable_names_the_complete_set() {
        let values = HashMap::new();
        let err = resolve_variables(&workflow(), &values).unwrap_err();
        match err {
            WorkflowError::UnresolvedVariables(names) => assert_eq!(names, "customer"),
        }
    }

    #[test]
    fn resolution_is_idempotent_once_every_variable_is_supplied() {
        let mut values = HashMap::new();
        values.insert("customer".to_string(), "Acme Corp".to_string());

        let once = resolve_variables(&workflow(), &values).unwrap();
        let twice = resolve_variables(&once, &values).unwrap();
        assert_eq!(once.description, twice.description);
        assert_eq!(once.steps[0].params, twice.steps[0].params);
    }

    #[test]
    fn collects_every_missing_name_across_multiple_steps() {
        let mut wf = workflow();
        wf.steps.push(StepDef {
            id: "s2".to_string(),
            description: "Submit for {{approver}}".to_string(),
            application: None,
            layer: "browser".to_string(),
            action: "click".to_string(),
            params: json!({}),
            output: None,
            verification: None,
            fallback_layer: None,
        });
        let err = resolve_variables(&wf, &HashMap::new()).unwrap_err();
        match err {
            WorkflowError::UnresolvedVariables(names) => {
                assert!(names.contains("customer"));
                assert!(names.contains("approver"));
            }
        }
    }
}
