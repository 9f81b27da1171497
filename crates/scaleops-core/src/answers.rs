//! Worksheet answers and the form field collector.
//!
//! Labels come from the configured [`WorksheetSchema`], never from the shape
//! of whatever form the values were typed into.

use crate::error::{Result, ScaleOpsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetAnswer {
    pub field_id: String,
    pub label: String,
    pub value: String,
}

/// Answers for one item, keyed by field id.
pub type Answers = BTreeMap<String, WorksheetAnswer>;

/// Raw form state: field id to whatever text is currently entered.
pub type FormModel = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(id: &str, label: &str, required: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            placeholder: None,
            required,
        }
    }

    /// Label, else placeholder, else the field id.
    pub fn display_label(&self) -> &str {
        if !self.label.trim().is_empty() {
            return &self.label;
        }
        match &self.placeholder {
            Some(p) if !p.trim().is_empty() => p,
            _ => &self.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksheetSchema {
    pub fields: Vec<FieldSpec>,
}

impl Default for WorksheetSchema {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldSpec::new("who", "Who is your target customer?", true),
                FieldSpec::new("what", "What problem do they have today?", true),
                FieldSpec::new("why", "Why does solving it matter now?", false),
                FieldSpec::new("how", "How does your offer solve it?", false),
            ],
        }
    }
}

impl WorksheetSchema {
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn label_for<'a>(&'a self, field_id: &'a str) -> &'a str {
        self.field(field_id)
            .map(FieldSpec::display_label)
            .unwrap_or(field_id)
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Collect every non-blank form value into answers labelled from `schema`.
///
/// Blank fields are omitted rather than stored as empty strings. Fields the
/// schema does not know about are kept with their id as the label.
pub fn collect(schema: &WorksheetSchema, form: &FormModel) -> Answers {
    form.iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(field_id, value)| {
            let answer = WorksheetAnswer {
                field_id: field_id.clone(),
                label: schema.label_for(field_id).to_string(),
                value: value.clone(),
            };
            (field_id.clone(), answer)
        })
        .collect()
}

/// Ids of required schema fields with no answer, in schema order.
pub fn missing_required(schema: &WorksheetSchema, answers: &Answers) -> Vec<String> {
    schema
        .fields
        .iter()
        .filter(|f| f.required && !answers.contains_key(&f.id))
        .map(|f| f.id.clone())
        .collect()
}

pub fn validate_required(schema: &WorksheetSchema, answers: &Answers) -> Result<()> {
    let missing = missing_required(schema, answers);
    if missing.is_empty() {
        return Ok(());
    }
    Err(ScaleOpsError::Validation(format!(
        "missing required answers: {}",
        missing.join(", ")
    )))
}

/// Inverse of [`collect`], used to prefill a form from saved answers.
pub fn to_form(answers: &Answers) -> FormModel {
    answers
        .iter()
        .map(|(id, a)| (id.clone(), a.value.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormModel {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn collect_uses_schema_labels() {
        let schema = WorksheetSchema::default();
        let answers = collect(&schema, &form(&[("who", "B2B SaaS founders")]));
        let who = &answers["who"];
        assert_eq!(who.label, "Who is your target customer?");
        assert_eq!(who.value, "B2B SaaS founders");
        assert_eq!(who.field_id, "who");
    }

    #[test]
    fn collect_omits_blank_fields() {
        let schema = WorksheetSchema::default();
        let answers = collect(
            &schema,
            &form(&[("who", "founders"), ("what", ""), ("why", "   \n")]),
        );
        assert_eq!(answers.len(), 1);
        assert!(!answers.contains_key("what"));
        assert!(!answers.contains_key("why"));
    }

    #[test]
    fn collect_empty_form_is_empty() {
        let answers = collect(&WorksheetSchema::default(), &FormModel::new());
        assert!(answers.is_empty());
    }

    #[test]
    fn label_falls_back_to_placeholder_then_id() {
        let schema = WorksheetSchema {
            fields: vec![FieldSpec {
                id: "pain".to_string(),
                label: String::new(),
                placeholder: Some("Describe the pain".to_string()),
                required: false,
            }],
        };
        let answers = collect(&schema, &form(&[("pain", "churn"), ("extra", "x")]));
        assert_eq!(answers["pain"].label, "Describe the pain");
        assert_eq!(answers["extra"].label, "extra");
    }

    #[test]
    fn validate_required_lists_missing_fields() {
        let schema = WorksheetSchema::default();
        let answers = collect(&schema, &form(&[("why", "budget season")]));
        let err = validate_required(&schema, &answers).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("who"), "{msg}");
        assert!(msg.contains("what"), "{msg}");
    }

    #[test]
    fn validate_required_passes_when_complete() {
        let schema = WorksheetSchema::default();
        let answers = collect(
            &schema,
            &form(&[("who", "B2B SaaS founders"), ("what", "no GTM framework")]),
        );
        validate_required(&schema, &answers).unwrap();
    }

    #[test]
    fn to_form_inverts_collect() {
        let schema = WorksheetSchema::default();
        let original = form(&[("who", "founders"), ("how", "playbooks")]);
        let answers = collect(&schema, &original);
        assert_eq!(to_form(&answers), original);
    }
}
