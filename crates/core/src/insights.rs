//! Response aggregation
//!
//! Turns a field definition plus the full set of submitted answer
//! payloads into one [`FieldInsight`]: total submissions, how many
//! answered, and a type-dependent summary (a categorical breakdown for
//! checkbox/select fields, a response list and optional average for the
//! rest).
//!
//! The aggregator is deliberately best-effort: unparseable numbers,
//! wrong-shaped option payloads and unexpected value types are absorbed
//! into the "No answer" / unrecognized paths. Bad input degrades the
//! summary, never the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Question field type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Number,
    Checkbox,
    Select,
}

impl FieldKind {
    /// Parse a stored type tag. Unknown tags degrade to `Text` so a
    /// field with a corrupted type still produces a response list.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "textarea" => FieldKind::Textarea,
            "email" => FieldKind::Email,
            "number" => FieldKind::Number,
            "checkbox" => FieldKind::Checkbox,
            "select" => FieldKind::Select,
            _ => FieldKind::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Email => "email",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select => "select",
        }
    }
}

/// The slice of a field definition the aggregator needs.
#[derive(Debug, Clone)]
pub struct FieldSpec<'a> {
    pub id: Uuid,
    pub key: &'a str,
    pub label: &'a str,
    pub field_type: &'a str,
    /// Stored option configuration for select fields. Anything that is
    /// not an array of strings or `{label, value}` objects normalizes
    /// to an empty option list.
    pub options: Option<&'a Value>,
}

/// One (label, count) bucket in a categorical breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownBucket {
    pub label: String,
    pub count: u64,
}

/// Aggregated summary for one field across all submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInsight {
    pub field_id: Uuid,
    pub label: String,
    pub field_type: String,
    /// Total submissions considered.
    pub total: u64,
    /// Submissions in which this field carried a usable value.
    pub answered: u64,
    /// Mean of numerically coerced answers; number fields only, and
    /// only when at least one answer coerced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<BreakdownBucket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<String>>,
}

/// A configured select option: what the form shows and what gets stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// Normalize a stored option payload into a concrete option list.
///
/// Accepts an array of bare strings (string serves as both label and
/// value) or `{label, value}` objects. Entries of any other shape are
/// dropped; a non-array payload yields an empty list.
pub fn normalize_options(options: Option<&Value>) -> Vec<FieldOption> {
    let Some(Value::Array(items)) = options else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(FieldOption {
                label: s.clone(),
                value: s.clone(),
            }),
            Value::Object(map) => {
                let label = map.get("label")?;
                let value = map.get("value")?;
                Some(FieldOption {
                    label: scalar_to_string(label)?,
                    value: scalar_to_string(value)?,
                })
            }
            _ => None,
        })
        .collect()
}

// Labels and values in option objects may arrive as strings, numbers
// or booleans; anything else is treated as a broken entry.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compute the insight record for one field over the supplied answer
/// payloads. `answers` must be ordered the way the caller wants the
/// response list ordered (the repository supplies most-recent-first).
///
/// This is a pure function: same inputs, same output, no hidden state.
pub fn aggregate_field(field: &FieldSpec<'_>, answers: &[Value]) -> FieldInsight {
    let kind = FieldKind::parse(field.field_type);
    let total = answers.len() as u64;

    let values = answers.iter().map(|payload| payload.get(field.key));

    match kind {
        FieldKind::Checkbox => aggregate_checkbox(field, total, values),
        FieldKind::Select => aggregate_select(field, total, values),
        _ => aggregate_open(field, kind, total, values),
    }
}

fn aggregate_checkbox<'a>(
    field: &FieldSpec<'_>,
    total: u64,
    values: impl Iterator<Item = Option<&'a Value>>,
) -> FieldInsight {
    let mut yes = 0u64;
    let mut no = 0u64;

    for value in values {
        match value {
            Some(Value::Bool(true)) => yes += 1,
            Some(Value::Bool(false)) => no += 1,
            // Absent, null, or any non-boolean shape: no answer.
            _ => {}
        }
    }

    let missing = total - yes - no;
    let mut breakdown = vec![
        BreakdownBucket {
            label: "Yes".to_string(),
            count: yes,
        },
        BreakdownBucket {
            label: "No".to_string(),
            count: no,
        },
    ];
    if missing > 0 {
        breakdown.push(BreakdownBucket {
            label: "No answer".to_string(),
            count: missing,
        });
    }

    FieldInsight {
        field_id: field.id,
        label: field.label.to_string(),
        field_type: field.field_type.to_string(),
        total,
        answered: yes + no,
        average: None,
        breakdown: Some(breakdown),
        responses: None,
    }
}

fn aggregate_select<'a>(
    field: &FieldSpec<'_>,
    total: u64,
    values: impl Iterator<Item = Option<&'a Value>>,
) -> FieldInsight {
    let options = normalize_options(field.options);

    // Configured options first, in configured order; unrecognized
    // values are appended in first-seen order.
    let mut buckets: Vec<(String, String, u64)> = options
        .into_iter()
        .map(|opt| (opt.value, opt.label, 0u64))
        .collect();

    let mut answered = 0u64;
    let mut missing = 0u64;

    for value in values {
        match value {
            Some(Value::String(s)) if !s.is_empty() => {
                answered += 1;
                match buckets.iter_mut().find(|(value, _, _)| value == s) {
                    Some((_, _, count)) => *count += 1,
                    None => buckets.push((s.clone(), s.clone(), 1)),
                }
            }
            _ => missing += 1,
        }
    }

    let mut breakdown: Vec<BreakdownBucket> = buckets
        .into_iter()
        .map(|(_, label, count)| BreakdownBucket { label, count })
        .collect();
    if missing > 0 {
        breakdown.push(BreakdownBucket {
            label: "No answer".to_string(),
            count: missing,
        });
    }

    FieldInsight {
        field_id: field.id,
        label: field.label.to_string(),
        field_type: field.field_type.to_string(),
        total,
        answered,
        average: None,
        breakdown: Some(breakdown),
        responses: None,
    }
}

fn aggregate_open<'a>(
    field: &FieldSpec<'_>,
    kind: FieldKind,
    total: u64,
    values: impl Iterator<Item = Option<&'a Value>>,
) -> FieldInsight {
    let mut responses = Vec::new();
    let mut sum = 0.0f64;
    let mut numeric_count = 0u64;

    for value in values {
        let Some(value) = value else { continue };
        if value.is_null() {
            continue;
        }
        if matches!(value, Value::String(s) if s.is_empty()) {
            continue;
        }

        if kind == FieldKind::Number {
            if let Some(n) = coerce_number(value) {
                sum += n;
                numeric_count += 1;
            }
        }

        responses.push(render_answer(value));
    }

    let answered = responses.len() as u64;
    let average = (kind == FieldKind::Number && numeric_count > 0)
        .then(|| sum / numeric_count as f64);

    FieldInsight {
        field_id: field.id,
        label: field.label.to_string(),
        field_type: field.field_type.to_string(),
        total,
        answered,
        average,
        breakdown: None,
        responses: Some(responses),
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn render_answer(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Arrays and objects are rare but possible; keep them readable.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_spec<'a>(key: &'a str, field_type: &'a str, options: Option<&'a Value>) -> FieldSpec<'a> {
        FieldSpec {
            id: Uuid::new_v4(),
            key,
            label: "Question",
            field_type,
            options,
        }
    }

    fn answers(values: &[Value]) -> Vec<Value> {
        values.iter().map(|v| json!({ "q": v })).collect()
    }

    fn bucket(label: &str, count: u64) -> BreakdownBucket {
        BreakdownBucket {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn test_checkbox_breakdown() {
        let answers = answers(&[json!(true), json!(false), json!(true), Value::Null]);
        let insight = aggregate_field(&field_spec("q", "checkbox", None), &answers);

        assert_eq!(insight.total, 4);
        assert_eq!(insight.answered, 3);
        assert_eq!(
            insight.breakdown.unwrap(),
            vec![bucket("Yes", 2), bucket("No", 1), bucket("No answer", 1)]
        );
        assert!(insight.responses.is_none());
    }

    #[test]
    fn test_checkbox_omits_empty_no_answer_bucket() {
        let answers = answers(&[json!(true), json!(false)]);
        let insight = aggregate_field(&field_spec("q", "checkbox", None), &answers);

        assert_eq!(
            insight.breakdown.unwrap(),
            vec![bucket("Yes", 1), bucket("No", 1)]
        );
    }

    #[test]
    fn test_checkbox_absorbs_non_boolean_values() {
        let answers = answers(&[json!("yes"), json!(1), json!(true)]);
        let insight = aggregate_field(&field_spec("q", "checkbox", None), &answers);

        assert_eq!(insight.answered, 1);
        assert_eq!(
            insight.breakdown.unwrap(),
            vec![bucket("Yes", 1), bucket("No", 0), bucket("No answer", 2)]
        );
    }

    #[test]
    fn test_select_breakdown_ordering() {
        let options = json!([
            { "label": "A", "value": "a" },
            { "label": "B", "value": "b" },
        ]);
        let answers = answers(&[json!("a"), json!("a"), json!("c"), json!("")]);
        let insight = aggregate_field(&field_spec("q", "select", Some(&options)), &answers);

        assert_eq!(insight.total, 4);
        assert_eq!(insight.answered, 2);
        assert_eq!(
            insight.breakdown.unwrap(),
            vec![
                bucket("A", 2),
                bucket("B", 0),
                bucket("c", 1),
                bucket("No answer", 1),
            ]
        );
    }

    #[test]
    fn test_select_bare_string_options() {
        let options = json!(["red", "blue"]);
        let answers = answers(&[json!("blue")]);
        let insight = aggregate_field(&field_spec("q", "select", Some(&options)), &answers);

        assert_eq!(
            insight.breakdown.unwrap(),
            vec![bucket("red", 0), bucket("blue", 1)]
        );
    }

    #[test]
    fn test_select_broken_options_normalize_to_empty() {
        let options = json!({ "not": "an array" });
        let answers = answers(&[json!("x")]);
        let insight = aggregate_field(&field_spec("q", "select", Some(&options)), &answers);

        // Unrecognized value still gets its own bucket.
        assert_eq!(insight.breakdown.unwrap(), vec![bucket("x", 1)]);
        assert_eq!(insight.answered, 1);
    }

    #[test]
    fn test_select_unrecognized_values_first_seen_order() {
        let answers = answers(&[json!("z"), json!("y"), json!("z")]);
        let insight = aggregate_field(&field_spec("q", "select", None), &answers);

        assert_eq!(
            insight.breakdown.unwrap(),
            vec![bucket("z", 2), bucket("y", 1)]
        );
    }

    #[test]
    fn test_number_average() {
        let answers = answers(&[json!(10), json!("20"), json!("abc"), json!("")]);
        let insight = aggregate_field(&field_spec("q", "number", None), &answers);

        assert_eq!(insight.total, 4);
        assert_eq!(insight.answered, 3);
        assert_eq!(insight.responses.unwrap(), vec!["10", "20", "abc"]);
        assert_eq!(insight.average, Some(15.0));
    }

    #[test]
    fn test_number_without_coercible_values_has_no_average() {
        let answers = answers(&[json!("abc"), json!("def")]);
        let insight = aggregate_field(&field_spec("q", "number", None), &answers);

        assert_eq!(insight.answered, 2);
        assert!(insight.average.is_none());
    }

    #[test]
    fn test_text_skips_blank_answers() {
        let answers = vec![
            json!({ "q": "hello" }),
            json!({ "q": "" }),
            json!({ "q": null }),
            json!({ "other_key": "ignored" }),
        ];
        let insight = aggregate_field(&field_spec("q", "text", None), &answers);

        assert_eq!(insight.total, 4);
        assert_eq!(insight.answered, 1);
        assert_eq!(insight.responses.unwrap(), vec!["hello"]);
        assert!(insight.average.is_none());
        assert!(insight.breakdown.is_none());
    }

    #[test]
    fn test_unknown_type_degrades_to_text() {
        let answers = answers(&[json!("a"), json!(3)]);
        let insight = aggregate_field(&field_spec("q", "slider", None), &answers);

        assert_eq!(insight.responses.unwrap(), vec!["a", "3"]);
        assert!(insight.average.is_none());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let options = json!(["a", "b"]);
        let answers = answers(&[json!("a"), json!("b"), json!(""), json!("c")]);
        let field = field_spec("q", "select", Some(&options));

        let first = aggregate_field(&field, &answers);
        let second = aggregate_field(&field, &answers);

        assert_eq!(first.total, second.total);
        assert_eq!(first.answered, second.answered);
        assert_eq!(first.breakdown, second.breakdown);
    }

    #[test]
    fn test_empty_answer_set() {
        let insight = aggregate_field(&field_spec("q", "checkbox", None), &[]);
        assert_eq!(insight.total, 0);
        assert_eq!(insight.answered, 0);
        assert_eq!(
            insight.breakdown.unwrap(),
            vec![bucket("Yes", 0), bucket("No", 0)]
        );
    }

    #[test]
    fn test_field_kind_parse() {
        assert_eq!(FieldKind::parse("select"), FieldKind::Select);
        assert_eq!(FieldKind::parse("nonsense"), FieldKind::Text);
        assert_eq!(FieldKind::Number.as_str(), "number");
    }
}
