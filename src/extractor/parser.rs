use crate::error::{FormulaExtractorError, Result};
use crate::extractor::field::{ExtractedField, Section, DEFAULT_LABEL, DEFAULT_TYPE};
use serde_json::{Map, Value};

const RULE_KEY: &str = "CalculatedRuleEngine";
const FORMULA_KEY: &str = "JSFormula";
const PARTICIPANTS_KEY: &str = "ParticipatingFields";
const TRIGGER_KEY: &str = "CalculatedOn";

type EntryResult<T> = std::result::Result<T, String>;

/// Parses a transaction/activity definition and returns every calculated
/// field with a non-empty formula: header fields first, then line fields,
/// each in document order.
pub fn extract_fields(json: &str) -> Result<Vec<ExtractedField>> {
    let root: Value = serde_json::from_str(json)?;
    let root = root.as_object().ok_or_else(|| {
        FormulaExtractorError::parse(format!(
            "root element must be a JSON object, found {}",
            json_type_name(&root)
        ))
    })?;

    let mut fields = Vec::new();
    for section in Section::ALL {
        extract_section(root, section, &mut fields)?;
    }

    Ok(fields)
}

fn extract_section(
    root: &Map<String, Value>,
    section: Section,
    fields: &mut Vec<ExtractedField>,
) -> Result<()> {
    let key = section.json_key();

    let entries = match root.get(key) {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(FormulaExtractorError::parse(format!(
                "\"{}\" must be an array, found {}",
                key,
                json_type_name(other)
            )))
        }
    };

    for (index, entry) in entries.iter().enumerate() {
        let extracted = extract_entry(entry, section).map_err(|message| {
            FormulaExtractorError::parse(format!("{}[{}]: {}", key, index, message))
        })?;

        if let Some(field) = extracted {
            fields.push(field);
        }
    }

    Ok(())
}

/// `Ok(None)` when the descriptor carries no usable formula. Metadata is only
/// read once a formula is known to be present.
fn extract_entry(entry: &Value, section: Section) -> EntryResult<Option<ExtractedField>> {
    let descriptor = entry.as_object().ok_or_else(|| {
        format!(
            "field descriptor must be an object, found {}",
            json_type_name(entry)
        )
    })?;

    let rule = match descriptor.get(RULE_KEY) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(rule)) => rule,
        Some(other) => {
            return Err(format!(
                "\"{}\" must be an object, found {}",
                RULE_KEY,
                json_type_name(other)
            ))
        }
    };

    let Some(formula) = optional_text(rule, FORMULA_KEY)? else {
        return Ok(None);
    };
    let formula = formula.trim();
    if formula.is_empty() {
        return Ok(None);
    }

    let field_id = optional_text(descriptor, "FieldID")?
        .ok_or_else(|| "calculated field is missing \"FieldID\"".to_string())?;

    let trigger = match rule.get(TRIGGER_KEY) {
        Some(Value::Object(on)) => optional_text(on, "Name")?,
        None | Some(Value::Null) => None,
        Some(other) => {
            return Err(format!(
                "\"{}\" must be an object, found {}",
                TRIGGER_KEY,
                json_type_name(other)
            ))
        }
    }
    .ok_or_else(|| {
        format!(
            "calculated field {} is missing \"{}.{}.Name\"",
            field_id, RULE_KEY, TRIGGER_KEY
        )
    })?;

    Ok(Some(ExtractedField {
        section,
        field_id,
        label: optional_text(descriptor, "Label")?.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        field_type: optional_text(descriptor, "Type")?.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
        trigger,
        formula: formula.to_string(),
        participating_fields: participating_fields(rule)?,
    }))
}

fn participating_fields(rule: &Map<String, Value>) -> EntryResult<Vec<String>> {
    match rule.get(PARTICIPANTS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                scalar_text(item).ok_or_else(|| {
                    format!(
                        "\"{}[{}]\" must be a string, found {}",
                        PARTICIPANTS_KEY,
                        i,
                        json_type_name(item)
                    )
                })
            })
            .collect(),
        Some(other) => Err(format!(
            "\"{}\" must be an array, found {}",
            PARTICIPANTS_KEY,
            json_type_name(other)
        )),
    }
}

/// Absent and `null` read as `None`; numbers and booleans read as their text.
fn optional_text(object: &Map<String, Value>, key: &str) -> EntryResult<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(value).map(Some).ok_or_else(|| {
            format!("\"{}\" must be a string, found {}", key, json_type_name(value))
        }),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculated(id: &str, label: &str, formula: &str) -> String {
        format!(
            r#"{{"FieldID":"{id}","Label":"{label}","Type":"Number","CalculatedRuleEngine":{{"JSFormula":"{formula}","ParticipatingFields":["a"],"CalculatedOn":{{"Name":"Change"}}}}}}"#
        )
    }

    #[test]
    fn test_worked_example() {
        let json = r#"{"Fields":[{"FieldID":"F1","Label":"Net","Type":"Number","CalculatedRuleEngine":{"JSFormula":"return a+b;","ParticipatingFields":["a","b"],"CalculatedOn":{"Name":"Change"}}}]}"#;

        let fields = extract_fields(json).unwrap();
        assert_eq!(fields.len(), 1);

        let field = &fields[0];
        assert_eq!(field.section, Section::HeaderFields);
        assert_eq!(field.field_id, "F1");
        assert_eq!(field.label, "Net");
        assert_eq!(field.field_type, "Number");
        assert_eq!(field.trigger, "Change");
        assert_eq!(field.formula, "return a+b;");
        assert_eq!(field.participating_fields, vec!["a", "b"]);
    }

    #[test]
    fn test_header_fields_precede_line_fields() {
        let json = format!(
            r#"{{"LineFields":[{}, {}],"Fields":[{}, {}]}}"#,
            calculated("L1", "Line One", "return 1;"),
            calculated("L2", "Line Two", "return 2;"),
            calculated("H1", "Head One", "return 3;"),
            calculated("H2", "Head Two", "return 4;"),
        );

        let fields = extract_fields(&json).unwrap();
        let ids: Vec<&str> = fields.iter().map(|f| f.field_id.as_str()).collect();
        assert_eq!(ids, vec!["H1", "H2", "L1", "L2"]);
        assert_eq!(fields[1].section, Section::HeaderFields);
        assert_eq!(fields[2].section, Section::LineFields);
    }

    #[test]
    fn test_fields_without_formula_are_skipped() {
        let json = r#"{"Fields":[
            {"FieldID":"A","CalculatedRuleEngine":null},
            {"FieldID":"B"},
            {"FieldID":"C","CalculatedRuleEngine":{"CalculatedOn":{"Name":"Change"}}},
            {"FieldID":"D","CalculatedRuleEngine":{"JSFormula":"   \n\t ","CalculatedOn":{"Name":"Change"}}},
            {"FieldID":"E","CalculatedRuleEngine":{"JSFormula":null,"CalculatedOn":{"Name":"Change"}}}
        ]}"#;

        assert!(extract_fields(json).unwrap().is_empty());
    }

    #[test]
    fn test_formula_is_trimmed_and_defaults_applied() {
        let json = r#"{"Fields":[{"FieldID":"F9","CalculatedRuleEngine":{"JSFormula":"\n  return 42;  \n","CalculatedOn":{"Name":"Load"}}}]}"#;

        let fields = extract_fields(json).unwrap();
        assert_eq!(fields[0].formula, "return 42;");
        assert_eq!(fields[0].label, DEFAULT_LABEL);
        assert_eq!(fields[0].field_type, DEFAULT_TYPE);
        assert!(fields[0].participating_fields.is_empty());
    }

    #[test]
    fn test_missing_sections_are_not_errors() {
        assert!(extract_fields("{}").unwrap().is_empty());

        let json = format!(r#"{{"Fields":[{}]}}"#, calculated("H1", "Only", "return 1;"));
        let fields = extract_fields(&json).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.iter().all(|f| f.section == Section::HeaderFields));
    }

    #[test]
    fn test_invalid_documents_are_parse_errors() {
        for json in ["not json", "[]", "42", r#"{"Fields":{}}"#, r#"{"LineFields":[1]}"#] {
            let result = extract_fields(json);
            assert!(
                matches!(result, Err(FormulaExtractorError::Parse { .. })),
                "Should reject: {}",
                json
            );
        }
    }

    #[test]
    fn test_missing_trigger_is_parse_error() {
        let json = r#"{"Fields":[{"FieldID":"F1","CalculatedRuleEngine":{"JSFormula":"return 1;"}}]}"#;
        let err = extract_fields(json).unwrap_err();
        assert!(err.to_string().contains("CalculatedOn"));

        let json = r#"{"Fields":[{"FieldID":"F1","CalculatedRuleEngine":{"JSFormula":"return 1;","CalculatedOn":{}}}]}"#;
        assert!(extract_fields(json).is_err());
    }

    #[test]
    fn test_missing_field_id_is_parse_error() {
        let json = r#"{"LineFields":[{"Label":"x","CalculatedRuleEngine":{"JSFormula":"return 1;","CalculatedOn":{"Name":"Change"}}}]}"#;
        let err = extract_fields(json).unwrap_err();
        assert!(err.to_string().contains("LineFields[0]"));
    }

    #[test]
    fn test_missing_field_id_without_formula_is_ignored() {
        let json = r#"{"Fields":[{"Label":"no id","CalculatedRuleEngine":null}]}"#;
        assert!(extract_fields(json).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_of_skipped_entries_is_not_read() {
        let json = format!(
            r#"{{"Fields":[{{"FieldID":"A","Type":7,"Label":["x"]}}, {{"FieldID":3,"CalculatedRuleEngine":null}}, {}]}}"#,
            calculated("B", "Kept", "return 1;")
        );

        let fields = extract_fields(&json).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_id, "B");
    }

    #[test]
    fn test_scalar_metadata_is_read_as_text() {
        let json = r#"{"Fields":[{"FieldID":12,"Label":5,"Type":true,"CalculatedRuleEngine":{"JSFormula":"return 1;","ParticipatingFields":["a",2],"CalculatedOn":{"Name":"Load"}}}]}"#;

        let fields = extract_fields(json).unwrap();
        assert_eq!(fields[0].field_id, "12");
        assert_eq!(fields[0].label, "5");
        assert_eq!(fields[0].field_type, "true");
        assert_eq!(fields[0].participating_fields, vec!["a", "2"]);
        assert_eq!(fields[0].file_name("js"), "5.js");
    }

    #[test]
    fn test_structured_metadata_on_calculated_field_is_parse_error() {
        let json = r#"{"Fields":[{"FieldID":"A","Label":{"x":1},"CalculatedRuleEngine":{"JSFormula":"return 1;","CalculatedOn":{"Name":"Load"}}}]}"#;

        let err = extract_fields(json).unwrap_err();
        assert!(err.to_string().contains("Fields[0]"));
        assert!(err.to_string().contains("\"Label\""));
    }
}
