use serde_json::{Map, Value};

use crate::shared::text::fold;

/// A source row as read, with no semantic interpretation.
///
/// Values stay JSON so numeric fields of the JSON source keep their type
/// until a normalizer decides how to render them.
pub type RawRecord = Map<String, Value>;

/// Render a raw value as trimmed text. `null`, arrays and objects are empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// First non-null value among `keys`, compared exactly and then accent and
/// case insensitively (source headers drift between exports).
pub fn field_value<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        if let Some(value) = record.get(*key).filter(|v| !v.is_null()) {
            return Some(value);
        }
    }

    let folded: Vec<String> = keys.iter().map(|k| fold(k)).collect();
    record
        .iter()
        .find(|(k, v)| !v.is_null() && folded.contains(&fold(k)))
        .map(|(_, v)| v)
}

/// Trimmed text of the first matching field, or `""`
pub fn field_text(record: &RawRecord, keys: &[&str]) -> String {
    field_value(record, keys).map(value_text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_text_exact_and_folded_keys() {
        let r = record(json!({
            "Nº ESTACION": 4610,
            "C.POSTAL": " 46014 ",
            "MUNICIPIO": null,
            "municipio": "Valencia"
        }));

        assert_eq!(field_text(&r, &["Nº ESTACIÓN"]), "4610");
        assert_eq!(field_text(&r, &["C.POSTAL"]), "46014");
        assert_eq!(field_text(&r, &["MUNICIPIO"]), "Valencia");
        assert_eq!(field_text(&r, &["HORARIOS"]), "");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(3001)), "3001");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!([1, 2])), "");
        assert_eq!(value_text(&Value::Null), "");
    }
}
