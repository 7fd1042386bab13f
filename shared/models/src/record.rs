//! Extraction records and the normalization rules applied to raw model output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder written into any field the model could not resolve.
pub const NOT_FOUND: &str = "Not found";

/// Quantity used when the model omits it or returns something unparseable.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Keys every normalized record carries, in the order the model is asked for them.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "customerId",
    "companyName",
    "attention",
    "address1",
    "cityOrTown",
    "stateProvinceCounty",
    "postalCode",
    "telephone",
    "upsService",
    "quantity",
];

/// One packing slip as extracted by the model, after normalization.
///
/// `page_number` is transient: it ties the record back to its source page while
/// batches are processed and never reaches the CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub customer_id: String,
    pub company_name: String,
    pub attention: String,
    pub address1: String,
    pub city_or_town: String,
    pub state_province_county: String,
    pub postal_code: String,
    pub telephone: String,
    pub ups_service: String,
    pub quantity: i64,
    #[serde(
        rename = "page_number",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<u32>,
}

impl ExtractionRecord {
    /// Record returned when extraction fails outright: every field unresolved.
    pub fn empty() -> Self {
        Self {
            customer_id: NOT_FOUND.to_string(),
            company_name: NOT_FOUND.to_string(),
            attention: NOT_FOUND.to_string(),
            address1: NOT_FOUND.to_string(),
            city_or_town: NOT_FOUND.to_string(),
            state_province_county: NOT_FOUND.to_string(),
            postal_code: NOT_FOUND.to_string(),
            telephone: NOT_FOUND.to_string(),
            ups_service: NOT_FOUND.to_string(),
            quantity: DEFAULT_QUANTITY,
            page_number: None,
        }
    }

    /// Normalize an arbitrary JSON value. Anything other than an object yields `None`.
    pub fn normalize(raw: &Value) -> Option<Self> {
        raw.as_object().map(Self::from_map)
    }

    /// Apply the normalization rules to a raw field mapping:
    /// missing fields become [`NOT_FOUND`], `quantity` is coerced to an integer,
    /// and an unresolved company name falls back to the attention line.
    pub fn from_map(raw: &Map<String, Value>) -> Self {
        let attention = text_field(raw, "attention");
        let mut company_name = text_field(raw, "companyName");
        if company_name == NOT_FOUND || company_name.trim().is_empty() {
            company_name = attention.clone();
        }

        Self {
            customer_id: text_field(raw, "customerId"),
            company_name,
            attention,
            address1: text_field(raw, "address1"),
            city_or_town: text_field(raw, "cityOrTown"),
            state_province_county: text_field(raw, "stateProvinceCounty"),
            postal_code: text_field(raw, "postalCode"),
            telephone: text_field(raw, "telephone"),
            ups_service: text_field(raw, "upsService"),
            quantity: quantity_field(raw.get("quantity")),
            page_number: None,
        }
    }

    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// True when the model found at least a customer ID or a recipient name.
    pub fn is_identified(&self) -> bool {
        self.customer_id != NOT_FOUND || self.attention != NOT_FOUND
    }
}

impl Default for ExtractionRecord {
    fn default() -> Self {
        Self::empty()
    }
}

// Null counts as absent; scalars keep their JSON spelling.
fn text_field(raw: &Map<String, Value>, key: &str) -> String {
    match raw.get(key) {
        None | Some(Value::Null) => NOT_FOUND.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn quantity_field(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_QUANTITY),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .unwrap_or(DEFAULT_QUANTITY),
        _ => DEFAULT_QUANTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_become_not_found() {
        let record = ExtractionRecord::normalize(&json!({ "customerId": "1214327946" })).unwrap();

        assert_eq!(record.customer_id, "1214327946");
        assert_eq!(record.address1, NOT_FOUND);
        assert_eq!(record.telephone, NOT_FOUND);
        assert_eq!(record.ups_service, NOT_FOUND);
        assert_eq!(record.quantity, DEFAULT_QUANTITY);
    }

    #[test]
    fn test_quantity_string_is_parsed() {
        let record = ExtractionRecord::normalize(&json!({ "quantity": " 3 " })).unwrap();
        assert_eq!(record.quantity, 3);

        let record = ExtractionRecord::normalize(&json!({ "quantity": "three" })).unwrap();
        assert_eq!(record.quantity, 1);

        let record = ExtractionRecord::normalize(&json!({ "quantity": 4 })).unwrap();
        assert_eq!(record.quantity, 4);

        let record = ExtractionRecord::normalize(&json!({ "quantity": 2.0 })).unwrap();
        assert_eq!(record.quantity, 2);
    }

    #[test]
    fn test_company_falls_back_to_attention() {
        let record = ExtractionRecord::normalize(&json!({
            "companyName": "",
            "attention": "Jane Doe"
        }))
        .unwrap();
        assert_eq!(record.company_name, "Jane Doe");

        let record = ExtractionRecord::normalize(&json!({
            "companyName": "Not found",
            "attention": "Jane Doe"
        }))
        .unwrap();
        assert_eq!(record.company_name, "Jane Doe");

        let record = ExtractionRecord::normalize(&json!({ "attention": "Jane Doe" })).unwrap();
        assert_eq!(record.company_name, "Jane Doe");
    }

    #[test]
    fn test_company_kept_when_present() {
        let record = ExtractionRecord::normalize(&json!({
            "companyName": "Red Deer Construction Ltd",
            "attention": "Jane Doe"
        }))
        .unwrap();
        assert_eq!(record.company_name, "Red Deer Construction Ltd");
    }

    #[test]
    fn test_non_string_scalars_are_stringified() {
        let record = ExtractionRecord::normalize(&json!({
            "telephone": 4035551234u64,
            "postalCode": null
        }))
        .unwrap();
        assert_eq!(record.telephone, "4035551234");
        assert_eq!(record.postal_code, NOT_FOUND);
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(ExtractionRecord::normalize(&json!([1, 2])).is_none());
        assert!(ExtractionRecord::normalize(&json!("text")).is_none());
    }

    #[test]
    fn test_serialized_keys_match_required_fields() {
        let value = serde_json::to_value(ExtractionRecord::empty()).unwrap();
        let object = value.as_object().unwrap();

        for field in REQUIRED_FIELDS {
            assert!(object.contains_key(field), "missing {}", field);
        }
        assert!(!object.contains_key("page_number"));

        let value = serde_json::to_value(ExtractionRecord::empty().with_page_number(3)).unwrap();
        assert_eq!(value["page_number"], 3);
    }

    #[test]
    fn test_identification() {
        assert!(!ExtractionRecord::empty().is_identified());

        let mut record = ExtractionRecord::empty();
        record.attention = "Jane Doe".to_string();
        assert!(record.is_identified());
    }
}
