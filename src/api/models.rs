use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recipient. CSV rows may leave any of the three core fields out; extra
/// columns travel to the backend untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Customer {
    pub fn manual(name: &str, phone: &str, country_code: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            country_code: Some(country_code.to_string()),
            extra: BTreeMap::new(),
        }
    }

    /// Maps a header-keyed CSV record onto a customer.
    pub fn from_record(mut record: BTreeMap<String, String>) -> Self {
        Self {
            name: record.remove("name"),
            phone: record.remove("phone"),
            country_code: record.remove("country_code"),
            extra: record,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CampaignRequest {
    pub campaign_type: String,
    pub template_name: String,
    pub image_url: Option<String>,
    pub customers: Vec<Customer>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: i64,
    pub template_name: String,
    pub template_body: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TemplateInput {
    pub template_name: String,
    pub template_body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub timestamp: String,
    pub direction: String,
}

impl Message {
    pub fn is_incoming(&self) -> bool {
        self.direction.trim() == "incoming"
    }
}

#[derive(Debug, Serialize)]
pub struct Reply<'a> {
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_not_serialized() {
        let mut record = BTreeMap::new();
        record.insert("name".to_string(), "Alice".to_string());
        record.insert("phone".to_string(), "555".to_string());
        record.insert("order_status".to_string(), "shipped".to_string());
        let json = serde_json::to_value(Customer::from_record(record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Alice", "phone": "555", "order_status": "shipped"})
        );
    }

    #[test]
    fn direction_is_trimmed() {
        let msg = Message {
            text: "hi".into(),
            timestamp: "2024-01-01 10:00:00".into(),
            direction: " incoming\n".into(),
        };
        assert!(msg.is_incoming());
        let out = Message { direction: "outgoing".into(), ..msg };
        assert!(!out.is_incoming());
    }
}
