//! Shared data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    #[serde(rename = "id")]
    #[sqlx(rename = "eventid")]
    pub event_id: String,
    pub name: String,
    pub location: String,
    pub organizer: String,
    pub date: String,
}

/// Create request fields, as submitted in a form body.
#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    #[serde(rename = "eventid")]
    pub event_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub date: Option<String>,
}

impl CreateEventRequest {
    /// Turn the submitted fields into an event; absent fields become empty strings.
    pub fn into_event(self, event_id: String) -> Event {
        Event {
            event_id,
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            organizer: self.organizer.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
        }
    }
}

/// Update request fields; `None` keeps the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub date: Option<String>,
}

/// Outcome tag carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Success,
    Error,
}

/// Standard API response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonResponse {
    pub fn data(events: Vec<Event>) -> Self {
        Self {
            kind: ResponseType::Success,
            data: Some(events),
            message: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::Success,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_id_key() {
        let event = CreateEventRequest {
            event_id: None,
            name: Some("Launch".to_string()),
            location: Some("HQ".to_string()),
            organizer: Some("Alice".to_string()),
            date: Some("2024-01-01".to_string()),
        }
        .into_event("1".to_string());

        let json = serde_json::to_value(JsonResponse::data(vec![event])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "success",
                "data": [{"id": "1", "name": "Launch", "location": "HQ", "organizer": "Alice", "date": "2024-01-01"}]
            })
        );
    }

    #[test]
    fn test_message_envelope_omits_data() {
        let json = serde_json::to_string(&JsonResponse::success("The movie has been inserted successfully!")).unwrap();
        assert_eq!(json, r#"{"type":"success","message":"The movie has been inserted successfully!"}"#);

        let json = serde_json::to_string(&JsonResponse::error("boom")).unwrap();
        assert_eq!(json, r#"{"type":"error","message":"boom"}"#);
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let event = CreateEventRequest {
            name: Some("Only name".to_string()),
            ..Default::default()
        }
        .into_event("42".to_string());
        assert_eq!(event.location, "");
        assert_eq!(event.organizer, "");
        assert_eq!(event.date, "");
    }

    #[test]
    fn test_empty_list_serializes_as_array() {
        let json = serde_json::to_string(&JsonResponse::data(Vec::new())).unwrap();
        assert_eq!(json, r#"{"type":"success","data":[]}"#);
    }
}
