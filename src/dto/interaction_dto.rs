use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::interaction::{InteractionLog, InteractionType, InteractionWithAuthor};
use crate::utils::validation::trim_opt;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPayload {
    pub interaction_type: InteractionType,
    #[validate(length(max = 300, message = "Notes must be at most 300 characters"))]
    pub notes: Option<String>,
}

impl InteractionPayload {
    pub fn normalize(&mut self) {
        trim_opt(&mut self.notes);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionAuthor {
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub id: i32,
    pub lead_id: i32,
    pub interaction_type: InteractionType,
    pub notes: Option<String>,
    pub interaction_time: DateTime<Utc>,
    pub interaction_by: InteractionAuthor,
}

impl From<InteractionWithAuthor> for InteractionResponse {
    fn from(value: InteractionWithAuthor) -> Self {
        Self {
            id: value.id,
            lead_id: value.lead_id,
            interaction_type: value.interaction_type,
            notes: value.notes,
            interaction_time: value.interaction_time,
            interaction_by: InteractionAuthor {
                first_name: value.author_first_name,
                last_name: value.author_last_name,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionListResponse {
    pub success: bool,
    pub message: String,
    pub interactions: Vec<InteractionResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCreatedResponse {
    pub success: bool,
    pub message: String,
    pub interaction: InteractionLog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notes_are_capped_at_300_characters() {
        let mut payload: InteractionPayload = serde_json::from_value(json!({
            "interactionType": "VIDEO_CALL",
            "notes": "x".repeat(301)
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        payload.notes = Some(format!("  {}  ", "x".repeat(300)));
        payload.normalize();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn response_nests_the_author() {
        let row = InteractionWithAuthor {
            id: 4,
            lead_id: 2,
            interaction_by_id: 7,
            interaction_type: InteractionType::Call,
            notes: None,
            interaction_time: Utc::now(),
            author_first_name: "Asha".into(),
            author_last_name: Some("Rao".into()),
        };
        let value = serde_json::to_value(InteractionResponse::from(row)).unwrap();
        assert_eq!(value["interactionBy"], json!({ "firstName": "Asha", "lastName": "Rao" }));
        assert_eq!(value["interactionType"], "CALL");
    }
}
