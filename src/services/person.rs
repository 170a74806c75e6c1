//! Person service: security questions and PIN

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::client::{ClientError, PlatformClient};

use super::parse_field;

/// One entry from the platform's security question catalog
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityQuestion {
    pub id: String,
    pub question: String,
}

pub struct PersonService {
    client: Arc<dyn PlatformClient>,
    person_id: String,
}

impl PersonService {
    pub fn new(client: Arc<dyn PlatformClient>, person_id: &str) -> Self {
        Self {
            client,
            person_id: person_id.to_string(),
        }
    }

    fn destination(&self) -> String {
        format!("SERV:person:{}", self.person_id)
    }

    /// Fetch the catalog of questions a person can choose from
    pub async fn list_security_questions(&self) -> Result<Vec<SecurityQuestion>, ClientError> {
        let attrs = self
            .client
            .request(&self.destination(), "person:GetSecurityQuestions", json!({}))
            .await?;
        parse_field(&attrs, "questions")
    }

    /// Save the chosen question/answer pairs. Answers are sent, never
    /// echoed back or stored locally.
    pub async fn set_security_answers(
        &self,
        pairs: &[(String, String)],
    ) -> Result<(), ClientError> {
        let answers: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(id, answer)| (id.clone(), serde_json::Value::String(answer.clone())))
            .collect();
        self.client
            .request(
                &self.destination(),
                "person:SetSecurityAnswers",
                json!({ "securityAnswers": answers }),
            )
            .await?;
        Ok(())
    }

    /// Set the person's 4-digit PIN at a place. Fails with
    /// `pin.notUniqueAtPlace` if another person there already uses it.
    pub async fn change_pin(&self, place_id: &str, pin: &str) -> Result<(), ClientError> {
        self.client
            .request(
                &self.destination(),
                "person:ChangePin",
                json!({ "place": place_id, "pin": pin }),
            )
            .await?;
        Ok(())
    }
}
