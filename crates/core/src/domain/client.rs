use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// Contact details exactly as a caller submitted them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfoInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
}

/// Validated client contact details.
///
/// Only obtainable through validation (including deserialization), so holding a `ClientInfo`
/// means the name length, email pattern and phone digit count have all been checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClientInfoInput")]
pub struct ClientInfo {
    name: String,
    email: String,
    phone: String,
    company: Option<String>,
}

impl ClientInfo {
    pub(crate) fn from_validated(
        name: String,
        email: String,
        phone: String,
        company: Option<String>,
    ) -> Self {
        Self { name, email, phone, company }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Digits only.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }
}

impl TryFrom<ClientInfoInput> for ClientInfo {
    type Error = ValidationError;

    fn try_from(input: ClientInfoInput) -> Result<Self, Self::Error> {
        validation::validate_client_info(input)
    }
}

impl From<ClientInfo> for ClientInfoInput {
    fn from(value: ClientInfo) -> Self {
        Self { name: value.name, email: value.email, phone: value.phone, company: value.company }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientInfo, ClientInfoInput};

    #[test]
    fn deserialization_runs_validation() {
        let client: ClientInfo = serde_json::from_str(
            r#"{"name":"John Smith","email":"john.smith@example.com","phone":"555-123-4567"}"#,
        )
        .expect("valid client info");

        assert_eq!(client.phone(), "5551234567");
        assert_eq!(client.company(), None);

        let error = serde_json::from_str::<ClientInfo>(
            r#"{"name":"J","email":"john.smith@example.com","phone":"555-123-4567"}"#,
        )
        .expect_err("one-character name must be rejected");
        assert!(error.to_string().contains("name"));
    }

    #[test]
    fn serializes_normalized_values() {
        let client = ClientInfo::try_from(ClientInfoInput {
            name: "  Jane Doe ".to_string(),
            email: "Jane.Doe@Example.com".to_string(),
            phone: "+1 (555) 987-6543".to_string(),
            company: Some("  ".to_string()),
        })
        .expect("valid client info");

        let json = serde_json::to_value(&client).expect("serialize");
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["email"], "jane.doe@example.com");
        assert_eq!(json["phone"], "15559876543");
        assert!(json["company"].is_null());
    }
}
