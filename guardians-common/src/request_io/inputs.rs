use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::validators::{self, Validity};

#[derive(Clone, Debug, Deserialize, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct InputGuardian {
    pub email: String,
    pub phrase: String,
}

impl InputGuardian {
    pub fn validate(&self) -> Validity {
        if let Validity::Invalid(msg) = validators::validate_email_address(&self.email) {
            return Validity::Invalid(msg);
        }

        validators::validate_not_blank(&self.phrase, "Guardian phrase")
    }
}

fn validate_guardians(guardians: &[InputGuardian]) -> Validity {
    if guardians.is_empty() {
        return Validity::Invalid(String::from("At least one guardian is required."));
    }

    for guardian in guardians {
        if let Validity::Invalid(msg) = guardian.validate() {
            return Validity::Invalid(msg);
        }
    }

    Validity::Valid
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputGalaxy {
    pub name: String,
    pub recovery_address: String,
    pub guardians: Vec<InputGuardian>,
}

impl InputGalaxy {
    pub fn validate(&self) -> Validity {
        if let Validity::Invalid(msg) = validators::validate_not_blank(&self.name, "Name") {
            return Validity::Invalid(msg);
        }

        if let Validity::Invalid(msg) =
            validators::validate_not_blank(&self.recovery_address, "Recovery address")
        {
            return Validity::Invalid(msg);
        }

        validate_guardians(&self.guardians)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputGalaxyUpdate {
    pub recovery_address: Option<String>,
    pub guardians: Option<Vec<InputGuardian>>,
}

impl InputGalaxyUpdate {
    /// A guardian list, when present, replaces the current one and so may not be empty.
    pub fn validate(&self) -> Validity {
        if let Some(recovery_address) = &self.recovery_address {
            if let Validity::Invalid(msg) =
                validators::validate_not_blank(recovery_address, "Recovery address")
            {
                return Validity::Invalid(msg);
            }
        }

        match &self.guardians {
            Some(guardians) => validate_guardians(guardians),
            None => Validity::Valid,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputRecoveryKey {
    pub key: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSignerUpdate {
    pub account: String,
    pub signers: Vec<String>,
    pub voters_threshold: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guardian(email: &str, phrase: &str) -> InputGuardian {
        InputGuardian {
            email: String::from(email),
            phrase: String::from(phrase),
        }
    }

    #[test]
    fn galaxy_uses_camel_case_fields() {
        let body = r#"{
            "name": "Andromeda",
            "recoveryAddress": "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H",
            "guardians": [{ "email": "ana@example.com", "phrase": "blue whale" }]
        }"#;

        let galaxy: InputGalaxy = serde_json::from_str(body).unwrap();
        assert_eq!(galaxy.guardians.len(), 1);
        assert_eq!(galaxy.guardians[0].phrase, "blue whale");
        assert!(galaxy.validate().is_valid());
    }

    #[test]
    fn galaxy_validation() {
        let mut galaxy = InputGalaxy {
            name: String::from("Andromeda"),
            recovery_address: String::from("GADDRESS"),
            guardians: vec![guardian("ana@example.com", "blue whale")],
        };
        assert!(galaxy.validate().is_valid());

        galaxy.guardians.push(guardian("not-an-email", "phrase"));
        assert!(!galaxy.validate().is_valid());

        galaxy.guardians = vec![guardian("ana@example.com\r\nBcc: eve@example.com", "phrase")];
        assert!(!galaxy.validate().is_valid());

        galaxy.guardians = vec![guardian("ana@example.com", " ")];
        assert!(!galaxy.validate().is_valid());

        galaxy.guardians = Vec::new();
        assert!(!galaxy.validate().is_valid());

        galaxy.guardians = vec![guardian("ana@example.com", "blue whale")];
        galaxy.name = String::new();
        assert!(!galaxy.validate().is_valid());

        galaxy.name = String::from("Andromeda");
        galaxy.recovery_address = String::new();
        assert!(!galaxy.validate().is_valid());
    }

    #[test]
    fn galaxy_update_fields_are_optional() {
        let update: InputGalaxyUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.recovery_address.is_none());
        assert!(update.guardians.is_none());
        assert!(update.validate().is_valid());

        let update: InputGalaxyUpdate = serde_json::from_str(r#"{ "guardians": [] }"#).unwrap();
        assert!(!update.validate().is_valid());

        let update: InputGalaxyUpdate =
            serde_json::from_str(r#"{ "recoveryAddress": "" }"#).unwrap();
        assert!(!update.validate().is_valid());
    }

    #[test]
    fn signer_update_uses_camel_case_fields() {
        let body = r#"{ "account": "GA", "signers": ["GB", "GC"], "votersThreshold": 2 }"#;
        let update: InputSignerUpdate = serde_json::from_str(body).unwrap();

        assert_eq!(update.signers.len(), 2);
        assert_eq!(update.voters_threshold, 2);
    }
}
