use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::models::galaxy::GalaxyWithGuardians;
use crate::models::guardian::Guardian;
use crate::stellar::signers::UnsignedTransaction;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputGuardian {
    pub id: Uuid,
    pub email: String,
    pub account: String,
    pub phrase: String,
    pub private_key: String,
    pub recovery_secret: Option<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<Guardian> for OutputGuardian {
    fn from(guardian: Guardian) -> Self {
        Self {
            id: guardian.id,
            email: guardian.email,
            account: guardian.account,
            phrase: guardian.phrase,
            private_key: guardian.private_key,
            recovery_secret: guardian.recovery_secret,
            created_at: guardian.created_timestamp,
            updated_at: guardian.updated_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputGalaxy {
    pub id: Uuid,
    pub name: String,
    pub recovery_address: String,
    pub guardians: Vec<OutputGuardian>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<GalaxyWithGuardians> for OutputGalaxy {
    fn from(galaxy: GalaxyWithGuardians) -> Self {
        Self {
            id: galaxy.galaxy.id,
            name: galaxy.galaxy.name,
            recovery_address: galaxy.galaxy.recovery_address,
            guardians: galaxy.guardians.into_iter().map(OutputGuardian::from).collect(),
            created_at: galaxy.galaxy.created_timestamp,
            updated_at: galaxy.galaxy.updated_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSignerTransaction {
    pub transaction_xdr: String,
    pub network_passphrase: String,
    pub operation_count: usize,
}

impl From<UnsignedTransaction> for OutputSignerTransaction {
    fn from(tx: UnsignedTransaction) -> Self {
        Self {
            transaction_xdr: tx.envelope_xdr,
            network_passphrase: tx.network_passphrase,
            operation_count: tx.operation_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::galaxy::Galaxy;

    #[test]
    fn galaxy_output_is_camel_case() {
        let now = SystemTime::now();
        let galaxy_id = Uuid::now_v7();

        let galaxy = GalaxyWithGuardians {
            galaxy: Galaxy {
                id: galaxy_id,
                name: String::from("Andromeda"),
                recovery_address: String::from("GADDRESS"),
                created_timestamp: now,
                updated_timestamp: now,
            },
            guardians: vec![Guardian {
                id: Uuid::now_v7(),
                galaxy_id,
                email: String::from("ana@example.com"),
                account: String::from("GGUARDIAN"),
                phrase: String::from("blue whale"),
                private_key: String::from("00ff"),
                recovery_secret: None,
                created_timestamp: now,
                updated_timestamp: now,
            }],
        };

        let json = serde_json::to_value(OutputGalaxy::from(galaxy)).unwrap();

        assert_eq!(json["recoveryAddress"], "GADDRESS");
        assert_eq!(json["guardians"][0]["privateKey"], "00ff");
        assert!(json["guardians"][0]["recoverySecret"].is_null());
        assert!(json["guardians"][0].get("galaxyId").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
