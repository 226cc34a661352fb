use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum HorizonError {
    ClientFailure(reqwest::Error),
    AccountNotFound,
    UnexpectedStatus(u16),
    InvalidResponse(String),
}

impl std::error::Error for HorizonError {}

impl fmt::Display for HorizonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HorizonError::ClientFailure(e) => write!(f, "HorizonError: Request failed: {e}"),
            HorizonError::AccountNotFound => write!(f, "HorizonError: Account not found"),
            HorizonError::UnexpectedStatus(status) => {
                write!(f, "HorizonError: Unexpected response status {status}")
            }
            HorizonError::InvalidResponse(msg) => {
                write!(f, "HorizonError: Invalid response: {msg}")
            }
        }
    }
}

impl From<reqwest::Error> for HorizonError {
    fn from(error: reqwest::Error) -> Self {
        HorizonError::ClientFailure(error)
    }
}

/// Source of an account's current sequence number.
#[async_trait]
pub trait AccountSequenceSource: Send + Sync {
    async fn current_sequence(&self, account_id: &str) -> Result<i64, HorizonError>;
}

#[derive(Debug, Deserialize)]
pub struct HorizonAccount {
    pub account_id: String,
    // Horizon encodes the 64-bit sequence number as a string
    pub sequence: String,
}

impl HorizonAccount {
    pub fn sequence_number(&self) -> Result<i64, HorizonError> {
        self.sequence.parse::<i64>().map_err(|_| {
            HorizonError::InvalidResponse(format!("Malformed sequence number '{}'", self.sequence))
        })
    }
}

pub struct HorizonClient {
    client: reqwest::Client,
    base_url: String,
}

impl HorizonClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, HorizonError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: String::from(base_url.trim_end_matches('/')),
        })
    }

    pub async fn load_account(&self, account_id: &str) -> Result<HorizonAccount, HorizonError> {
        let url = format!("{}/accounts/{}", self.base_url, account_id);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HorizonError::AccountNotFound);
        }

        if !status.is_success() {
            return Err(HorizonError::UnexpectedStatus(status.as_u16()));
        }

        Ok(resp.json::<HorizonAccount>().await?)
    }
}

#[async_trait]
impl AccountSequenceSource for HorizonClient {
    async fn current_sequence(&self, account_id: &str) -> Result<i64, HorizonError> {
        let account = self.load_account(account_id).await?;
        log::debug!("Loaded account {} from Horizon", account.account_id);

        account.sequence_number()
    }
}

/// Sources with canned answers for tests that build transactions without a Horizon server.
#[cfg(any(test, feature = "testing"))]
pub mod test_utils {
    use super::*;

    pub struct FixedSequence(pub i64);

    #[async_trait]
    impl AccountSequenceSource for FixedSequence {
        async fn current_sequence(&self, _account_id: &str) -> Result<i64, HorizonError> {
            Ok(self.0)
        }
    }

    pub struct MissingAccount;

    #[async_trait]
    impl AccountSequenceSource for MissingAccount {
        async fn current_sequence(&self, _account_id: &str) -> Result<i64, HorizonError> {
            Err(HorizonError::AccountNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_account_response() {
        let body = r#"{
            "id": "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H",
            "account_id": "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H",
            "sequence": "4123551036686336",
            "subentry_count": 0,
            "balances": [
                { "balance": "10000.0000000", "asset_type": "native" }
            ]
        }"#;

        let account: HorizonAccount = serde_json::from_str(body).unwrap();
        assert_eq!(account.sequence_number().unwrap(), 4123551036686336);
    }

    #[test]
    fn rejects_malformed_sequence() {
        let account = HorizonAccount {
            account_id: String::from("GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H"),
            sequence: String::from("12abc"),
        };

        assert!(matches!(
            account.sequence_number(),
            Err(HorizonError::InvalidResponse(_))
        ));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client =
            HorizonClient::new("https://horizon-testnet.stellar.org/", Duration::from_secs(5))
                .unwrap();

        assert_eq!(client.base_url, "https://horizon-testnet.stellar.org");
    }
}
