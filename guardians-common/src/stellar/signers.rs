use std::fmt;
use std::sync::Arc;
use stellar_xdr::curr::{
    Limits, Memo, MuxedAccount, Operation, OperationBody, Preconditions, SequenceNumber,
    SetOptionsOp, Signer, SignerKey, TimeBounds, TimePoint, Transaction, TransactionEnvelope,
    TransactionExt, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

use crate::stellar::horizon::{AccountSequenceSource, HorizonError};
use crate::stellar::keypair::{decode_account_id, KeypairError};
use crate::stellar::BASE_FEE;

pub const MED_THRESHOLD: u32 = 200;
pub const HIGH_THRESHOLD: u32 = 255;

/// Total signer weight shared among the voters needed to reach the medium threshold
const VOTING_POWER: u32 = 200;

/// Each signer contributes two operations and a transaction holds at most 100
pub const MAX_SIGNERS: usize = 50;

#[derive(Debug)]
pub enum SignerUpdateError {
    InvalidAccount(KeypairError),
    InvalidSigner(usize, KeypairError),
    NoSigners,
    TooManySigners(usize),
    ZeroVotersThreshold,
    SequenceLookupFailed(HorizonError),
    SequenceOverflow,
    EncodingFailed(stellar_xdr::curr::Error),
}

impl std::error::Error for SignerUpdateError {}

impl fmt::Display for SignerUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerUpdateError::InvalidAccount(e) => {
                write!(f, "SignerUpdateError: Invalid source account: {e}")
            }
            SignerUpdateError::InvalidSigner(index, e) => {
                write!(f, "SignerUpdateError: Invalid signer at index {index}: {e}")
            }
            SignerUpdateError::NoSigners => {
                write!(f, "SignerUpdateError: At least one signer is required")
            }
            SignerUpdateError::TooManySigners(count) => write!(
                f,
                "SignerUpdateError: {count} signers given but at most {MAX_SIGNERS} fit in one \
                 transaction"
            ),
            SignerUpdateError::ZeroVotersThreshold => {
                write!(f, "SignerUpdateError: Voters threshold must be at least 1")
            }
            SignerUpdateError::SequenceLookupFailed(e) => {
                write!(f, "SignerUpdateError: Failed to load account sequence: {e}")
            }
            SignerUpdateError::SequenceOverflow => {
                write!(f, "SignerUpdateError: Account sequence number is exhausted")
            }
            SignerUpdateError::EncodingFailed(e) => {
                write!(f, "SignerUpdateError: Failed to encode transaction: {e}")
            }
        }
    }
}

impl From<HorizonError> for SignerUpdateError {
    fn from(error: HorizonError) -> Self {
        SignerUpdateError::SequenceLookupFailed(error)
    }
}

impl From<stellar_xdr::curr::Error> for SignerUpdateError {
    fn from(error: stellar_xdr::curr::Error) -> Self {
        SignerUpdateError::EncodingFailed(error)
    }
}

/// A validated request to add a set of ed25519 signers to an account.
#[derive(Clone, Debug)]
pub struct SignerUpdate {
    account_id: String,
    account: [u8; 32],
    signers: Vec<[u8; 32]>,
    voters_threshold: u32,
}

impl SignerUpdate {
    pub fn new(
        account_id: &str,
        signers: &[String],
        voters_threshold: u32,
    ) -> Result<Self, SignerUpdateError> {
        let account = decode_account_id(account_id).map_err(SignerUpdateError::InvalidAccount)?;

        if signers.is_empty() {
            return Err(SignerUpdateError::NoSigners);
        }

        if signers.len() > MAX_SIGNERS {
            return Err(SignerUpdateError::TooManySigners(signers.len()));
        }

        if voters_threshold == 0 {
            return Err(SignerUpdateError::ZeroVotersThreshold);
        }

        let signers = signers
            .iter()
            .enumerate()
            .map(|(i, s)| decode_account_id(s).map_err(|e| SignerUpdateError::InvalidSigner(i, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            account_id: String::from(account_id),
            account,
            signers,
            voters_threshold,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Weight given to every signer. A weight of zero would remove the signer, so the weight
    /// never drops below one.
    pub fn signer_weight(&self) -> u32 {
        (VOTING_POWER / self.voters_threshold).max(1)
    }

    pub fn operations(&self) -> Vec<Operation> {
        let weight = self.signer_weight();
        let mut operations = Vec::with_capacity(self.signers.len() * 2);

        for signer in self.signers.iter() {
            // The thresholds are set again ahead of every signer rather than once per transaction.
            // The end state is the same; only the operation count grows.
            operations.push(set_options(SetOptionsOp {
                med_threshold: Some(MED_THRESHOLD),
                high_threshold: Some(HIGH_THRESHOLD),
                ..empty_set_options()
            }));

            operations.push(set_options(SetOptionsOp {
                signer: Some(Signer {
                    key: SignerKey::Ed25519(Uint256(*signer)),
                    weight,
                }),
                ..empty_set_options()
            }));
        }

        operations
    }

    /// Builds the transaction for an account whose current sequence number is
    /// `current_sequence`. Time bounds are left open.
    pub fn build_transaction(&self, current_sequence: i64) -> Result<Transaction, SignerUpdateError> {
        let next_sequence = current_sequence
            .checked_add(1)
            .ok_or(SignerUpdateError::SequenceOverflow)?;

        let operations = self.operations();
        let fee = BASE_FEE * operations.len() as u32;
        let operations: VecM<Operation, 100> = operations
            .try_into()
            .map_err(|_| SignerUpdateError::TooManySigners(self.signers.len()))?;

        Ok(Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(self.account)),
            fee,
            seq_num: SequenceNumber(next_sequence),
            cond: Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(0),
            }),
            memo: Memo::None,
            operations,
            ext: TransactionExt::V0,
        })
    }
}

fn empty_set_options() -> SetOptionsOp {
    SetOptionsOp {
        inflation_dest: None,
        clear_flags: None,
        set_flags: None,
        master_weight: None,
        low_threshold: None,
        med_threshold: None,
        high_threshold: None,
        home_domain: None,
        signer: None,
    }
}

fn set_options(op: SetOptionsOp) -> Operation {
    Operation {
        source_account: None,
        body: OperationBody::SetOptions(op),
    }
}

#[derive(Clone, Debug)]
pub struct UnsignedTransaction {
    /// Base64 XDR of a `TransactionEnvelope` with no signatures
    pub envelope_xdr: String,
    pub network_passphrase: String,
    pub operation_count: usize,
}

pub struct SignerTransactionBuilder {
    sequence_source: Arc<dyn AccountSequenceSource>,
    network_passphrase: String,
}

impl SignerTransactionBuilder {
    pub fn new(sequence_source: Arc<dyn AccountSequenceSource>, network_passphrase: &str) -> Self {
        Self {
            sequence_source,
            network_passphrase: String::from(network_passphrase),
        }
    }

    /// Looks up the account's sequence number once and returns the unsigned envelope. Nothing is
    /// signed or submitted; the wallet holding the account key does that.
    pub async fn build(
        &self,
        update: &SignerUpdate,
    ) -> Result<UnsignedTransaction, SignerUpdateError> {
        let current_sequence = self
            .sequence_source
            .current_sequence(update.account_id())
            .await?;

        let tx = update.build_transaction(current_sequence)?;
        let operation_count = tx.operations.len();

        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx,
            signatures: VecM::default(),
        });

        Ok(UnsignedTransaction {
            envelope_xdr: envelope.to_xdr_base64(Limits::none())?,
            network_passphrase: self.network_passphrase.clone(),
            operation_count,
        })
    }
}
