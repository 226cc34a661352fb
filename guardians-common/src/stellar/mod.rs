pub mod horizon;
pub mod keypair;
pub mod signers;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Fee per operation, in stroops
pub const BASE_FEE: u32 = 100;
