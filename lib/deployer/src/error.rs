use std::path::PathBuf;

use alloy::primitives::TxHash;

/// Convenience alias for results returned by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while compiling or deploying a contract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `solc` rejected the sources, or could not be run at all.
    #[error("compilation failed:\n{0}")]
    Compilation(String),
    /// No contract was found for the requested source file.
    #[error("no compiled contract found for `{}`", .0.display())]
    NotFound(PathBuf),
    /// The number of constructor arguments does not match the ABI.
    #[error("constructor expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Number of constructor parameters in the ABI.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },
    /// A constructor argument could not be converted to its ABI type.
    #[error("invalid constructor argument #{index} of type `{ty}`: {reason}")]
    ArgumentType {
        /// Zero-based position of the argument.
        index: usize,
        /// Solidity type the argument was matched against.
        ty: String,
        /// Why the conversion failed.
        reason: String,
    },
    /// The contract has no creation code (interface or abstract contract).
    #[error("contract `{0}` has no bytecode to deploy")]
    EmptyBytecode(String),
    /// The client store was read before it was set.
    #[error("client is not set, call `ClientStore::set_with_url` first")]
    IllegalState,
    /// Submitting the transaction or reading its receipt failed.
    #[error("network error: {0}")]
    Network(String),
    /// The deployment transaction was mined but reverted.
    #[error("deployment transaction {0} reverted")]
    TransactionReverted(TxHash),
    /// The mnemonic phrase could not be turned into a key.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    /// The bytes do not form a valid secp256k1 private key.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// Transaction options could not be parsed or are out of range.
    #[error("invalid deployment options: {0}")]
    InvalidOptions(String),
    /// The configuration file is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Filesystem or subprocess I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
