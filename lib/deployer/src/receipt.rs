use alloy::{primitives::Address, rpc::types::TransactionReceipt};

use crate::{Error, Result};

/// Extension trait to recover address of the contract that was deployed.
pub trait Ext {
    /// Returns the address of the contract from the [`TransactionReceipt`].
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If the receipt is not one of a deployment.
    fn address(&self) -> Result<Address>;
}

impl Ext for TransactionReceipt {
    fn address(&self) -> Result<Address> {
        self.contract_address.ok_or_else(|| {
            Error::Network(format!(
                "receipt of {} has no contract address",
                self.transaction_hash
            ))
        })
    }
}
