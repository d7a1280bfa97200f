//! What a deployment is called with: constructor arguments, transaction
//! options, or both.
use alloy::primitives::U256;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Transaction fields a caller may pin instead of letting the provider fill
/// them.
///
/// Deserializes from the JSON-RPC shape, e.g.
/// `{ "gasPrice": "0x4a817c800", "gas": 3000000 }`. Quantities may be hex or
/// decimal strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeployOptions {
    /// Gas price in wei. Setting it sends a legacy transaction.
    pub gas_price: Option<U256>,
    /// Gas limit.
    #[serde(alias = "gasLimit")]
    pub gas: Option<U256>,
    /// Sender nonce.
    pub nonce: Option<U256>,
    /// Wei sent along to a payable constructor.
    pub value: Option<U256>,
}

impl DeployOptions {
    /// Parse options from a JSON object.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOptions`] - If `value` is not an object of known
    ///   fields with numeric values.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidOptions(e.to_string()))
    }

    /// Set the gas price in wei.
    #[must_use]
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(U256::from(gas_price));
        self
    }

    /// Set the gas limit.
    #[must_use]
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(U256::from(gas));
        self
    }

    /// Set the sender nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(U256::from(nonce));
        self
    }

    /// Set the value sent to the constructor.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub(crate) fn gas_price_wei(&self) -> Result<Option<u128>> {
        narrow(self.gas_price, "gasPrice")
    }

    pub(crate) fn gas_limit(&self) -> Result<Option<u64>> {
        narrow(self.gas, "gas")
    }

    pub(crate) fn nonce_value(&self) -> Result<Option<u64>> {
        narrow(self.nonce, "nonce")
    }
}

fn narrow<T: TryFrom<U256>>(
    value: Option<U256>,
    field: &str,
) -> Result<Option<T>> {
    value
        .map(|value| {
            T::try_from(value).map_err(|_| {
                Error::InvalidOptions(format!(
                    "`{field}` is out of range: {value}"
                ))
            })
        })
        .transpose()
}

/// Input to a deployment.
///
/// Replaces the "array of arguments or options object" convention with two
/// explicit, optional halves. Omitted arguments count as zero arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeployInput {
    /// Positional constructor arguments.
    pub args: Option<Vec<Value>>,
    /// Transaction options.
    pub options: DeployOptions,
}

impl DeployInput {
    /// Constructor arguments only.
    #[must_use]
    pub fn args(args: Vec<Value>) -> Self {
        Self { args: Some(args), options: DeployOptions::default() }
    }

    /// Transaction options only.
    #[must_use]
    pub fn options(options: DeployOptions) -> Self {
        Self { args: None, options }
    }

    /// Number of supplied arguments.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.args.as_ref().map_or(0, Vec::len)
    }

    /// Interpret a single JSON value the way a loosely typed caller would:
    /// an array is a list of constructor arguments, an object is a set of
    /// options, `null` is nothing.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOptions`] - If `value` is a scalar, or an object
    ///   with unknown fields.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Array(args) => Ok(Self::args(args)),
            Value::Object(_) => {
                DeployOptions::from_json(value).map(Self::options)
            }
            other => Err(Error::InvalidOptions(format!(
                "expected an argument array or an options object, got `{other}`"
            ))),
        }
    }
}

impl From<()> for DeployInput {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<Vec<Value>> for DeployInput {
    fn from(args: Vec<Value>) -> Self {
        Self::args(args)
    }
}

impl From<DeployOptions> for DeployInput {
    fn from(options: DeployOptions) -> Self {
        Self::options(options)
    }
}

impl From<(Vec<Value>, DeployOptions)> for DeployInput {
    fn from((args, options): (Vec<Value>, DeployOptions)) -> Self {
        Self { args: Some(args), options }
    }
}
