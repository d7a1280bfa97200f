use std::path::Path;

use alloy::{
    dyn_abi::DynSolValue,
    network::{ReceiptResponse, TransactionBuilder},
    primitives::Bytes,
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use serde_json::Value;

use crate::{
    args::parse_args,
    artifacts::{get_compiled_contracts, ContractMetadata},
    client::Client,
    compile::{compile, CompileOptions},
    keys::PrivateKey,
    options::{DeployInput, DeployOptions},
    receipt::Ext,
    Error, Result,
};

/// A configurable contract deployer acting on behalf of one key.
#[derive(Clone, Debug)]
pub struct Deployer {
    client: Client,
    private_key: PrivateKey,
    input: DeployInput,
}

impl Deployer {
    /// Deployer sending transactions signed by `private_key` through
    /// `client`.
    #[must_use]
    pub fn new(client: Client, private_key: PrivateKey) -> Self {
        Self { client, private_key, input: DeployInput::default() }
    }

    /// Add constructor arguments.
    #[must_use]
    pub fn with_constructor(mut self, args: Vec<Value>) -> Self {
        self.input.args = Some(args);
        self
    }

    /// Pin transaction fields.
    #[must_use]
    pub fn with_options(mut self, options: DeployOptions) -> Self {
        self.input.options = options;
        self
    }

    /// What the next deployment will be called with.
    #[must_use]
    pub fn input(&self) -> &DeployInput {
        &self.input
    }

    /// Deploy `contract` with the configured arguments and options.
    ///
    /// # Errors
    ///
    /// See [`deploy`].
    pub async fn deploy(
        &self,
        contract: &ContractMetadata,
    ) -> Result<TransactionReceipt> {
        deploy(&self.client, contract, &self.private_key, self.input.clone())
            .await
    }
}

/// Creation code for `contract`: its bytecode followed by the ABI encoded
/// constructor arguments.
///
/// A constructor without parameters ignores any supplied argument. Otherwise
/// the number of arguments must match the number of parameters exactly,
/// omitted arguments counting as none.
///
/// # Errors
///
/// * [`Error::EmptyBytecode`] - If `contract` is an interface or abstract.
/// * [`Error::ArgumentCount`] - If the argument count does not match.
/// * [`Error::ArgumentType`] - If an argument does not fit its parameter.
pub fn deployment_code(
    contract: &ContractMetadata,
    input: &DeployInput,
) -> Result<Bytes> {
    if !contract.is_deployable() {
        return Err(Error::EmptyBytecode(contract.name.clone()));
    }

    let Some(constructor) =
        contract.abi.constructor().filter(|ctor| !ctor.inputs.is_empty())
    else {
        if input.arg_count() > 0 {
            tracing::warn!(
                contract = %contract.name,
                ignored = input.arg_count(),
                "constructor takes no arguments, ignoring supplied ones"
            );
        }
        return Ok(contract.bytecode.clone());
    };

    let args = input.args.as_deref().unwrap_or_default();
    let values = parse_args(&constructor.inputs, args)?;
    let encoded = DynSolValue::Tuple(values).abi_encode_params();

    Ok([&contract.bytecode[..], &encoded[..]].concat().into())
}

/// Deploy `contract` signed by `private_key`, and wait for its receipt.
///
/// `input` is anything convertible into [`DeployInput`]: `()`, a
/// `Vec<serde_json::Value>` of constructor arguments, [`DeployOptions`], or
/// both as a tuple.
///
/// # Errors
///
/// * [`Error::EmptyBytecode`], [`Error::ArgumentCount`],
///   [`Error::ArgumentType`] - See [`deployment_code`].
/// * [`Error::InvalidOptions`] - If an option does not fit its field.
/// * [`Error::Network`] - If sending fails, or the receipt cannot be read or
///   lacks a contract address.
/// * [`Error::TransactionReverted`] - If the deployment reverted.
pub async fn deploy(
    client: &Client,
    contract: &ContractMetadata,
    private_key: &PrivateKey,
    input: impl Into<DeployInput>,
) -> Result<TransactionReceipt> {
    let input = input.into();
    let code = deployment_code(contract, &input)?;
    let tx = deployment_request(private_key, code, &input.options)?;

    tracing::info!(
        contract = %contract.name,
        from = %private_key.address(),
        "deploying contract"
    );
    tracing::debug!(
        code_len = tx.input.input().map_or(0, |code| code.len()),
        gas_price = ?tx.gas_price,
        gas = ?tx.gas,
        nonce = ?tx.nonce,
        "deployment transaction"
    );

    let pending = client
        .wallet(private_key)
        .send_transaction(tx)
        .await
        .map_err(|e| {
            tracing::error!(contract = %contract.name, "deployment failed: {e}");
            Error::Network(format!("failed to send deployment: {e}"))
        })?;

    let tx_hash = *pending.tx_hash();
    let receipt = pending.get_receipt().await.map_err(|e| {
        Error::Network(format!("failed to get receipt of {tx_hash}: {e}"))
    })?;

    if !receipt.status() {
        return Err(Error::TransactionReverted(tx_hash));
    }

    let address = receipt.address()?;

    tracing::info!(
        contract = %contract.name,
        %address,
        %tx_hash,
        "contract deployed"
    );

    Ok(receipt)
}

/// Compile `path` and deploy the contract it defines.
///
/// # Errors
///
/// Any error of [`compile`], [`get_compiled_contracts`] or [`deploy`].
pub async fn compile_and_deploy(
    client: &Client,
    path: impl AsRef<Path>,
    private_key: &PrivateKey,
    input: impl Into<DeployInput>,
    options: &CompileOptions,
) -> Result<TransactionReceipt> {
    let path = path.as_ref();
    let artifacts = compile(&[path], options).await?;
    let contract = get_compiled_contracts(&artifacts, path)?;
    deploy(client, contract, private_key, input).await
}

fn deployment_request(
    private_key: &PrivateKey,
    code: Bytes,
    options: &DeployOptions,
) -> Result<TransactionRequest> {
    let mut tx = TransactionRequest::default()
        .with_from(private_key.address())
        .with_deploy_code(code);

    if let Some(gas_price) = options.gas_price_wei()? {
        tx.set_gas_price(gas_price);
    }
    if let Some(gas) = options.gas_limit()? {
        tx.set_gas_limit(gas);
    }
    if let Some(nonce) = options.nonce_value()? {
        tx.set_nonce(nonce);
    }
    if let Some(value) = options.value {
        tx.set_value(value);
    }

    Ok(tx)
}
