#![cfg(feature = "e2e")]

use std::path::{Path, PathBuf};

use alloy::providers::Provider;
use contract_deployer::{
    compile, compile_and_deploy, deploy, get_compiled_contracts,
    get_private_key_at, is_address, private_key_to_address, ClientStore,
    CompilationArtifactSet, CompileOptions, Config, DeployInput,
    DeployOptions, Deployer, Error, PrivateKey, ReceiptExt,
};
use eyre::{Result, WrapErr};
use serde_json::json;

const GAS_PRICE: u128 = 20_000_000_000;

fn contract_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("contracts").join(name)
}

fn config() -> Result<Config> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/test.env.json");
    Config::from_file(&path).wrap_err("failed to load test environment")
}

/// Each test signs with its own dev account so nonces never collide.
fn account(config: &Config, index: u32) -> Result<PrivateKey> {
    Ok(get_private_key_at(&config.mnemonic, index)?)
}

async fn compile_fixtures() -> Result<CompilationArtifactSet> {
    let paths = [
        contract_path("DependencyA.sol"),
        contract_path("DependencyD.sol"),
        contract_path("SecondB.sol"),
    ];
    Ok(compile(&paths, &CompileOptions::silent()).await?)
}

#[tokio::test]
async fn compiles_sources_and_imports() -> Result<()> {
    let artifacts = compile_fixtures().await?;

    for name in ["DependencyA.sol", "DependencyB.sol", "DependencyC.sol"] {
        let contract = get_compiled_contracts(&artifacts, contract_path(name))?;
        assert!(contract.is_deployable());
    }
    assert!(artifacts.len() >= 5);

    Ok(())
}

#[tokio::test]
async fn fails_on_broken_source() -> Result<()> {
    let err = compile(&[contract_path("Broken.sol")], &CompileOptions::silent())
        .await
        .expect_err("source has a syntax error");

    assert!(matches!(err, Error::Compilation(_)));
    Ok(())
}

#[tokio::test]
async fn rejects_wrong_argument_count() -> Result<()> {
    let config = config()?;
    let client = config.client()?;
    let key = account(&config, 1)?;
    let artifacts = compile_fixtures().await?;

    let a = get_compiled_contracts(&artifacts, contract_path("DependencyA.sol"))?;
    let err = deploy(&client, a, &key, ()).await.expect_err("needs 3 args");
    assert!(matches!(err, Error::ArgumentCount { expected: 3, actual: 0 }));

    let d = get_compiled_contracts(&artifacts, contract_path("DependencyD.sol"))?;
    let args = [1, 2, 3, 4, 55, 6, 6].map(|n| json!(n)).to_vec();
    let err = deploy(&client, d, &key, args).await.expect_err("needs 2 args");
    assert!(matches!(err, Error::ArgumentCount { expected: 2, actual: 7 }));

    Ok(())
}

#[tokio::test]
async fn deploys_without_constructor() -> Result<()> {
    let config = config()?;
    let client = config.client()?;
    let key = account(&config, 2)?;
    let artifacts = compile_fixtures().await?;
    let second_b =
        get_compiled_contracts(&artifacts, contract_path("SecondB.sol"))?;

    let receipt = deploy(&client, second_b, &key, ()).await?;
    assert!(is_address(&receipt.address()?.to_string()));

    let receipt = deploy(&client, second_b, &key, vec![json!(1), json!(6)])
        .await
        .wrap_err("arguments to a parameterless constructor are ignored")?;
    assert!(is_address(&receipt.address()?.to_string()));

    Ok(())
}

#[tokio::test]
async fn deploys_with_dependencies() -> Result<()> {
    let config = config()?;
    let client = config.client()?;
    let key = account(&config, 3)?;
    let owner = private_key_to_address(&key).to_string();
    let artifacts = compile_fixtures().await?;

    let mut dependencies = vec![];
    for name in ["DependencyB.sol", "DependencyC.sol"] {
        let contract = get_compiled_contracts(&artifacts, contract_path(name))?;
        let receipt = deploy(&client, contract, &key, ()).await?;
        dependencies.push(json!(receipt.address()?.to_string()));
    }
    dependencies.push(json!(owner));

    let a = get_compiled_contracts(&artifacts, contract_path("DependencyA.sol"))?;
    let receipt = deploy(&client, a, &key, dependencies).await?;
    let address = receipt.address()?;

    assert!(is_address(&address.to_string()));
    let code = client.provider().get_code_at(address).await?;
    assert_eq!(code, a.deployed_bytecode);

    Ok(())
}

#[tokio::test]
async fn parses_array_literal_arguments() -> Result<()> {
    let config = config()?;
    let client = config.client()?;
    let key = account(&config, 4)?;
    let owner = private_key_to_address(&key).to_string();
    let artifacts = compile_fixtures().await?;
    let d = get_compiled_contracts(&artifacts, contract_path("DependencyD.sol"))?;

    let literal = deploy(&client, d, &key, vec![json!("[1,2,3]"), json!(owner)])
        .await?;
    let native =
        deploy(&client, d, &key, vec![json!([1, 2, 3]), json!(owner)]).await?;

    for receipt in [literal, native] {
        assert!(is_address(&receipt.address()?.to_string()));
    }

    Ok(())
}

#[tokio::test]
async fn applies_options_without_arguments() -> Result<()> {
    let config = config()?;
    let client = config.client()?;
    let key = account(&config, 5)?;
    let artifacts = compile_fixtures().await?;
    let second_b =
        get_compiled_contracts(&artifacts, contract_path("SecondB.sol"))?;

    let options = DeployOptions::from_json(json!({ "gasPrice": "0x4a817c800" }))?;
    let receipt = deploy(&client, second_b, &key, options).await?;

    assert_eq!(receipt.effective_gas_price, GAS_PRICE);
    assert!(is_address(&receipt.address()?.to_string()));

    let input = DeployInput::from_json(json!([1, 6]))?;
    let receipt = Deployer::new(client, key)
        .with_constructor(input.args.unwrap_or_default())
        .with_options(DeployOptions::default().with_gas_price(GAS_PRICE))
        .deploy(second_b)
        .await?;
    assert_eq!(receipt.effective_gas_price, GAS_PRICE);

    Ok(())
}

#[tokio::test]
async fn compiles_and_deploys_in_one_step() -> Result<()> {
    let config = config()?;
    let client = config.client()?;
    let key = account(&config, 6)?;

    let receipt = compile_and_deploy(
        &client,
        contract_path("SecondB.sol"),
        &key,
        (),
        &CompileOptions::silent(),
    )
    .await?;

    assert!(is_address(&receipt.address()?.to_string()));
    Ok(())
}

#[tokio::test]
async fn uses_and_releases_shared_client() -> Result<()> {
    let config = config()?;
    ClientStore::set_with_url(&config.url)?;

    let client = ClientStore::get()?;
    let chain_id = client.chain_id().await?;
    assert!(chain_id > 0);
    assert!(client.gas_price().await? > 0);

    ClientStore::delete();
    assert!(matches!(ClientStore::get(), Err(Error::IllegalState)));

    Ok(())
}
