//! `deployer` command-line tool.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contract_deployer::{
    compile, deploy, get_compiled_contracts, CompileOptions, Config,
    DeployInput, DeployOptions, ReceiptExt,
};
use eyre::WrapErr;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Compile Solidity contracts and deploy them over JSON-RPC.
#[derive(Debug, Parser)]
#[command(name = "deployer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile sources and list the contracts they define.
    Compile {
        /// Solidity sources to compile.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        solc: SolcArgs,
    },
    /// Compile a source and deploy its contract.
    Deploy {
        /// Solidity source defining the contract.
        file: PathBuf,
        /// Contract to deploy, when the file defines several.
        #[arg(long)]
        contract: Option<String>,
        /// Constructor argument, in declaration order. Arrays may be given
        /// as literals such as `[1,2,3]`.
        #[arg(long = "arg", value_name = "VALUE")]
        args: Vec<String>,
        /// Gas price in wei.
        #[arg(long)]
        gas_price: Option<u128>,
        /// Gas limit.
        #[arg(long)]
        gas: Option<u64>,
        /// JSON file holding `mnemonic` and `url`.
        #[arg(long, default_value = "deployer.json")]
        config: PathBuf,
        #[command(flatten)]
        solc: SolcArgs,
    },
}

#[derive(Debug, clap::Args)]
struct SolcArgs {
    /// Path to the `solc` binary. Defaults to `$SOLC`, then `solc`.
    #[arg(long)]
    solc: Option<PathBuf>,
    /// Enable the optimizer with this many runs.
    #[arg(long)]
    optimize_runs: Option<u32>,
}

impl SolcArgs {
    fn into_options(self) -> CompileOptions {
        let mut options = CompileOptions::default();
        if let Some(solc) = self.solc {
            options.solc = solc;
        }
        options.optimizer_runs = self.optimize_runs;
        options
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Compile { files, solc } => {
            let artifacts = compile(&files, &solc.into_options())
                .await
                .wrap_err("failed to compile sources")?;

            for (source, contract) in artifacts.iter() {
                println!(
                    "{}:{} ({} bytes)",
                    source.display(),
                    contract.name,
                    contract.bytecode.len()
                );
            }
        }
        Command::Deploy { file, contract, args, gas_price, gas, config, solc } => {
            let config = Config::from_file(&config).wrap_err_with(|| {
                format!("failed to load config {}", config.display())
            })?;
            tracing::debug!(url = %config.url, "loaded config");
            let client = config.client()?;
            let key = config.private_key()?;

            let artifacts = compile(&[&file], &solc.into_options())
                .await
                .wrap_err("failed to compile source")?;
            let metadata = match &contract {
                Some(name) => artifacts.contract(&file, name)?,
                None => get_compiled_contracts(&artifacts, &file)?,
            };

            let mut options = DeployOptions::default();
            if let Some(gas_price) = gas_price {
                options = options.with_gas_price(gas_price);
            }
            if let Some(gas) = gas {
                options = options.with_gas(gas);
            }
            let input = DeployInput {
                args: (!args.is_empty())
                    .then(|| args.into_iter().map(Value::String).collect()),
                options,
            };

            let receipt = deploy(&client, metadata, &key, input)
                .await
                .wrap_err_with(|| format!("failed to deploy {}", metadata.name))?;

            println!("contract: {}", metadata.name);
            println!("address: {}", receipt.address()?);
            println!("transaction: {}", receipt.transaction_hash);
        }
    }

    Ok(())
}
