/*!
Compile Solidity sources with `solc` and deploy the resulting contracts over
JSON-RPC.

The usual flow compiles a set of files, picks the artifact for one of them
and sends its creation transaction:

```rust,ignore
use contract_deployer::{
    compile, deploy, get_compiled_contracts, get_private_key, Client,
    CompileOptions, ReceiptExt,
};
use serde_json::json;

let artifacts = compile(&["contracts/DependencyD.sol"], CompileOptions::default()).await?;
let contract = get_compiled_contracts(&artifacts, "contracts/DependencyD.sol")?;

let client = Client::new("http://localhost:8545")?;
let key = get_private_key(MNEMONIC)?;
let receipt = deploy(
    &client,
    contract,
    &key,
    vec![json!("[1, 2]"), json!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")],
)
.await?;
let address = receipt.address()?;
```

Constructor arguments are loosely typed JSON values. Numbers may be given
as JSON numbers or decimal/hex strings, and arrays either as JSON arrays or
as string literals such as `"[1, 2]"`. See [`coerce`].
*/
mod args;
mod artifacts;
mod client;
mod compile;
mod config;
mod deploy;
mod error;
mod keys;
mod options;
mod receipt;

pub use args::{coerce, parse_args, parse_literal};
pub use artifacts::{
    get_compiled_contracts, CompilationArtifactSet, ContractMetadata,
};
pub use client::{Client, ClientStore};
pub use compile::{compile, compiler_version, CompileOptions, SOLC_ENV_VAR_NAME};
pub use config::{Config, RPC_URL_ENV_VAR_NAME};
pub use deploy::{compile_and_deploy, deploy, deployment_code, Deployer};
pub use error::{Error, Result};
pub use keys::{
    get_private_key, get_private_key_at, is_address, private_key_to_address,
    PrivateKey,
};
pub use options::{DeployInput, DeployOptions};
pub use receipt::Ext as ReceiptExt;
