//! Solidity compilation through `solc --standard-json`.
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    process::Stdio,
};

use alloy::{hex, json_abi::JsonAbi, primitives::Bytes};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{
    artifacts::{CompilationArtifactSet, ContractMetadata},
    Error, Result,
};

/// Environment variable pointing at the `solc` binary to use.
pub const SOLC_ENV_VAR_NAME: &str = "SOLC";

/// Options for [`compile`].
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Suppress progress and compiler warnings. Errors are always returned.
    pub silent: bool,
    /// Path to the `solc` binary.
    pub solc: PathBuf,
    /// Enable the optimizer with the given number of runs.
    pub optimizer_runs: Option<u32>,
    /// Target EVM version, e.g. `"paris"`.
    pub evm_version: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        let solc = std::env::var_os(SOLC_ENV_VAR_NAME)
            .map_or_else(|| PathBuf::from("solc"), PathBuf::from);

        Self { silent: false, solc, optimizer_runs: None, evm_version: None }
    }
}

impl CompileOptions {
    /// Default options with output suppressed.
    #[must_use]
    pub fn silent() -> Self {
        Self { silent: true, ..Self::default() }
    }
}

/// Compile `paths` and every source they import.
///
/// # Errors
///
/// * [`Error::Io`] - If a path cannot be resolved.
/// * [`Error::Compilation`] - If `solc` cannot be run, or reports an error in
///   any source.
pub async fn compile<P: AsRef<Path>>(
    paths: &[P],
    options: &CompileOptions,
) -> Result<CompilationArtifactSet> {
    let sources = paths
        .iter()
        .map(|path| path.as_ref().canonicalize())
        .collect::<std::io::Result<Vec<_>>>()?;

    let input = standard_json_input(&sources, options);
    let allow_paths = sources
        .iter()
        .filter_map(|source| source.parent())
        .map(|dir| dir.display().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",");

    if !options.silent {
        tracing::info!(
            files = sources.len(),
            solc = %options.solc.display(),
            "compiling solidity sources"
        );
    }

    let mut child = Command::new(&options.solc)
        .arg("--standard-json")
        .arg("--allow-paths")
        .arg(&allow_paths)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::Compilation(format!(
                "failed to run `{}`: {e}",
                options.solc.display()
            ))
        })?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
        Error::Compilation("failed to open solc stdin".to_owned())
    })?;
    stdin.write_all(input.to_string().as_bytes()).await.map_err(|e| {
        Error::Compilation(format!(
            "failed to pass input to `{}`: {e}",
            options.solc.display()
        ))
    })?;
    drop(stdin);

    let output = child.wait_with_output().await?;

    // `--standard-json` reports source errors in its output and exits with
    // success, a failing status means solc itself was misused.
    if !output.status.success() && output.stdout.is_empty() {
        return Err(Error::Compilation(
            String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        ));
    }

    let artifacts = parse_output(&output.stdout)?;

    if !options.silent {
        for warning in artifacts.warnings() {
            tracing::warn!("{warning}");
        }
        tracing::info!(contracts = artifacts.len(), "compilation finished");
    }

    Ok(artifacts)
}

/// Version string reported by `solc --version`, e.g.
/// `0.8.24+commit.e11b9ed9.Linux.g++`.
///
/// # Errors
///
/// * [`Error::Compilation`] - If `solc` cannot be run or its output has no
///   version.
pub async fn compiler_version(solc: impl AsRef<Path>) -> Result<String> {
    static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"Version:\s*(\S+)").expect("version regex should compile")
    });

    let solc = solc.as_ref();
    let output =
        Command::new(solc).arg("--version").output().await.map_err(|e| {
            Error::Compilation(format!(
                "failed to run `{}`: {e}",
                solc.display()
            ))
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    VERSION_REGEX
        .captures(&stdout)
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str().to_owned())
        .ok_or_else(|| {
            Error::Compilation(format!("no version found in `{stdout}`"))
        })
}

fn standard_json_input(
    sources: &[PathBuf],
    options: &CompileOptions,
) -> serde_json::Value {
    let sources: serde_json::Map<_, _> = sources
        .iter()
        .map(|source| {
            let name = source.display().to_string();
            (name.clone(), json!({ "urls": [name] }))
        })
        .collect();

    let mut settings = json!({
        "optimizer": {
            "enabled": options.optimizer_runs.is_some(),
            "runs": options.optimizer_runs.unwrap_or(200),
        },
        "outputSelection": {
            "*": {
                "*": ["abi", "evm.bytecode.object", "evm.deployedBytecode.object"]
            }
        }
    });
    if let Some(evm_version) = &options.evm_version {
        settings["evmVersion"] = json!(evm_version);
    }

    json!({
        "language": "Solidity",
        "sources": sources,
        "settings": settings,
    })
}

#[derive(Debug, Deserialize)]
struct SolcOutput {
    #[serde(default)]
    errors: Vec<SolcDiagnostic>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, SolcContract>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolcDiagnostic {
    severity: String,
    message: String,
    #[serde(default)]
    formatted_message: Option<String>,
}

impl SolcDiagnostic {
    fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }

    fn render(&self) -> String {
        self.formatted_message
            .clone()
            .unwrap_or_else(|| format!("{}: {}", self.severity, self.message))
            .trim_end()
            .to_owned()
    }
}

#[derive(Debug, Deserialize)]
struct SolcContract {
    #[serde(default)]
    abi: JsonAbi,
    #[serde(default)]
    evm: SolcEvm,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolcEvm {
    #[serde(default)]
    bytecode: SolcBytecode,
    #[serde(default)]
    deployed_bytecode: SolcBytecode,
}

#[derive(Debug, Default, Deserialize)]
struct SolcBytecode {
    #[serde(default)]
    object: String,
}

/// Turn raw `solc --standard-json` output into artifacts.
pub(crate) fn parse_output(stdout: &[u8]) -> Result<CompilationArtifactSet> {
    let output: SolcOutput = serde_json::from_slice(stdout).map_err(|e| {
        Error::Compilation(format!("unexpected solc output: {e}"))
    })?;

    let (errors, warnings): (Vec<_>, Vec<_>) =
        output.errors.iter().partition(|diagnostic| diagnostic.is_error());

    if !errors.is_empty() {
        let messages = errors
            .iter()
            .map(|diagnostic| diagnostic.render())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(Error::Compilation(messages));
    }

    let mut contracts = BTreeMap::new();
    for (source, compiled) in output.contracts {
        let mut by_name = BTreeMap::new();
        for (name, contract) in compiled {
            let bytecode = decode_bytecode(&name, &contract.evm.bytecode)?;
            let deployed_bytecode =
                decode_bytecode(&name, &contract.evm.deployed_bytecode)?;
            by_name.insert(
                name.clone(),
                ContractMetadata {
                    name,
                    abi: contract.abi,
                    bytecode,
                    deployed_bytecode,
                },
            );
        }
        contracts.insert(PathBuf::from(source), by_name);
    }

    let warnings = warnings.iter().map(|warning| warning.render()).collect();
    Ok(CompilationArtifactSet::new(contracts, warnings))
}

fn decode_bytecode(name: &str, bytecode: &SolcBytecode) -> Result<Bytes> {
    static LINK_PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"__\$[0-9a-fA-F]{34}\$__")
            .expect("link placeholder regex should compile")
    });

    if LINK_PLACEHOLDER_REGEX.is_match(&bytecode.object) {
        return Err(Error::Compilation(format!(
            "contract `{name}` references unlinked libraries"
        )));
    }

    hex::decode(&bytecode.object).map(Bytes::from).map_err(|e| {
        Error::Compilation(format!("invalid bytecode for `{name}`: {e}"))
    })
}
