//! Compilation artifacts and their lookup by source file.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use alloy::{json_abi::JsonAbi, primitives::Bytes};

use crate::{Error, Result};

/// ABI and bytecode of a single compiled contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractMetadata {
    /// Contract name as declared in the source.
    pub name: String,
    /// Contract ABI. Holds at most one constructor.
    pub abi: JsonAbi,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: Bytes,
    /// Runtime bytecode.
    pub deployed_bytecode: Bytes,
}

impl ContractMetadata {
    /// Whether the contract has creation code, i.e. it is neither an
    /// interface nor abstract.
    #[must_use]
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}

/// Every contract produced by one compiler run, keyed by source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilationArtifactSet {
    contracts: BTreeMap<PathBuf, BTreeMap<String, ContractMetadata>>,
    warnings: Vec<String>,
}

impl CompilationArtifactSet {
    pub(crate) fn new(
        contracts: BTreeMap<PathBuf, BTreeMap<String, ContractMetadata>>,
        warnings: Vec<String>,
    ) -> Self {
        Self { contracts, warnings }
    }

    /// Contract defined in `path`.
    ///
    /// Picks the contract named after the file stem, or the only contract in
    /// the file.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] - If `path` was not compiled or no single
    ///   contract can be picked.
    pub fn get(&self, path: impl AsRef<Path>) -> Result<&ContractMetadata> {
        let path = path.as_ref();
        let contracts = self.source(path)?;

        let by_stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| contracts.get(stem));

        by_stem
            .or_else(|| match contracts.len() {
                1 => contracts.values().next(),
                _ => None,
            })
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))
    }

    /// Contract `name` defined in `path`.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] - If `path` was not compiled or declares no
    ///   contract `name`.
    pub fn contract(
        &self,
        path: impl AsRef<Path>,
        name: &str,
    ) -> Result<&ContractMetadata> {
        let path = path.as_ref();
        self.source(path)?
            .get(name)
            .ok_or_else(|| Error::NotFound(path.join(name)))
    }

    /// Iterate over `(source, contract)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ContractMetadata)> {
        self.contracts.iter().flat_map(|(path, contracts)| {
            contracts.values().map(move |contract| (path.as_path(), contract))
        })
    }

    /// Source files present in the set, including imported ones.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.contracts.keys().map(PathBuf::as_path)
    }

    /// Total number of contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.values().map(BTreeMap::len).sum()
    }

    /// Whether the set holds no contract at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Warnings reported by the compiler.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn source(
        &self,
        path: &Path,
    ) -> Result<&BTreeMap<String, ContractMetadata>> {
        // Keys are canonical paths, fall back to the literal path for
        // sources that no longer exist on disk.
        let canonical = path.canonicalize().ok();
        canonical
            .as_deref()
            .and_then(|canonical| self.contracts.get(canonical))
            .or_else(|| self.contracts.get(path))
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))
    }
}

/// Contract defined in `path`, see [`CompilationArtifactSet::get`].
///
/// # Errors
///
/// * [`Error::NotFound`] - If `path` was not part of the compilation, or no
///   contract can be picked from it.
pub fn get_compiled_contracts(
    artifacts: &CompilationArtifactSet,
    path: impl AsRef<Path>,
) -> Result<&ContractMetadata> {
    artifacts.get(path)
}
