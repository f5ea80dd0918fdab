use std::fmt;
use std::path::{Path, PathBuf};

/// A fully qualified contract identifier, `<source path>:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractSpec {
    pub path: Option<PathBuf>,
    pub name: String,
}

impl ContractSpec {
    pub fn path_name(path: impl Into<PathBuf>, name: impl ToString) -> Self {
        Self {
            path: Some(path.into()),
            name: name.to_string(),
        }
    }

    pub fn name(name: impl ToString) -> Self {
        Self {
            path: None,
            name: name.to_string(),
        }
    }

    /// The source file of the contract, `<Name>.sol` when no path is set.
    pub fn source_path(&self) -> PathBuf {
        match self.path.as_deref() {
            Some(path) => path.to_owned(),
            None => PathBuf::from(format!("{}.sol", self.name)),
        }
    }

    /// Location of the hardhat artifact relative to the artifacts root.
    pub fn artifact_path(&self, artifacts_root: impl AsRef<Path>) -> PathBuf {
        artifacts_root
            .as_ref()
            .join(self.source_path())
            .join(format!("{}.json", self.name))
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.path.as_deref() {
            write!(f, "{}:{}", path.display(), self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
