//! Import settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// Default number of ledger rows per bulk insert.
pub const DEFAULT_INFRA_CHUNK_SIZE: usize = 500;

/// Default number of plots per payment-marker query.
pub const DEFAULT_PAID_CHUNK_SIZE: usize = 200;

/// Default bound on a whole commit (10 minutes).
pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 600;

/// Tunables for staging, committing and fee resolution.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes:
///
/// ```toml
/// infra_chunk_size = 1000
/// import_timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Ledger rows per bulk insert request.
    pub infra_chunk_size: usize,
    /// Plots per `in (...)` payment-marker query.
    pub paid_chunk_size: usize,
    /// Overall bound on one commit.
    pub import_timeout_secs: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            infra_chunk_size: DEFAULT_INFRA_CHUNK_SIZE,
            paid_chunk_size: DEFAULT_PAID_CHUNK_SIZE,
            import_timeout_secs: DEFAULT_IMPORT_TIMEOUT_SECS,
        }
    }
}

impl ImportSettings {
    /// Parses settings from TOML text and validates them.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|err| ImportError::Config(err.message().to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| ImportError::Config(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.infra_chunk_size == 0 {
            return Err(ImportError::Config(
                "infra_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.paid_chunk_size == 0 {
            return Err(ImportError::Config(
                "paid_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.import_timeout_secs == 0 {
            return Err(ImportError::Config(
                "import_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_secs)
    }

    #[must_use]
    pub fn with_infra_chunk_size(mut self, size: usize) -> Self {
        self.infra_chunk_size = size;
        self
    }

    #[must_use]
    pub fn with_paid_chunk_size(mut self, size: usize) -> Self {
        self.paid_chunk_size = size;
        self
    }

    #[must_use]
    pub fn with_import_timeout(mut self, timeout: Duration) -> Self {
        self.import_timeout_secs = timeout.as_secs().max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = ImportSettings::from_toml_str("infra_chunk_size = 1000\n").unwrap();
        assert_eq!(settings.infra_chunk_size, 1000);
        assert_eq!(settings.paid_chunk_size, DEFAULT_PAID_CHUNK_SIZE);
        assert_eq!(settings.import_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn zero_chunk_is_rejected() {
        let err = ImportSettings::from_toml_str("paid_chunk_size = 0\n").unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));
    }

    #[test]
    fn unknown_types_are_rejected() {
        let err = ImportSettings::from_toml_str("infra_chunk_size = \"big\"\n").unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("import.toml");
        std::fs::write(&path, "import_timeout_secs = 30\n").expect("write file");
        let settings = ImportSettings::load(&path).unwrap();
        assert_eq!(settings.import_timeout_secs, 30);
    }
}
