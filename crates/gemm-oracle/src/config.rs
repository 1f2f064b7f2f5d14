use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{LaunchErrorMode, LoggerConfig, OracleError, OracleLogLevel, SuiteConfig, ToleranceProfile};

/// Static mutex holding the global configuration, initialized as `None`.
static ORACLE_GLOBAL_CONFIG: spin::Mutex<Option<Arc<OracleConfig>>> = spin::Mutex::new(None);

/// Name of the configuration file looked up from the current directory.
pub const CONFIG_FILE_NAME: &str = "gemm-oracle.toml";

/// Seed of the random operands (`u64`).
pub const SEED_ENV: &str = "GEMM_ORACLE_SEED";
/// Log sink: `stdout`, `stderr`, `1`/`true` (temp file), `0`/`false` (disabled) or a file path.
pub const LOG_ENV: &str = "GEMM_ORACLE_LOG";
/// Behavior on engine launch errors: `panic` or `skip`.
pub const TEST_MODE_ENV: &str = "GEMM_ORACLE_TEST_MODE";
/// Path of the JSON report written after a suite run.
pub const REPORT_ENV: &str = "GEMM_ORACLE_REPORT";

/// Configuration of the matmul oracle.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Seed of the random operands, drawn from entropy when missing.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub tolerance: ToleranceProfile,

    #[serde(default)]
    pub logger: LoggerConfig,

    /// What to do when the engine can't launch a case.
    #[serde(default)]
    pub launch_errors: LaunchErrorMode,

    /// Where to write the JSON report of a suite run.
    #[serde(default)]
    pub report: Option<PathBuf>,

    #[serde(default)]
    pub suite: SuiteConfig,
}

impl OracleConfig {
    /// Retrieves the current global configuration, loading it if not set.
    ///
    /// If no configuration is set, it is loaded from `gemm-oracle.toml` in the current
    /// directory or its parents, then overridden from the environment. If no file is
    /// found, a default configuration is used.
    ///
    /// # Panics
    /// Panics if the configuration file or an environment override is malformed.
    pub fn get() -> Arc<Self> {
        let mut state = ORACLE_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Self::from_current_dir()
                    .and_then(Self::override_from_env)
                    .unwrap_or_else(|err| panic!("{err}"));
                let config = Arc::new(config);
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    pub fn set(config: Self) {
        let mut state = ORACLE_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Saves the configuration to the provided file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OracleError> {
        let content = toml::to_string_pretty(self).map_err(|err| OracleError::Config {
            reason: err.to_string(),
        })?;

        std::fs::write(path.as_ref(), content).map_err(|err| OracleError::Config {
            reason: format!("{:?}: {err}", path.as_ref()),
        })
    }

    /// Loads the configuration from `gemm-oracle.toml` in the current directory or
    /// its parents, falling back to the default configuration.
    pub fn from_current_dir() -> Result<Self, OracleError> {
        let dir = std::env::current_dir().map_err(|err| OracleError::Config {
            reason: format!("Unable to read the current directory: {err}"),
        })?;

        Ok(Self::find_from(dir)?.unwrap_or_default())
    }

    // Traverses up the directory tree until a configuration file is found or the root is reached.
    fn find_from(mut dir: PathBuf) -> Result<Option<Self>, OracleError> {
        loop {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                return Self::from_file_path(path).map(Some);
            }

            if !dir.pop() {
                return Ok(None);
            }
        }
    }

    /// Loads the configuration from a TOML file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| OracleError::Config {
            reason: format!("{path:?}: {err}"),
        })?;

        toml::from_str(&content).map_err(|err| OracleError::Config {
            reason: format!("The file {path:?} doesn't have the right format => {err}"),
        })
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(self) -> Result<Self, OracleError> {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// Overrides configuration fields from the variables returned by `var`.
    pub fn override_from<F>(mut self, var: F) -> Result<Self, OracleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var(SEED_ENV) {
            let seed = val.trim().parse().map_err(|err| OracleError::Config {
                reason: format!("{SEED_ENV}={val} isn't a valid seed: {err}"),
            })?;
            self.seed = Some(seed);
        }

        if let Some(val) = var(LOG_ENV) {
            self.logger.level = OracleLogLevel::Full;

            match val.as_str() {
                "stdout" => self.logger.stdout = true,
                "stderr" => self.logger.stderr = true,
                "1" | "true" => {
                    self.logger.file = Some(std::env::temp_dir().join("gemm-oracle.log"));
                }
                "0" | "false" => self.logger.level = OracleLogLevel::Disabled,
                file_path => self.logger.file = Some(file_path.into()),
            }
        }

        if let Some(val) = var(TEST_MODE_ENV) {
            match val.as_str() {
                "panic" => self.launch_errors = LaunchErrorMode::Panic,
                "skip" => self.launch_errors = LaunchErrorMode::Skip,
                _ => {}
            }
        }

        if let Some(val) = var(REPORT_ENV) {
            self.report = Some(val.into());
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElemKind, Tolerance};
    use hashbrown::HashMap;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect();

        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: OracleConfig = toml::from_str("").unwrap();

        assert_eq!(config, OracleConfig::default());
        assert_eq!(config.launch_errors, LaunchErrorMode::Skip);
        assert_eq!(config.tolerance.standard, Tolerance::STANDARD);
    }

    #[test]
    fn loads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
            seed = 7
            launch_errors = "panic"

            [tolerance.low]
            rtol = 0.1
            atol = 0.3

            [suite]
            elems = ["float32", "float16"]
            "#,
        )
        .unwrap();

        let config = OracleConfig::from_file_path(&path).unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.launch_errors, LaunchErrorMode::Panic);
        assert_eq!(config.tolerance.low, Tolerance::new(0.1, 0.3));
        assert_eq!(config.tolerance.standard, Tolerance::STANDARD);
        assert_eq!(config.suite.elems, vec![ElemKind::F32, ElemKind::F16]);
        assert_eq!(config.suite.sizes, vec![1, 3, 5]);
    }

    #[test]
    fn finds_file_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "seed = 99").unwrap();

        let config = OracleConfig::find_from(nested).unwrap().unwrap();

        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "seed = \"not a number\"").unwrap();

        assert!(matches!(
            OracleConfig::from_file_path(&path),
            Err(OracleError::Config { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = OracleConfig {
            seed: Some(3),
            report: Some("report.json".into()),
            ..Default::default()
        };

        config.save(&path).unwrap();

        assert_eq!(OracleConfig::from_file_path(&path).unwrap(), config);
    }

    #[test]
    fn environment_overrides() {
        let config = OracleConfig::default()
            .override_from(vars(&[
                (SEED_ENV, "1234"),
                (LOG_ENV, "stderr"),
                (TEST_MODE_ENV, "panic"),
                (REPORT_ENV, "/tmp/report.json"),
            ]))
            .unwrap();

        assert_eq!(config.seed, Some(1234));
        assert!(config.logger.stderr);
        assert_eq!(config.logger.level, OracleLogLevel::Full);
        assert_eq!(config.launch_errors, LaunchErrorMode::Panic);
        assert_eq!(config.report, Some(PathBuf::from("/tmp/report.json")));
    }

    #[test]
    fn log_override_can_disable() {
        let config = OracleConfig::default()
            .override_from(vars(&[(LOG_ENV, "0")]))
            .unwrap();

        assert_eq!(config.logger.level, OracleLogLevel::Disabled);
    }

    #[test]
    fn invalid_seed_override_is_rejected() {
        let result = OracleConfig::default().override_from(vars(&[(SEED_ENV, "abc")]));

        assert!(matches!(result, Err(OracleError::Config { .. })));
    }

    #[test]
    fn unknown_test_mode_is_ignored() {
        let config = OracleConfig::default()
            .override_from(vars(&[(TEST_MODE_ENV, "sometimes")]))
            .unwrap();

        assert_eq!(config.launch_errors, LaunchErrorMode::Skip);
    }
}
