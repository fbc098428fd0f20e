use crate::error::Result;
use crate::utils::constants::{
    CONSOLIDATED_FILE, CSV_EXTRACT_FILE, DEFAULT_CONFIG_FILE, ENV_PREFIX,
    FIXED_WIDTH_EXTRACT_FILE, PAYMENT_DATA_FILE, TOLLPLAZA_DATA_FILE, TRANSFORMED_FILE,
    TSV_EXTRACT_FILE, VEHICLE_DATA_FILE,
};
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// What the consolidator does when the three extracts differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Stop at the shortest extract and log a warning.
    #[default]
    Truncate,
    /// Fail the stage without writing output.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SourceFiles {
    #[validate(length(min = 1))]
    pub csv: String,

    #[validate(length(min = 1))]
    pub tsv: String,

    #[validate(length(min = 1))]
    pub fixed_width: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct OutputFiles {
    #[validate(length(min = 1))]
    pub csv_extract: String,

    #[validate(length(min = 1))]
    pub tsv_extract: String,

    #[validate(length(min = 1))]
    pub fixed_width_extract: String,

    #[validate(length(min = 1))]
    pub consolidated: String,

    #[validate(length(min = 1))]
    pub transformed: String,
}

/// Pipeline configuration loaded from defaults, an optional TOML file and
/// `TOLL_ETL_*` environment variables, in that order of precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub staging_dir: PathBuf,

    #[validate(nested)]
    pub sources: SourceFiles,

    #[validate(nested)]
    pub outputs: OutputFiles,

    pub alignment: AlignmentPolicy,

    pub concurrent_extraction: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("staging"),
            sources: SourceFiles {
                csv: VEHICLE_DATA_FILE.to_string(),
                tsv: TOLLPLAZA_DATA_FILE.to_string(),
                fixed_width: PAYMENT_DATA_FILE.to_string(),
            },
            outputs: OutputFiles {
                csv_extract: CSV_EXTRACT_FILE.to_string(),
                tsv_extract: TSV_EXTRACT_FILE.to_string(),
                fixed_width_extract: FIXED_WIDTH_EXTRACT_FILE.to_string(),
                consolidated: CONSOLIDATED_FILE.to_string(),
                transformed: TRANSFORMED_FILE.to_string(),
            },
            alignment: AlignmentPolicy::default(),
            concurrent_extraction: true,
        }
    }
}

impl Settings {
    pub fn with_staging_dir(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            ..Self::default()
        }
    }

    /// Load settings. An explicit `config_file` must exist; otherwise
    /// `toll-etl.toml` in the working directory is used when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_file, None)
    }

    /// `env` replaces the process environment when given.
    fn load_with_env(config_file: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file_source)
            // TOLL_ETL_STAGING_DIR, TOLL_ETL_SOURCES__CSV, TOLL_ETL_ALIGNMENT, ...
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_concurrent_extraction(mut self, concurrent_extraction: bool) -> Self {
        self.concurrent_extraction = concurrent_extraction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.alignment, AlignmentPolicy::Truncate);
        assert_eq!(settings.sources.fixed_width, "payment-data.txt");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "staging_dir = \"/data/staging\"\nalignment = \"strict\"\n\n[sources]\ncsv = \"vehicles.csv\""
        )?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.staging_dir, PathBuf::from("/data/staging"));
        assert_eq!(settings.alignment, AlignmentPolicy::Strict);
        assert_eq!(settings.sources.csv, "vehicles.csv");
        // untouched keys keep their defaults
        assert_eq!(settings.sources.tsv, "tollplaza-data.tsv");
        assert_eq!(settings.outputs.transformed, "transformed_data.csv");

        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "alignment = \"truncate\"\n\n[sources]\ncsv = \"vehicles.csv\"")?;

        let mut env = Map::new();
        env.insert("TOLL_ETL_ALIGNMENT".to_string(), "strict".to_string());
        env.insert("TOLL_ETL_SOURCES__CSV".to_string(), "from-env.csv".to_string());
        env.insert("TOLL_ETL_CONCURRENT_EXTRACTION".to_string(), "false".to_string());
        env.insert("OTHER_APP_ALIGNMENT".to_string(), "truncate".to_string());

        let settings = Settings::load_with_env(Some(file.path()), Some(env))?;
        assert_eq!(settings.alignment, AlignmentPolicy::Strict);
        assert_eq!(settings.sources.csv, "from-env.csv");
        assert!(!settings.concurrent_extraction);
        assert_eq!(settings.sources.tsv, "tollplaza-data.tsv");
        Ok(())
    }

    #[test]
    fn test_empty_file_name_rejected() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[outputs]\nconsolidated = \"\"")?;

        assert!(Settings::load(Some(file.path())).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_file() {
        assert!(Settings::load(Some(Path::new("/nonexistent/toll-etl.toml"))).is_err());
    }
}
