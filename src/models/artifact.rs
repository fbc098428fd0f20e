use crate::config::Settings;
use crate::utils::constants::{
    CONSOLIDATED_COLUMNS, CSV_EXTRACT_COLUMNS, FIXED_WIDTH_EXTRACT_COLUMNS, TSV_EXTRACT_COLUMNS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Every file that takes part in the stage hand-off contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Artifact {
    VehicleData,
    TollPlazaData,
    PaymentData,
    CsvExtract,
    TsvExtract,
    FixedWidthExtract,
    Consolidated,
    Transformed,
}

impl Artifact {
    pub const ALL: [Artifact; 8] = [
        Artifact::VehicleData,
        Artifact::TollPlazaData,
        Artifact::PaymentData,
        Artifact::CsvExtract,
        Artifact::TsvExtract,
        Artifact::FixedWidthExtract,
        Artifact::Consolidated,
        Artifact::Transformed,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Artifact::VehicleData => "vehicle data (csv)",
            Artifact::TollPlazaData => "toll plaza data (tsv)",
            Artifact::PaymentData => "payment data (fixed-width)",
            Artifact::CsvExtract => "csv extract",
            Artifact::TsvExtract => "tsv extract",
            Artifact::FixedWidthExtract => "fixed-width extract",
            Artifact::Consolidated => "consolidated data",
            Artifact::Transformed => "transformed data",
        }
    }

    /// Header of the artifact, or `None` for raw headerless sources.
    pub fn columns(&self) -> Option<&'static [&'static str]> {
        match self {
            Artifact::VehicleData | Artifact::TollPlazaData | Artifact::PaymentData => None,
            Artifact::CsvExtract => Some(&CSV_EXTRACT_COLUMNS),
            Artifact::TsvExtract => Some(&TSV_EXTRACT_COLUMNS),
            Artifact::FixedWidthExtract => Some(&FIXED_WIDTH_EXTRACT_COLUMNS),
            Artifact::Consolidated | Artifact::Transformed => Some(&CONSOLIDATED_COLUMNS),
        }
    }

    pub fn is_raw_source(&self) -> bool {
        self.columns().is_none()
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Resolves artifacts to concrete paths inside one staging directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    settings: Settings,
}

impl StagingArea {
    pub fn new(settings: Settings) -> Self {
        Self {
            root: settings.staging_dir.clone(),
            settings,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        let sources = &self.settings.sources;
        let outputs = &self.settings.outputs;
        let file_name = match artifact {
            Artifact::VehicleData => &sources.csv,
            Artifact::TollPlazaData => &sources.tsv,
            Artifact::PaymentData => &sources.fixed_width,
            Artifact::CsvExtract => &outputs.csv_extract,
            Artifact::TsvExtract => &outputs.tsv_extract,
            Artifact::FixedWidthExtract => &outputs.fixed_width_extract,
            Artifact::Consolidated => &outputs.consolidated,
            Artifact::Transformed => &outputs.transformed,
        };
        self.root.join(file_name)
    }
}
