//! Analysis configuration
//!
//! [`AnalysisConfig`] collects every knob of one pipeline run. It is a plain
//! value handed to the pipeline; every field has a default, so a JSON
//! configuration file only needs to list what it changes.
//!
//! ```
//! use tidystat_analysis::config::AnalysisConfig;
//!
//! let json = r#"{ "group_var": "Act", "export": { "groups_csv": true } }"#;
//! let config: AnalysisConfig = serde_json::from_str(json).unwrap();
//! assert_eq!(config.group_var, "Act");
//! assert!(config.export.groups_csv);
//! assert_eq!(config.export.groups_dir.to_str(), Some("exported_csvs"));
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input table path.
    pub csv_name: PathBuf,
    /// Field delimiter of the input table. Must be an ASCII character.
    pub delimiter: char,
    /// Column that partitions the records into groups.
    pub group_var: String,
    /// Columns to summarize, in output order.
    pub statistics_vars: Vec<String>,
    /// Print the tidy table after aggregation.
    pub check_df: bool,
    /// Print the nested statistics as JSON after aggregation.
    pub check_dict: bool,
    pub export: ExportConfig,
    pub regression: RegressionConfig,
    pub plots: PlotConfig,
    /// Number given to the first generated figure.
    pub start_fig: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            csv_name: PathBuf::from("dades.csv"),
            delimiter: ',',
            group_var: "Mar".to_owned(),
            statistics_vars: strings(&[
                "Pre-T", "Pre-D", "Pre-I", "Pre-V", "Post-T", "Post-D", "Post-I", "Post-V",
                "Pre-Son", "Post-Son",
            ]),
            check_df: false,
            check_dict: false,
            export: ExportConfig::default(),
            regression: RegressionConfig::default(),
            plots: PlotConfig::default(),
            start_fig: 1,
        }
    }
}

impl AnalysisConfig {
    /// Delimiter as a byte, or `None` for a non-ASCII character.
    #[must_use]
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}

/// CSV artifacts written after aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Write the whole tidy table to `full_csv_name`.
    pub full_csv: bool,
    pub full_csv_name: PathBuf,
    /// Write one file per group into `groups_dir`.
    pub groups_csv: bool,
    /// Columns kept in the per-group files.
    pub groups_csv_vars: Vec<String>,
    pub groups_dir: PathBuf,
    /// Per-group files are named `<group>_<groups_suffix>.csv`.
    pub groups_suffix: String,
    /// Create `groups_dir` when it does not exist instead of failing.
    pub create_dir: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            full_csv: false,
            full_csv_name: PathBuf::from("estadisticas_completas.csv"),
            groups_csv: false,
            groups_csv_vars: strings(&["Stat", "Pre-D", "Post-D"]),
            groups_dir: PathBuf::from("exported_csvs"),
            groups_suffix: "PreD_PostD".to_owned(),
            create_dir: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub enabled: bool,
    pub x: String,
    pub y: String,
    /// Recompute covariance and correlation by hand from the rounded
    /// summaries and compare.
    pub step_by_step: bool,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            x: "Post-D".to_owned(),
            y: "Post-Son".to_owned(),
            step_by_step: false,
        }
    }
}

/// Variables drawn by the boxplot figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// `(before, after)` pairs, one figure per pair.
    pub paired_vars: Vec<(String, String)>,
    /// Variables of the overview figure, one slot per variable.
    pub overview_vars: Vec<String>,
    /// Variables whose first-group means are marked on the overview figure,
    /// matched to `overview_vars` by position.
    pub overview_reference_vars: Vec<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        let pairs = [
            ("Pre-T", "Post-T"),
            ("Pre-D", "Post-D"),
            ("Pre-I", "Post-I"),
            ("Pre-V", "Post-V"),
            ("Pre-Son", "Post-Son"),
        ];
        Self {
            paired_vars: pairs
                .iter()
                .map(|(a, b)| ((*a).to_owned(), (*b).to_owned()))
                .collect(),
            overview_vars: pairs.iter().map(|(_, b)| (*b).to_owned()).collect(),
            overview_reference_vars: pairs.iter().map(|(a, _)| (*a).to_owned()).collect(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_owned()).collect()
}
