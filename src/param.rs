use crate::error::{BinciError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[allow(non_camel_case_types)]
pub enum OutputFormat {
    text,
    json,
}

// Field definitions and associated default values

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Param {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub bootstrap: Bootstrap,
    #[serde(default)]
    pub threshold: Threshold,
    #[serde(default)]
    pub curves: Curves,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct General {
    #[serde(default = "seed_default")]
    pub seed: u64,
    #[serde(default = "uzero_default")]
    pub thread_number: usize,
    #[serde(default = "log_base_default")]
    pub log_base: String,
    #[serde(default = "log_suffix_default")]
    pub log_suffix: String,
    #[serde(default = "log_level_default")]
    pub log_level: String,
    #[serde(default = "true_default")]
    pub display_colorful: bool,
    #[serde(default = "output_default")]
    pub output: OutputFormat,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Data {
    /// TSV with a header line and columns sample, label, score
    #[serde(default = "empty_string")]
    pub path: String,
    #[serde(default = "true_default")]
    pub has_header: bool,
    /// sort rows by descending score; when false the file must already be sorted
    #[serde(default = "true_default")]
    pub sort_scores: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Bootstrap {
    #[serde(default = "n_bootstrap_default")]
    pub n_bootstrap: usize,
    #[serde(default = "conf_default")]
    pub conf: f64,
    #[serde(default = "max_attempts_default")]
    pub max_attempts: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Threshold {
    #[serde(default)]
    pub min_precision: Option<f64>,
    #[serde(default)]
    pub min_specificity: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Curves {
    #[serde(default = "true_default")]
    pub compute_pr: bool,
    #[serde(default = "true_default")]
    pub compute_sr: bool,
    #[serde(default = "true_default")]
    pub compute_auc: bool,
}

// Default section definitions

impl Default for General {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Data {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Threshold {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Curves {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Param {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Param {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Read and validate a YAML parameter file
pub fn get(param_file: String) -> Result<Param> {
    let param_file_reader = File::open(param_file)?;
    let param_reader = BufReader::new(param_file_reader);
    let mut config: Param = serde_yaml::from_reader(param_reader)?;
    validate(&mut config).map_err(BinciError::Config)?;
    Ok(config)
}

pub fn validate(param: &mut Param) -> std::result::Result<(), String> {
    if !param.general.log_base.is_empty() {
        param.general.display_colorful = false;
    }
    if param.data.path.is_empty() {
        return Err("data.path must point to a TSV file (sample, label, score).".to_string());
    }
    validate_bootstrap(param)?;
    validate_targets(param)?;
    if !param.curves.compute_auc
        && !param.curves.compute_pr
        && !param.curves.compute_sr
        && param.threshold.min_precision.is_none()
        && param.threshold.min_specificity.is_none()
    {
        warn!("Nothing to compute: every curve is disabled and no threshold target is set.");
    }
    Ok(())
}

fn validate_bootstrap(param: &mut Param) -> std::result::Result<(), String> {
    if param.bootstrap.n_bootstrap == 0 {
        return Err("Invalid n_bootstrap=0. Must be >= 1.".to_string());
    }
    if !(param.bootstrap.conf > 0.0 && param.bootstrap.conf < 1.0) {
        return Err(format!(
            "Invalid conf={:.3}. Must be in range (0, 1).",
            param.bootstrap.conf
        ));
    }
    if param.bootstrap.max_attempts == 0 {
        return Err("Invalid max_attempts=0. Must be >= 1.".to_string());
    }

    const B_MIN: usize = 1000; // CI (Efron & Tibshirani 1993)
    const B_REC: usize = 2000; // Robustness (Rousselet et al. 2021)
    let b = param.bootstrap.n_bootstrap;
    if b < B_MIN {
        warn!(
            "Bootstrap B={} < {} (Efron & Tibshirani 1993 minimum for percentile CI). \
                Quantile estimates may be unstable.",
            b, B_MIN
        );
    } else if b < B_REC {
        warn!(
            "Bootstrap B={} < {} (Rousselet et al. 2021 recommendation). \
                Percentile CI may be too narrow for small samples. \
                Consider B ≥ {} for {}% CI stability.",
            b,
            B_REC,
            B_REC,
            param.bootstrap.conf * 100.0
        );
    }
    Ok(())
}

fn validate_targets(param: &mut Param) -> std::result::Result<(), String> {
    for (name, target) in [
        ("min_precision", param.threshold.min_precision),
        ("min_specificity", param.threshold.min_specificity),
    ] {
        if let Some(value) = target {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("Invalid {}={:.3}. Must be in range [0, 1].", name, value));
            }
        }
    }
    Ok(())
}

// Default value definitions

fn seed_default() -> u64 {
    4815162342
}

fn empty_string() -> String {
    "".to_string()
}

fn uzero_default() -> usize {
    0
}

fn true_default() -> bool {
    true
}

fn log_base_default() -> String {
    "".to_string()
}

fn log_suffix_default() -> String {
    "log".to_string()
}

fn log_level_default() -> String {
    "info".to_string()
}

fn output_default() -> OutputFormat {
    OutputFormat::text
}

fn n_bootstrap_default() -> usize {
    crate::bootstrap::DEFAULT_N_BOOTSTRAP
}

fn conf_default() -> f64 {
    crate::bootstrap::DEFAULT_CONF
}

fn max_attempts_default() -> usize {
    crate::bootstrap::DEFAULT_MAX_ATTEMPTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let param = Param::default();
        assert_eq!(param.general.seed, 4815162342);
        assert_eq!(param.bootstrap.n_bootstrap, 10_000);
        assert_eq!(param.bootstrap.conf, 0.95);
        assert_eq!(param.threshold.min_precision, None);
        assert_eq!(param.general.output, OutputFormat::text);
        assert!(param.curves.compute_pr && param.curves.compute_sr && param.curves.compute_auc);
    }

    #[test]
    fn test_yaml_partial_sections() {
        let yaml = "
general:
  seed: 7
  output: json
data:
  path: scores.tsv
bootstrap:
  n_bootstrap: 500
threshold:
  min_precision: 0.8
";
        let mut param: Param = serde_yaml::from_str(yaml).unwrap();
        assert!(validate(&mut param).is_ok());
        assert_eq!(param.general.seed, 7);
        assert_eq!(param.general.output, OutputFormat::json);
        assert_eq!(param.bootstrap.n_bootstrap, 500);
        assert_eq!(param.bootstrap.conf, 0.95, "unset fields should keep their default");
        assert_eq!(param.threshold.min_precision, Some(0.8));
        assert_eq!(param.threshold.min_specificity, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut param = Param::default();
        assert!(validate(&mut param).is_err(), "missing data path should be rejected");

        param.data.path = "scores.tsv".to_string();
        param.bootstrap.conf = 1.0;
        assert!(validate(&mut param).is_err());

        param.bootstrap.conf = 0.9;
        param.bootstrap.n_bootstrap = 0;
        assert!(validate(&mut param).is_err());

        param.bootstrap.n_bootstrap = 100;
        param.threshold.min_specificity = Some(1.2);
        assert!(validate(&mut param).is_err());

        param.threshold.min_specificity = Some(0.9);
        assert!(validate(&mut param).is_ok());
    }

    #[test]
    fn test_log_base_disables_colors() {
        let mut param = Param::default();
        param.data.path = "scores.tsv".to_string();
        param.general.log_base = "binci".to_string();
        validate(&mut param).unwrap();
        assert!(!param.general.display_colorful);
    }
}
