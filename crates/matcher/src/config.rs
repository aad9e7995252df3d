use std::collections::HashSet;

use serde::Deserialize;

use crate::error::MatchError;
use crate::ranker::DEFAULT_TOP_K;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    pub name: String,
    pub suppliers: Vec<SupplierConfig>,
    pub buyers: BuyerConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Suppliers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierConfig {
    /// Tag written to `supplier_source` on every item from this table.
    pub source: String,
    pub layout: SupplierLayout,
    pub file: String,
    /// Worksheet to read for spreadsheet inputs. First sheet when unset.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub dimensional: Option<DimensionalOptions>,
    #[serde(default)]
    pub described: Option<DescribedOptions>,
}

impl SupplierConfig {
    /// Options for the dimensional layout, falling back to the stock column names.
    pub fn dimensional_options(&self) -> DimensionalOptions {
        self.dimensional.clone().unwrap_or_default()
    }

    /// Options for the described layout, falling back to the stock column names.
    pub fn described_options(&self) -> DescribedOptions {
        self.described.clone().unwrap_or_default()
    }
}

/// Raw table shape of a supplier. Each layout has its own mapping function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierLayout {
    /// One row per coil with explicit thickness and width columns.
    Dimensional,
    /// Material code plus a free-text description; no dimensions.
    Described,
}

impl std::fmt::Display for SupplierLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dimensional => write!(f, "dimensional"),
            Self::Described => write!(f, "described"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DimensionalOptions {
    pub columns: DimensionalColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DimensionalColumns {
    pub quality: String,
    pub grade: String,
    pub finish: String,
    pub thickness: String,
    pub width: String,
    pub description: String,
    pub weight: String,
    pub quantity: String,
}

impl Default for DimensionalColumns {
    fn default() -> Self {
        Self {
            quality: "Quality/Choice".into(),
            grade: "Grade".into(),
            finish: "Finish".into(),
            thickness: "Thickness (mm)".into(),
            width: "Width (mm)".into(),
            description: "Description".into(),
            weight: "Gross weight (kg)".into(),
            quantity: "Quantity".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DescribedOptions {
    pub columns: DescribedColumns,
    /// Phrase removed from the description to obtain the finish.
    pub finish_prefix: String,
    /// Reservation values that keep a row out of the unified set.
    pub reserved_markers: Vec<String>,
    /// Quality written for every item, since the layout carries none.
    pub quality: String,
}

impl Default for DescribedOptions {
    fn default() -> Self {
        Self {
            columns: DescribedColumns::default(),
            finish_prefix: "Material is ".into(),
            reserved_markers: vec!["VANILLA".into()],
            quality: "NA".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DescribedColumns {
    pub grade: String,
    pub description: String,
    pub weight: String,
    pub quantity: String,
    pub reserved: String,
}

impl Default for DescribedColumns {
    fn default() -> Self {
        Self {
            grade: "Material".into(),
            description: "Description".into(),
            weight: "Weight (kg)".into(),
            quantity: "Quantity".into(),
            reserved: "Reserved".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Buyers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BuyerConfig {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
    #[serde(default)]
    pub columns: BuyerColumns,
}

/// What to do when a buyer id appears on more than one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Abort the run.
    #[default]
    Error,
    /// Keep the later row and record a diagnostic.
    LastWins,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuyerColumns {
    pub buyer_id: String,
    pub grade: String,
    pub finish: String,
    pub thickness: String,
    pub width: String,
    pub max_weight: String,
    pub min_quantity: String,
}

impl Default for BuyerColumns {
    fn default() -> Self {
        Self {
            buyer_id: "Buyer ID".into(),
            grade: "Preferred Grade".into(),
            finish: "Preferred Finish".into(),
            thickness: "Preferred Thickness (mm)".into(),
            width: "Preferred Width (mm)".into(),
            max_weight: "Max Weight (kg)".into(),
            min_quantity: "Min Quantity".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub finish_vocabulary: FinishVocabulary,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            finish_vocabulary: FinishVocabulary::default(),
        }
    }
}

/// Which buyer finish field the filter and the scorer compare against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishVocabulary {
    /// The finish exactly as the buyer wrote it.
    #[default]
    Original,
    /// The finish after translation to the shared vocabulary.
    Translated,
}

impl std::fmt::Display for FinishVocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Translated => write!(f, "translated"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub sqlite: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.suppliers.is_empty() {
            return Err(MatchError::ConfigValidation(
                "at least 1 supplier is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for supplier in &self.suppliers {
            if supplier.source.trim().is_empty() {
                return Err(MatchError::ConfigValidation(
                    "supplier source must not be empty".into(),
                ));
            }
            if !seen.insert(supplier.source.as_str()) {
                return Err(MatchError::ConfigValidation(format!(
                    "duplicate supplier source '{}'",
                    supplier.source
                )));
            }
            if supplier.file.trim().is_empty() {
                return Err(MatchError::ConfigValidation(format!(
                    "supplier '{}': file must not be empty",
                    supplier.source
                )));
            }

            // Layout-specific blocks only make sense on their own layout
            match supplier.layout {
                SupplierLayout::Dimensional if supplier.described.is_some() => {
                    return Err(MatchError::ConfigValidation(format!(
                        "supplier '{}': [described] options on a dimensional layout",
                        supplier.source
                    )));
                }
                SupplierLayout::Described if supplier.dimensional.is_some() => {
                    return Err(MatchError::ConfigValidation(format!(
                        "supplier '{}': [dimensional] options on a described layout",
                        supplier.source
                    )));
                }
                _ => {}
            }
        }

        if self.buyers.file.trim().is_empty() {
            return Err(MatchError::ConfigValidation(
                "buyers: file must not be empty".into(),
            ));
        }

        if self.matching.top_k == 0 {
            return Err(MatchError::ConfigValidation(
                "matching.top_k must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
