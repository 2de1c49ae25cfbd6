// 輸出順序固定為 [標準化數值欄位..., one-hot 類別欄位...]

use crate::domain::model::{FeatureRow, FeatureValue};
use crate::utils::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// One-hot encoder with sorted category lists per column.
///
/// Unknown categories encode to an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// `columns[c]` holds every training value of categorical column `c`.
    pub fn fit(columns: &[Vec<&str>]) -> Self {
        let categories = columns
            .iter()
            .map(|values| {
                let mut cats: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                cats.sort();
                cats.dedup();
                cats
            })
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    pub fn n_columns(&self) -> usize {
        self.categories.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn transform_into(&self, values: &[&str], out: &mut Vec<f64>) -> Result<()> {
        if values.len() != self.categories.len() {
            return Err(PredictorError::PreprocessingError {
                message: format!(
                    "Encoder expects {} categorical columns, got {}",
                    self.categories.len(),
                    values.len()
                ),
            });
        }

        for (cats, value) in self.categories.iter().zip(values) {
            let hit = cats.binary_search_by(|c| c.as_str().cmp(*value)).ok();
            out.extend((0..cats.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }
        Ok(())
    }
}

/// Per-column standardisation using population statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// `columns[c]` holds every training value of numeric column `c`.
    pub fn fit(columns: &[Vec<f64>]) -> Result<Self> {
        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for (idx, values) in columns.iter().enumerate() {
            if values.is_empty() {
                return Err(PredictorError::ModelError {
                    message: format!("Cannot fit scaler on empty column {}", idx),
                });
            }
            let n = values.len() as f64;
            let m = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();

            mean.push(m);
            // 常數欄位不縮放
            scale.push(if std > f64::EPSILON { std } else { 1.0 });
        }

        Ok(Self { mean, scale })
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn transform_into(&self, values: &[f64], out: &mut Vec<f64>) -> Result<()> {
        if values.len() != self.mean.len() {
            return Err(PredictorError::PreprocessingError {
                message: format!(
                    "Scaler expects {} numeric columns, got {}",
                    self.mean.len(),
                    values.len()
                ),
            });
        }

        out.extend(
            values
                .iter()
                .zip(self.mean.iter().zip(&self.scale))
                .map(|(v, (m, s))| (v - m) / s),
        );
        Ok(())
    }
}

/// Encoder, scaler and the column order they were fitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePipeline {
    pub(crate) encoder: OneHotEncoder,
    pub(crate) scaler: StandardScaler,
    pub(crate) cat_cols: Vec<String>,
    pub(crate) num_cols: Vec<String>,
}

impl FeaturePipeline {
    pub fn new(
        encoder: OneHotEncoder,
        scaler: StandardScaler,
        cat_cols: Vec<String>,
        num_cols: Vec<String>,
    ) -> Result<Self> {
        if encoder.n_columns() != cat_cols.len() {
            return Err(PredictorError::ModelError {
                message: format!(
                    "Encoder was fitted on {} columns but {} categorical columns are listed",
                    encoder.n_columns(),
                    cat_cols.len()
                ),
            });
        }
        if scaler.mean().len() != num_cols.len() {
            return Err(PredictorError::ModelError {
                message: format!(
                    "Scaler was fitted on {} columns but {} numeric columns are listed",
                    scaler.mean().len(),
                    num_cols.len()
                ),
            });
        }
        Ok(Self {
            encoder,
            scaler,
            cat_cols,
            num_cols,
        })
    }

    /// 依訓練資料擬合編碼器與縮放器
    pub fn fit(rows: &[FeatureRow], cat_cols: &[&str], num_cols: &[&str]) -> Result<Self> {
        let mut cat_values: Vec<Vec<&str>> = vec![Vec::with_capacity(rows.len()); cat_cols.len()];
        let mut num_values: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); num_cols.len()];

        for row in rows {
            for (c, col) in cat_cols.iter().enumerate() {
                cat_values[c].push(category(row, col)?);
            }
            for (c, col) in num_cols.iter().enumerate() {
                num_values[c].push(numeric(row, col)?);
            }
        }

        Self::new(
            OneHotEncoder::fit(&cat_values),
            StandardScaler::fit(&num_values)?,
            cat_cols.iter().map(|c| c.to_string()).collect(),
            num_cols.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn cat_cols(&self) -> &[String] {
        &self.cat_cols
    }

    pub fn num_cols(&self) -> &[String] {
        &self.num_cols
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn n_features(&self) -> usize {
        self.num_cols.len() + self.encoder.n_outputs()
    }

    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let numeric_values = self
            .num_cols
            .iter()
            .map(|col| numeric(row, col))
            .collect::<Result<Vec<_>>>()?;
        let category_values = self
            .cat_cols
            .iter()
            .map(|col| category(row, col))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(self.n_features());
        self.scaler.transform_into(&numeric_values, &mut out)?;
        self.encoder.transform_into(&category_values, &mut out)?;
        Ok(out)
    }
}

fn numeric(row: &FeatureRow, col: &str) -> Result<f64> {
    match row.get(col) {
        Some(FeatureValue::Numeric(v)) => Ok(*v),
        Some(FeatureValue::Category(_)) => Err(PredictorError::PreprocessingError {
            message: format!("Column {} is expected to be numeric", col),
        }),
        None => Err(PredictorError::PreprocessingError {
            message: format!("Missing column: {}", col),
        }),
    }
}

fn category<'a>(row: &'a FeatureRow, col: &str) -> Result<&'a str> {
    match row.get(col) {
        Some(FeatureValue::Category(v)) => Ok(v.as_str()),
        Some(FeatureValue::Numeric(_)) => Err(PredictorError::PreprocessingError {
            message: format!("Column {} is expected to be categorical", col),
        }),
        None => Err(PredictorError::PreprocessingError {
            message: format!("Missing column: {}", col),
        }),
    }
}
