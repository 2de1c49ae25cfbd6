use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 房屋狀況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Poor,
        Condition::Fair,
        Condition::Good,
        Condition::Excellent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Poor => "poor",
            Condition::Fair => "fair",
            Condition::Good => "good",
            Condition::Excellent => "excellent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已驗證的房屋輸入，只存活於單一請求內
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseInput {
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: f64,
    pub lot_size: f64,
    pub year_built: i32,
    pub neighborhood: String,
    pub condition: Condition,
    pub has_garage: bool,
    pub has_pool: bool,
}

impl HouseInput {
    /// 轉成以訓練欄位名稱為鍵的特徵列
    pub fn feature_row(&self) -> FeatureRow {
        let mut row = FeatureRow::new();
        row.insert("bedrooms", FeatureValue::Numeric(self.bedrooms as f64));
        row.insert("bathrooms", FeatureValue::Numeric(self.bathrooms));
        row.insert("square_feet", FeatureValue::Numeric(self.square_feet));
        row.insert("lot_size", FeatureValue::Numeric(self.lot_size));
        row.insert("year_built", FeatureValue::Numeric(self.year_built as f64));
        row.insert("neighborhood", FeatureValue::Category(self.neighborhood.clone()));
        row.insert(
            "condition",
            FeatureValue::Category(self.condition.as_str().to_string()),
        );
        row.insert("has_garage", FeatureValue::Numeric(bool_flag(self.has_garage)));
        row.insert("has_pool", FeatureValue::Numeric(bool_flag(self.has_pool)));
        row
    }
}

fn bool_flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Category(String),
}

/// Column name → raw value, before encoding and scaling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    columns: HashMap<String, FeatureValue>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, value: FeatureValue) {
        self.columns.insert(column.to_string(), value);
    }

    pub fn remove(&mut self, column: &str) -> Option<FeatureValue> {
        self.columns.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns.get(column)
    }
}

/// 一筆訓練樣本
#[derive(Debug, Clone, PartialEq)]
pub struct HouseSample {
    pub input: HouseInput,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lower: i64,
    pub upper: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_price: i64,
    pub confidence: u8,
    pub price_range: PriceRange,
    pub price_per_sq_ft: i64,
    pub trend_data: Vec<TrendPoint>,
}

/// `POST /predict` 成功回應
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub status: String,
    pub prediction: PredictionResult,
    pub input_summary: HouseInput,
}

impl PredictionResponse {
    pub fn success(prediction: PredictionResult, input_summary: HouseInput) -> Self {
        Self {
            status: "success".to_string(),
            prediction,
            input_summary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// 合成資料、資料切分與 bootstrap 的預設種子
pub const DEFAULT_SEED: u64 = 42;

/// Hyper-parameters of the forest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    pub n_samples: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub forest: ForestParams,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            n_samples: 2000,
            seed: DEFAULT_SEED,
            test_fraction: 0.2,
            forest: ForestParams::default(),
        }
    }
}

/// 訓練結果摘要，隨模型一併保存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_train: usize,
    pub n_test: usize,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    pub trained_at: DateTime<Utc>,
}
