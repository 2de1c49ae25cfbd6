use crate::domain::model::{HouseInput, PriceRange};

pub const PRICE_FLOOR: f64 = 10_000.0;
pub const PRICE_CEILING: f64 = 10_000_000.0;

pub const BASE_CONFIDENCE: i32 = 90;
pub const MIN_CONFIDENCE: i32 = 60;
pub const MAX_CONFIDENCE: i32 = 95;

pub fn price_is_sane(price: f64) -> bool {
    price.is_finite() && (PRICE_FLOOR..=PRICE_CEILING).contains(&price)
}

/// 依輸入與預測價格計算信心分數，結果落在 [60, 95]
pub fn confidence_score(input: &HouseInput, price: f64) -> u8 {
    let mut confidence = BASE_CONFIDENCE;

    if input.square_feet < 100.0 || input.square_feet > 10_000.0 {
        confidence -= 5;
    }
    if input.year_built < 1900 {
        confidence -= 5;
    }
    if !price_is_sane(price) {
        confidence -= 10;
    }

    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
}

/// Margin as a fraction of the price: 5% plus up to 5% more as confidence drops.
pub fn range_margin(confidence: u8) -> f64 {
    0.05 + (1.0 - confidence as f64 / 100.0) * 0.05
}

pub fn price_range(price: f64, confidence: u8) -> PriceRange {
    let margin = range_margin(confidence);
    PriceRange {
        lower: (price * (1.0 - margin)).round() as i64,
        upper: (price * (1.0 + margin)).round() as i64,
    }
}
