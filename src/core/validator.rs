use crate::domain::model::{Condition, HouseInput};
use crate::utils::error::{PredictorError, Result};
use serde_json::{Map, Value};

pub const REQUIRED_FIELDS: [&str; 9] = [
    "bedrooms",
    "bathrooms",
    "squareFeet",
    "lotSize",
    "yearBuilt",
    "neighborhood",
    "condition",
    "hasGarage",
    "hasPool",
];

pub const BEDROOMS_RANGE: (f64, f64) = (1.0, 10.0);
pub const BATHROOMS_RANGE: (f64, f64) = (1.0, 10.0);
pub const SQUARE_FEET_RANGE: (f64, f64) = (500.0, 10_000.0);
pub const LOT_SIZE_RANGE: (f64, f64) = (0.1, 5.0);
pub const YEAR_BUILT_RANGE: (f64, f64) = (1900.0, 2024.0);

/// 解析請求主體，必須是 JSON 物件
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(PredictorError::MalformedRequestError {
            message: "Request body must be a JSON object".to_string(),
        }),
        Err(e) => Err(PredictorError::MalformedRequestError {
            message: format!("Request body is not valid JSON: {}", e),
        }),
    }
}

pub fn validate_input(data: &Map<String, Value>) -> Result<HouseInput> {
    // 先確認所有必填欄位都存在，錯誤訊息指出第一個缺少的欄位
    for field in REQUIRED_FIELDS {
        match data.get(field) {
            None | Some(Value::Null) => {
                return Err(PredictorError::MissingFieldError {
                    field: field.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    let bedrooms = bounded_integer(data, "bedrooms", BEDROOMS_RANGE)?;
    let bathrooms = bounded_number(data, "bathrooms", BATHROOMS_RANGE)?;
    let square_feet = bounded_number(data, "squareFeet", SQUARE_FEET_RANGE)?;
    let lot_size = bounded_number(data, "lotSize", LOT_SIZE_RANGE)?;
    let year_built = bounded_integer(data, "yearBuilt", YEAR_BUILT_RANGE)?;

    let neighborhood = match &data["neighborhood"] {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        other => return Err(invalid("neighborhood", other, "Must be a non-empty string")),
    };

    let condition = match &data["condition"] {
        Value::String(s) => Condition::parse(s).ok_or_else(|| {
            invalid(
                "condition",
                &data["condition"],
                "Must be one of: poor, fair, good, excellent",
            )
        })?,
        other => return Err(invalid("condition", other, "Must be a string")),
    };

    let has_garage = boolean(data, "hasGarage")?;
    let has_pool = boolean(data, "hasPool")?;

    Ok(HouseInput {
        bedrooms: bedrooms as u32,
        bathrooms,
        square_feet,
        lot_size,
        year_built: year_built as i32,
        neighborhood,
        condition,
        has_garage,
        has_pool,
    })
}

fn invalid(field: &str, value: &Value, reason: &str) -> PredictorError {
    PredictorError::InvalidInputError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn bounded_number(data: &Map<String, Value>, field: &str, (min, max): (f64, f64)) -> Result<f64> {
    let value = &data[field];
    let number = value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| invalid(field, value, "Must be a number"))?;

    if number < min || number > max {
        return Err(invalid(
            field,
            value,
            &format!("Must be between {} and {}", min, max),
        ));
    }
    Ok(number)
}

fn bounded_integer(data: &Map<String, Value>, field: &str, range: (f64, f64)) -> Result<i64> {
    let number = bounded_number(data, field, range)?;
    if number.fract() != 0.0 {
        return Err(invalid(field, &data[field], "Must be a whole number"));
    }
    Ok(number as i64)
}

fn boolean(data: &Map<String, Value>, field: &str) -> Result<bool> {
    data[field]
        .as_bool()
        .ok_or_else(|| invalid(field, &data[field], "Must be a boolean"))
}
