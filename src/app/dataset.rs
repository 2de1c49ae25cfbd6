use crate::domain::model::{Condition, HouseInput, HouseSample};
use crate::utils::error::{PredictorError, Result};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;
use std::io::Write;

pub use crate::domain::model::DEFAULT_SEED;

/// 價格公式以此年份計算屋齡
const REFERENCE_YEAR: i32 = 2023;

const BATHROOM_CHOICES: [f64; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

/// Neighborhood name and its price multiplier.
pub const NEIGHBORHOODS: [(&str, f64); 7] = [
    ("downtown", 1.3),
    ("midtown", 1.2),
    ("uptown", 1.1),
    ("suburbanNorth", 1.05),
    ("suburbanSouth", 0.95),
    ("suburbanEast", 1.0),
    ("suburbanWest", 1.1),
];

fn condition_multiplier(condition: Condition) -> f64 {
    match condition {
        Condition::Poor => 0.8,
        Condition::Fair => 0.9,
        Condition::Good => 1.0,
        Condition::Excellent => 1.2,
    }
}

pub fn generate_synthetic_data(n_samples: usize, seed: u64) -> Result<Vec<HouseSample>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(1.0, 0.1).map_err(|e| PredictorError::ModelError {
        message: format!("Noise distribution error: {e}"),
    })?;

    let mut samples = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let bedrooms: u32 = rng.gen_range(1..7);
        let bathrooms = *BATHROOM_CHOICES.choose(&mut rng).unwrap_or(&2.0);
        let square_feet = rng.gen_range(800..5000) as f64;
        let lot_size = rng.gen_range(0.1..2.0);
        let year_built: i32 = rng.gen_range(1950..REFERENCE_YEAR);
        let (neighborhood, neighborhood_mult) =
            *NEIGHBORHOODS.choose(&mut rng).unwrap_or(&NEIGHBORHOODS[0]);
        let condition = *Condition::ALL.choose(&mut rng).unwrap_or(&Condition::Good);
        let has_garage: bool = rng.gen();
        let has_pool: bool = rng.gen();

        let base_price = 200_000.0 + 150.0 * square_feet;
        let adjustments = 15_000.0 * (bedrooms as f64 - 3.0)
            + 20_000.0 * (bathrooms - 2.0)
            - 1_000.0 * (REFERENCE_YEAR - year_built) as f64
            + 50_000.0 * lot_size
            + if has_garage { 25_000.0 } else { 0.0 }
            + if has_pool { 40_000.0 } else { 0.0 };

        let price = (base_price + adjustments)
            * condition_multiplier(condition)
            * neighborhood_mult
            * noise.sample(&mut rng);

        samples.push(HouseSample {
            input: HouseInput {
                bedrooms,
                bathrooms,
                square_feet,
                lot_size,
                year_built,
                neighborhood: neighborhood.to_string(),
                condition,
                has_garage,
                has_pool,
            },
            price,
        });
    }

    Ok(samples)
}

#[derive(Serialize)]
struct DatasetRecord<'a> {
    bedrooms: u32,
    bathrooms: f64,
    square_feet: f64,
    lot_size: f64,
    year_built: i32,
    neighborhood: &'a str,
    condition: &'a str,
    has_garage: u8,
    has_pool: u8,
    price: f64,
}

/// 將樣本輸出為 CSV
pub fn write_csv<W: Write>(samples: &[HouseSample], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for sample in samples {
        let input = &sample.input;
        csv_writer.serialize(DatasetRecord {
            bedrooms: input.bedrooms,
            bathrooms: input.bathrooms,
            square_feet: input.square_feet,
            lot_size: input.lot_size,
            year_built: input.year_built,
            neighborhood: &input.neighborhood,
            condition: input.condition.as_str(),
            has_garage: input.has_garage as u8,
            has_pool: input.has_pool as u8,
            price: sample.price,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
