pub mod artifact;
pub mod confidence;
pub mod forest;
pub mod prediction;
pub mod preprocess;
pub mod trend;
pub mod validator;

pub use crate::domain::model::{HouseInput, PredictionResult};
pub use crate::domain::ports::{ConfigProvider, ModelProvider, Regressor, Storage};
pub use crate::utils::error::Result;
