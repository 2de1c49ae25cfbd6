// Model provisioning: synthetic data, training and bundle loading.

pub mod dataset;
pub mod provider;
pub mod trainer;
