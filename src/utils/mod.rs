pub mod maths_utils;

pub use maths_utils::{ewma, mean, mean_and_stddev};
