pub mod batch;
pub mod model;
pub mod score;
