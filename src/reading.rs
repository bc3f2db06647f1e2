mod model;
mod sort;
mod timestamp_field;

pub use model::*;
pub use sort::*;
pub use timestamp_field::*;
