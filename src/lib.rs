pub mod api;
pub mod reading;
pub mod session;
pub mod viewer;
