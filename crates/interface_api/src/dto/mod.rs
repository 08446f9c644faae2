//! Request and response bodies

pub mod consent;
pub mod listing;
pub mod review;
