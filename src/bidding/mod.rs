pub mod commands;
pub mod evaluation;
pub mod model;
