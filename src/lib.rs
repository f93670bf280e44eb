pub mod adherence;
pub mod cli;
pub mod config;
pub mod error;
pub mod food_index;
pub mod macro_aggregator;
pub mod models;
pub mod providers;
pub mod quantity;
pub mod restriction_evaluator;
pub mod substitution;
