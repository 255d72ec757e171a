//! Command-line workflow, independent of argument parsing

pub mod orchestration;

pub use orchestration::{calculate_with, run_calculation, CalculateArgs, CalculationOutcome};
