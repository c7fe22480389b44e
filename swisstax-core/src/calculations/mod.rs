//! Calculation stages, each a pure function of explicit inputs.
//!
//! A calculation flows deductions → progressive evaluation → composition
//! and wealth tax → assembly. [`crate::TaxEngine`] wires the stages to a
//! registry; they can also be driven directly.

pub mod assembler;
pub mod common;
pub mod composer;
pub mod deductions;
pub mod progressive;
pub mod wealth;

pub use assembler::assemble;
pub use composer::{Composition, CompositionInput, JurisdictionComposer};
pub use deductions::{AppliedDeduction, DeductionPipeline, DeductionResult};
pub use progressive::{Evaluation, evaluate, evaluate_exact, evaluate_split};
pub use wealth::{WealthTax, WealthTaxEvaluator};
