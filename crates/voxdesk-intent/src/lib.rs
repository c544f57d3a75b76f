//! Keyword intent classification and canned replies for the admissions desk.

pub mod catalog;
pub mod category;
pub mod classifier;

pub use catalog::{response_for, FALLBACK_RESPONSE};
pub use category::{Category, UnknownCategory};
pub use classifier::{ClassificationResult, IntentClassifier, CONFIDENCE_FLOOR};
