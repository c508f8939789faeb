//! Synthesis domain
//!
//! Combining several model outputs into one answer while keeping track of
//! where the models agree and where they do not.

pub mod claims;
pub mod parsing;
pub mod value_objects;

pub use claims::{ClaimReport, classify_claims};
pub use parsing::{ParsedSynthesis, parse_synthesis_response};
pub use value_objects::{
    AgreementSummary, ClaimPosition, ClaimVerdict, ClassifiedClaim, Confidence, ConfidenceLevel,
    Contribution, Disagreement, SynthesisResult,
};
