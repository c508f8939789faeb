//! Prompt domain
//!
//! Templates for every stage: panel, roundtable, tribunal phases and the
//! synthesizer pass.

mod template;

pub use template::{Prompt, PromptTemplate, SYNTHESIS_SYSTEM, SynthesisSource};
