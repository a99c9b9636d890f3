//! Query-graph to English translation.

mod clause_builder;
mod errors;
mod mrp;

pub use clause_builder::{ClauseBuilder, NodeRef};
pub use errors::TranslateError;
pub use mrp::{translate, translate_from_subject, MrpTranslator};
