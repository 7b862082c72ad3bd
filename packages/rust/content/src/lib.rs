//! Article content handling: output normalization and quality checks.
//!
//! [`normalize`] turns whatever the text model returned into an HTML fragment
//! fit for a post body; [`analyze`] reports length and structure so the
//! pipeline and the CLI can judge an article before it goes live.

mod normalize;
mod quality;

pub use normalize::{is_full_document, normalize};
pub use quality::{
    AI_DISCLOSURE_PHRASES, MIN_SECTIONS, QualityReport, analyze, count_words,
};
