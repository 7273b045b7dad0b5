//! Work report engine: correlates a contributor's tracker tasks with their git
//! commits over a date range, estimates effort, classifies business impact and
//! aggregates the result for text, Markdown and JSON renderers.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod error;
pub mod estimate;
pub mod ext;
pub mod gitio;
pub mod identifiers;
pub mod model;
pub mod narrative;
pub mod pipeline;
pub mod render;
pub mod sources;
pub mod util;
pub mod window;
