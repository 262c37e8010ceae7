//! srtsift - Subtitle Transcript Analysis
//!
//! Cleans subtitle files down to plain prose, splits the prose into
//! model-sized chunks, sends each chunk to a hosted language model and
//! stores the combined answer as Markdown and JSON next to the input.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod subtitle;
pub mod chunk;
pub mod analyze;
pub mod assemble;
pub mod persist;
pub mod logging;
pub mod error;
