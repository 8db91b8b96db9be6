//! Core types for md2pdf: options, errors, plugin traits, the conversion
//! pipeline and the line classifier shared by the output engines.

pub mod classify;
pub mod document;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod plugin;
