//! Shared helpers: HTML text handling and byte decoding.

pub mod encoding;
pub mod html;
