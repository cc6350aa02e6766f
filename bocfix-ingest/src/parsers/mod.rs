//! Bank-specific description parsers.

pub mod boc;
