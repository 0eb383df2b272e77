//! Decode SpriteStudio's binary animation format (SSBP) and composite its frames.

#![warn(
    missing_docs,
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

pub mod de;
pub mod render;
pub mod state;

#[cfg(test)]
mod testing;
