//! Text for Rice: line fitting plus two [`Font`](rice_core::Font) backends.
//!
//! - [`fit`] wraps a string greedily at spaces and line breaks, or cuts it
//!   to one ellipsized line.
//! - [`BlockFont`] draws every glyph as a solid block with a fixed advance.
//!   It needs no font file, so tests and tools get deterministic metrics.
//! - [`GlyphFont`] rasterizes a TrueType/OpenType face through `ab_glyph`.

pub mod block;
pub mod fit;
pub mod glyph;

pub use block::BlockFont;
pub use fit::{ELLIPSIS, ellipsize, fit, wrap};
pub use glyph::GlyphFont;
