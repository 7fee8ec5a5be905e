//! Content model shared by every renderer.
//!
//! This module contains:
//! - The content tree (sections, blocks, runs)
//! - The fixed style sheet and palette
//! - The portfolio content itself

mod content;
mod portfolio;
mod style;

pub use content::{
    Align, Block, ContentTree, Marker, Paragraph, ParagraphRole, Run, Section, SectionLayout,
};
pub use portfolio::portfolio;
pub use style::{Color, Palette, StyleSheet, TextStyle, Tone};
