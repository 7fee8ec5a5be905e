//! Fixed style sheet: one font family, a small palette and per-role sizes.

/// RGB color (8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase `RRGGBB` without a leading `#`, as OOXML expects.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0`, as PDF colour operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// A palette slot. Content refers to tones, never to raw colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum Tone {
    Primary,
    Secondary,
    Accent,
    Text,
}

/// Three-colour palette plus body text and a light background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub background: Color,
}

impl Palette {
    pub fn color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Primary => self.primary,
            Tone::Secondary => self.secondary,
            Tone::Accent => self.accent,
            Tone::Text => self.text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::rgb(0x00, 0x33, 0x66),
            secondary: Color::rgb(0x46, 0x82, 0xB4),
            accent: Color::rgb(0xFF, 0x8C, 0x00),
            text: Color::rgb(0x33, 0x33, 0x33),
            background: Color::rgb(0xF5, 0xF5, 0xFA),
        }
    }
}

/// Typography for one paragraph role, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub tone: Tone,
    pub bold: bool,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
}

impl TextStyle {
    const fn new(size: f32, tone: Tone) -> Self {
        Self {
            size,
            tone,
            bold: false,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    const fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    const fn indent(mut self, left: f32) -> Self {
        self.left_indent = left;
        self
    }

    /// Baseline-to-baseline distance.
    pub fn leading(&self) -> f32 {
        self.size * 1.2
    }
}

/// The style sheet applied uniformly by every renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    /// Font family name written into DOCX and PPTX runs.
    pub font_family: String,
    pub palette: Palette,
    pub title: TextStyle,
    pub heading1: TextStyle,
    pub heading2: TextStyle,
    pub body: TextStyle,
    pub subtitle: TextStyle,
    pub bullet: TextStyle,
    /// Extra indent per nesting level beyond the first.
    pub bullet_step: f32,
}

impl StyleSheet {
    pub fn color(&self, tone: Tone) -> Color {
        self.palette.color(tone)
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            font_family: "맑은 고딕".to_string(),
            palette: Palette::default(),
            title: TextStyle::new(28.0, Tone::Primary).bold().spacing(0.0, 30.0),
            heading1: TextStyle::new(20.0, Tone::Primary)
                .bold()
                .spacing(20.0, 12.0),
            heading2: TextStyle::new(16.0, Tone::Secondary)
                .bold()
                .spacing(15.0, 10.0),
            body: TextStyle::new(11.0, Tone::Text).spacing(0.0, 12.0),
            subtitle: TextStyle::new(14.0, Tone::Secondary).spacing(0.0, 20.0),
            bullet: TextStyle::new(11.0, Tone::Text)
                .spacing(0.0, 6.0)
                .indent(20.0),
            bullet_step: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_hex() {
        assert_eq!(Color::BLACK.to_hex(), "000000");
        assert_eq!(Color::WHITE.to_hex(), "FFFFFF");
        assert_eq!(Color::rgb(0x46, 0x82, 0xB4).to_hex(), "4682B4");
    }

    #[test]
    fn test_color_to_unit() {
        assert_eq!(Color::WHITE.to_unit(), [1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.to_unit(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_palette_tones() {
        let palette = Palette::default();
        assert_eq!(palette.color(Tone::Primary).to_hex(), "003366");
        assert_eq!(palette.color(Tone::Secondary).to_hex(), "4682B4");
        assert_eq!(palette.color(Tone::Accent).to_hex(), "FF8C00");
        assert_eq!(palette.color(Tone::Text).to_hex(), "333333");
    }

    #[test]
    fn test_default_sheet_sizes() {
        let sheet = StyleSheet::default();
        assert_eq!(sheet.title.size, 28.0);
        assert!(sheet.heading1.bold);
        assert_eq!(sheet.bullet.left_indent, 20.0);
        assert!((sheet.body.leading() - 13.2).abs() < 1e-4);
    }
}
