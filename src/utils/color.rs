use eframe::egui::Color32;

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Colors used by the upload window
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: Color32,
    pub error: Color32,
    pub success: Color32,
    pub copied: Color32,
    pub drop_hover: Color32,
    pub muted: Color32,
}

impl Palette {
    pub fn dark() -> Self {
        let hex = |s: &str| Color32::from_hex(s).unwrap_or(Color32::GRAY);
        Self {
            accent: hex("#a159e1"),
            error: hex("#f87171"),
            success: hex("#4ade80"),
            copied: hex("#166534"),
            drop_hover: hex("#161616"),
            muted: hex("#9ca3af"),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
