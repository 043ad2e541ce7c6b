use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub year_font_family: String,
    pub year_font_size: f32,
    pub year_text_color: String,
    pub band_color: String,
    pub band_alt_color: String,
    pub axis_color: String,
    pub tick_color: String,
    pub hover_fill: String,
    pub hover_border: String,
    pub background: String,
}

impl Theme {
    /// Garamond on alternating light cyan and white bands.
    pub fn classic() -> Self {
        Self {
            font_family: "Garamond, \"EB Garamond\", Georgia, serif".to_string(),
            year_font_family: "Garamond, \"EB Garamond\", Georgia, serif".to_string(),
            year_font_size: 24.0,
            year_text_color: "#000000".to_string(),
            band_color: "#E0FFFF".to_string(),
            band_alt_color: "#FFFFFF".to_string(),
            axis_color: "#333333".to_string(),
            tick_color: "#555555".to_string(),
            hover_fill: "#FFF8DC".to_string(),
            hover_border: "#B8860B".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            year_font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            year_font_size: 20.0,
            year_text_color: "#1C2430".to_string(),
            band_color: "#F1F5FB".to_string(),
            band_alt_color: "#FFFFFF".to_string(),
            axis_color: "#7A8AA6".to_string(),
            tick_color: "#7A8AA6".to_string(),
            hover_fill: "#EEF2F8".to_string(),
            hover_border: "#C7D2E5".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}
