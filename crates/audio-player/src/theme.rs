use eframe::egui::{Color32, Stroke};
use serde::{Deserialize, Serialize};

// Presentation only: playback logic never looks at the theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Neomorphic,
    Glassmorphic,
}

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub container_fill: Color32,
    pub panel_fill: Color32,
    pub panel_stroke: Stroke,
    pub active_row: Color32,
    pub hover_row: Color32,
    pub accent: Color32,
    pub text: Color32,
    pub muted_text: Color32,
    pub error_text: Color32,
    pub error_fill: Color32,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Neomorphic => Theme::Glassmorphic,
            Theme::Glassmorphic => Theme::Neomorphic,
        }
    }

    pub fn palette(self) -> Palette {
        let common = Palette {
            container_fill: Color32::from_rgb(30, 41, 59), // slate-800
            panel_fill: Color32::from_white_alpha(26),
            panel_stroke: Stroke::NONE,
            active_row: Color32::from_white_alpha(51),
            hover_row: Color32::from_white_alpha(26),
            accent: Color32::from_rgb(139, 92, 246), // purple-500
            text: Color32::WHITE,
            muted_text: Color32::from_rgb(209, 213, 219), // gray-300
            error_text: Color32::from_rgb(248, 113, 113), // red-400
            error_fill: Color32::from_rgba_unmultiplied(127, 29, 29, 51),
        };
        match self {
            Theme::Neomorphic => common,
            Theme::Glassmorphic => Palette {
                container_fill: Color32::from_rgba_unmultiplied(15, 23, 42, 128), // slate-900 / 50%
                panel_stroke: Stroke::new(1.0, Color32::from_white_alpha(51)),
                active_row: Color32::from_white_alpha(51),
                accent: Color32::from_rgba_unmultiplied(168, 85, 247, 179),
                ..common
            },
        }
    }

    /// Label for the toggle button: the sun shows on the default theme
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Neomorphic => "☀",
            Theme::Glassmorphic => "☾",
        }
    }
}
