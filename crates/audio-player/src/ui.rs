use eframe::egui::{self, Color32, Mesh, Pos2, Rect, RichText, Sense};

use crate::playlist::{Playlist, Track};
use crate::theme::Palette;

/// HSL to RGB, with `h` as a fraction of a full turn
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color32 {
    let h = h.rem_euclid(1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color32::from_rgb(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Same as [`hsl_to_rgb`], hue in degrees (any value, wrapped)
pub fn hsl_deg(hue: f32, s: f32, l: f32) -> Color32 {
    hsl_to_rgb(hue / 360.0, s, l)
}

pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    Color32::from_rgba_premultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}

/// Append a rect whose colour runs linearly from `from` at the top-left corner to `to` at
/// the bottom-right one.
pub fn diagonal_gradient(mesh: &mut Mesh, rect: Rect, from: Color32, to: Color32) {
    let (w2, h2) = (rect.width().powi(2), rect.height().powi(2));
    let span = (w2 + h2).max(f32::EPSILON);
    let base = mesh.vertices.len() as u32;
    mesh.colored_vertex(rect.left_top(), from);
    mesh.colored_vertex(rect.right_top(), lerp_color(from, to, w2 / span));
    mesh.colored_vertex(rect.right_bottom(), to);
    mesh.colored_vertex(rect.left_bottom(), lerp_color(from, to, h2 / span));
    mesh.add_triangle(base, base + 1, base + 2);
    mesh.add_triangle(base, base + 2, base + 3);
}

/// Append a rect shaded from `top` to `bottom`
pub fn vertical_gradient(mesh: &mut Mesh, rect: Rect, top: Color32, bottom: Color32) {
    let base = mesh.vertices.len() as u32;
    mesh.colored_vertex(rect.left_top(), top);
    mesh.colored_vertex(rect.right_top(), top);
    mesh.colored_vertex(rect.right_bottom(), bottom);
    mesh.colored_vertex(rect.left_bottom(), bottom);
    mesh.add_triangle(base, base + 1, base + 2);
    mesh.add_triangle(base, base + 2, base + 3);
}

/// `m:ss`; unknown or negative times show as `0:00`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Icon for a playlist row
pub fn row_icon(is_current: bool, is_playing: bool) -> &'static str {
    match (is_current, is_playing) {
        (true, true) => "⏸",
        (true, false) => "▶",
        _ => "🎵",
    }
}

/// Draws the playlist and returns the track the user clicked, if any.
pub fn playlist_rows(
    ui: &mut egui::Ui,
    playlist: &Playlist,
    current_id: &str,
    is_playing: bool,
    palette: &Palette,
) -> Option<Track> {
    let mut selected = None;
    for track in playlist.tracks() {
        let is_current = track.id == current_id;
        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(egui::vec2(width, 44.0), Sense::click());

        let fill = if is_current {
            palette.active_row
        } else if response.hovered() {
            palette.hover_row
        } else {
            Color32::TRANSPARENT
        };
        ui.painter().rect_filled(rect, 8.0, fill);

        let painter = ui.painter();
        let icon_pos = Pos2::new(rect.left() + 18.0, rect.center().y);
        painter.text(
            icon_pos,
            egui::Align2::CENTER_CENTER,
            row_icon(is_current, is_playing),
            egui::FontId::proportional(16.0),
            palette.accent,
        );
        painter.text(
            Pos2::new(rect.left() + 40.0, rect.top() + 6.0),
            egui::Align2::LEFT_TOP,
            &track.title,
            egui::FontId::proportional(14.0),
            palette.text,
        );
        painter.text(
            Pos2::new(rect.left() + 40.0, rect.bottom() - 6.0),
            egui::Align2::LEFT_BOTTOM,
            &track.artist,
            egui::FontId::proportional(11.0),
            palette.muted_text,
        );
        painter.text(
            Pos2::new(rect.right() - 10.0, rect.center().y),
            egui::Align2::RIGHT_CENTER,
            format_time(track.duration),
            egui::FontId::monospace(12.0),
            palette.muted_text,
        );

        if response.clicked() {
            selected = Some(track.clone());
        }
    }
    if playlist.is_empty() {
        ui.label(RichText::new("Playlist is empty").color(palette.muted_text));
    }
    selected
}
