//! Full-surface radial spectrum drawn behind the player.

use std::f32::consts::TAU;

use eframe::egui::{self, Mesh, Painter, Pos2, Rect, Shape, Stroke};
use web_time::Instant;

use crate::analyzer::AnalyzerSnapshot;
use crate::config::HUE_STEP;
use crate::schedule::PeriodicTask;
use crate::ui::{diagonal_gradient, hsl_deg};

const RING_SCALE: f32 = 0.8;
const INNER_SCALE: f32 = 0.5;

/// One radial bar: start on the inner circle, end further out along the same angle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialBar {
    pub index: usize,
    pub start: Pos2,
    pub end: Pos2,
}

/// Bars for every bin of `snapshot`, evenly spread around `rect`'s centre.
///
/// The inner radius is half of `min(cx, cy)`; a full-scale bin reaches twice that.
pub fn radial_bars(rect: Rect, snapshot: &AnalyzerSnapshot) -> Vec<RadialBar> {
    let center = rect.center();
    let radius = rect.width().min(rect.height()) / 2.0 * INNER_SCALE;
    let n = snapshot.len().max(1) as f32;
    (0..snapshot.len())
        .map(|i| {
            let angle = i as f32 * TAU / n;
            let dir = egui::vec2(angle.cos(), angle.sin());
            let length = snapshot.level(i) * radius;
            RadialBar {
                index: i,
                start: center + dir * radius,
                end: center + dir * (radius + length),
            }
        })
        .collect()
}

pub struct ShaderVisualizer {
    hue: f32,
    frames: PeriodicTask,
}

impl Default for ShaderVisualizer {
    fn default() -> Self {
        let mut frames = PeriodicTask::every_frame("visualizer");
        frames.arm();
        Self { hue: 0.0, frames }
    }
}

impl ShaderVisualizer {
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Hue only moves while audio is playing
    pub fn advance(&mut self, is_playing: bool) {
        if is_playing {
            self.hue = (self.hue + HUE_STEP) % 360.0;
        }
    }

    /// Draw the current frame, then step the hue if the loop fired.
    pub fn paint(
        &mut self,
        painter: &Painter,
        rect: Rect,
        snapshot: &AnalyzerSnapshot,
        is_playing: bool,
        now: Instant,
    ) {
        if !self.frames.is_armed() {
            return;
        }
        painter.extend(self.shapes(rect, snapshot));
        if self.frames.poll(now) {
            self.advance(is_playing);
        }
    }

    pub fn shapes(&self, rect: Rect, snapshot: &AnalyzerSnapshot) -> Vec<Shape> {
        let hue = self.hue;
        let mut background = Mesh::default();
        diagonal_gradient(
            &mut background,
            rect,
            hsl_deg(hue, 0.8, 0.15),
            hsl_deg(hue + 60.0, 0.8, 0.25),
        );

        let mut shapes = Vec::with_capacity(snapshot.len() + 2);
        shapes.push(Shape::mesh(background));
        shapes.push(Shape::circle_stroke(
            rect.center(),
            rect.width().min(rect.height()) / 2.0 * RING_SCALE,
            Stroke::new(2.0, hsl_deg(hue + 120.0, 0.8, 0.6)),
        ));
        shapes.extend(radial_bars(rect, snapshot).into_iter().map(|bar| {
            Shape::line_segment(
                [bar.start, bar.end],
                Stroke::new(3.0, hsl_deg(hue + bar.index as f32, 0.8, 0.6)),
            )
        }));
        shapes
    }

    pub fn schedule(&self, ctx: &egui::Context, now: Instant) {
        self.frames.schedule(ctx, now);
    }

    pub fn cancel(&mut self) {
        self.frames.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(size, size))
    }

    #[test]
    fn hue_advances_only_while_playing() {
        let mut v = ShaderVisualizer::default();
        v.advance(false);
        assert_eq!(v.hue(), 0.0);
        v.advance(true);
        v.advance(true);
        assert!((v.hue() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hue_wraps_at_full_turn() {
        let mut v = ShaderVisualizer::default();
        for _ in 0..720 {
            v.advance(true);
        }
        assert!(v.hue().abs() < 1e-3);
        v.advance(true);
        assert!((v.hue() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn bars_start_on_inner_circle() {
        let rect = square(400.0);
        let snapshot = AnalyzerSnapshot::flat(4);
        let bars = radial_bars(rect, &snapshot);
        assert_eq!(bars.len(), 4);
        let center = rect.center();
        for bar in &bars {
            assert!((bar.start.distance(center) - 100.0).abs() < 1e-3);
        }
        // bin 0 points along +x; 128/255 of the inner radius long
        assert!((bars[0].end.x - (300.0 + 100.0 * 128.0 / 255.0)).abs() < 1e-3);
        assert!((bars[0].end.y - 200.0).abs() < 1e-3);
        // bin 1 of 4 is a quarter turn
        assert!((bars[1].start.x - 200.0).abs() < 1e-3);
        assert!((bars[1].start.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn empty_snapshot_draws_no_bars() {
        let v = ShaderVisualizer::default();
        let snapshot = AnalyzerSnapshot::flat(0);
        assert!(radial_bars(square(100.0), &snapshot).is_empty());
        // background and ring remain
        assert_eq!(v.shapes(square(100.0), &snapshot).len(), 2);
    }

    #[test]
    fn one_shape_per_bin_plus_backdrop() {
        let v = ShaderVisualizer::default();
        let snapshot = AnalyzerSnapshot::flat(128);
        assert_eq!(v.shapes(square(300.0), &snapshot).len(), 130);
    }

    #[test]
    fn cancelled_visualizer_stops() {
        let mut v = ShaderVisualizer::default();
        assert!(v.is_running());
        v.cancel();
        assert!(!v.is_running());
    }
}
