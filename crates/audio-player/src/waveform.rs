//! Decorative waveform bars that double as the seek control.
//!
//! Bar heights are random and fixed for the lifetime of the surface; only the played/unplayed
//! colouring tracks playback progress.

use std::time::Duration;

use eframe::egui::{self, Color32, Mesh, Rect, Sense, Shape, Stroke};
use rand::Rng;
use web_time::Instant;

use crate::config::{WAVEFORM_BARS, WAVEFORM_REDRAW_MS};
use crate::player::progress_fraction;
use crate::schedule::PeriodicTask;
use crate::ui::vertical_gradient;

const HEIGHT: f32 = 96.0;
const BAR_GAP: f32 = 2.0;

const PLAYED_TOP: Color32 = Color32::from_rgb(76, 29, 149); // purple-900
const PLAYED_BOTTOM: Color32 = Color32::from_rgb(139, 92, 246); // purple-500
const UNPLAYED_TOP: Color32 = Color32::from_rgb(71, 85, 105); // slate-600
const UNPLAYED_BOTTOM: Color32 = Color32::from_rgb(148, 163, 184); // slate-400

/// Inputs that change what the surface looks like
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveformKey {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
}

impl WaveformKey {
    pub fn progress(&self) -> f64 {
        progress_fraction(self.current_time, self.duration)
    }
}

struct Cached {
    key: WaveformKey,
    rect: Rect,
    shapes: Vec<Shape>,
}

pub struct WaveformSurface {
    amplitudes: Vec<f32>,
    redraw: PeriodicTask,
    cache: Option<Cached>,
}

impl Default for WaveformSurface {
    fn default() -> Self {
        Self::with_rng(&mut rand::rng())
    }
}

impl WaveformSurface {
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let amplitudes = (0..WAVEFORM_BARS)
            .map(|_| rng.random_range(0.2..=1.0))
            .collect();
        Self {
            amplitudes,
            redraw: PeriodicTask::every(
                "waveform",
                Duration::from_millis(WAVEFORM_REDRAW_MS),
            ),
            cache: None,
        }
    }

    pub fn amplitudes(&self) -> &[f32] {
        &self.amplitudes
    }

    /// Bar `index` counts as played when its leading edge is behind `progress`
    pub fn is_played(&self, index: usize, progress: f64) -> bool {
        (index as f64 / self.amplitudes.len().max(1) as f64) < progress
    }

    /// Decide whether the cached frame is stale.
    ///
    /// While playing, the surface repaints on the redraw period. While paused it repaints only
    /// when the playback inputs or the layout change.
    pub fn needs_redraw(&mut self, rect: Rect, key: WaveformKey, now: Instant) -> bool {
        self.redraw.arm_while(key.is_playing);
        let tick = self.redraw.poll(now);
        match &self.cache {
            None => true,
            Some(c) if c.rect != rect => true,
            Some(_) if key.is_playing => tick,
            Some(c) => c.key != key,
        }
    }

    pub fn shapes(&self, rect: Rect, key: WaveformKey) -> Vec<Shape> {
        let progress = key.progress();
        let slot = rect.width() / self.amplitudes.len().max(1) as f32;
        let bar_width = (slot - BAR_GAP).max(1.0);

        let mut mesh = Mesh::default();
        for (i, &amp) in self.amplitudes.iter().enumerate() {
            let bar_height = amp * rect.height() * 0.8;
            let x = rect.left() + i as f32 * slot;
            let y = rect.center().y - bar_height / 2.0;
            let bar = Rect::from_min_size(egui::pos2(x, y), egui::vec2(bar_width, bar_height));
            let (top, bottom) = if self.is_played(i, progress) {
                (PLAYED_TOP, PLAYED_BOTTOM)
            } else {
                (UNPLAYED_TOP, UNPLAYED_BOTTOM)
            };
            vertical_gradient(&mut mesh, bar, top, bottom);
        }

        let thumb = egui::pos2(
            rect.left() + rect.width() * progress as f32,
            rect.center().y,
        );
        vec![
            Shape::mesh(mesh),
            Shape::circle_filled(thumb, 6.0, Color32::WHITE),
            Shape::circle_stroke(thumb, 6.0, Stroke::new(2.0, PLAYED_BOTTOM)),
        ]
    }

    /// Draw the surface; returns a seek target in seconds when the user clicked or dragged.
    pub fn show(&mut self, ui: &mut egui::Ui, key: WaveformKey, now: Instant) -> Option<f64> {
        let size = egui::vec2(ui.available_width(), HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        if self.needs_redraw(rect, key, now) {
            self.cache = Some(Cached {
                key,
                rect,
                shapes: self.shapes(rect, key),
            });
        }
        if let Some(cached) = &self.cache {
            ui.painter().extend(cached.shapes.iter().cloned());
        }

        if response.clicked() || response.dragged() {
            let x = response.interact_pointer_pos()?.x;
            let percent = f64::from(((x - rect.left()) / rect.width()).clamp(0.0, 1.0)) * 100.0;
            return Some(seek_target(percent, key.duration));
        }
        None
    }

    pub fn schedule(&self, ctx: &egui::Context, now: Instant) {
        self.redraw.schedule(ctx, now);
    }

    pub fn cancel(&mut self) {
        self.redraw.cancel();
    }
}

/// Seconds for a slider position in percent (0-100)
pub fn seek_target(percent: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    percent.clamp(0.0, 100.0) / 100.0 * duration
}
