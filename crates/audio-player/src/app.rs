use eframe::egui::{self, Align, Color32, Layout, RichText};
use web_time::Instant;

use crate::media::MediaBinding;
use crate::playlist::Playlist;
use crate::player::Player;
use crate::schedule::PeriodicTask;
use crate::theme::{Palette, Theme};
use crate::ui::{format_time, playlist_rows};
use crate::visualizer::ShaderVisualizer;
use crate::waveform::{WaveformKey, WaveformSurface};

/// Text-entry dialog for importing a playlist as JSON
#[derive(Default)]
pub struct ImportDialog {
    pub open: bool,
    pub text: String,
    pub error: Option<String>,
}

impl ImportDialog {
    pub fn load_example(&mut self) {
        self.text = Playlist::example_json();
        self.error = None;
    }

    /// Run the import; on success the dialog closes and forgets its input
    pub fn submit<B: MediaBinding>(&mut self, player: &mut Player<B>) -> bool {
        match player.import_playlist_json(&self.text) {
            Ok(()) => {
                self.open = false;
                self.text.clear();
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

pub struct AudioPlayerApp<B: MediaBinding> {
    player: Player<B>,
    theme: Theme,
    visualizer: ShaderVisualizer,
    waveform: WaveformSurface,
    analyser_loop: PeriodicTask,
    import: ImportDialog,
}

impl<B: MediaBinding> AudioPlayerApp<B> {
    pub fn new(cc: &eframe::CreationContext<'_>, player: Player<B>, theme: Theme) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self::with_player(player, theme)
    }

    pub fn with_player(player: Player<B>, theme: Theme) -> Self {
        Self {
            player,
            theme,
            visualizer: ShaderVisualizer::default(),
            waveform: WaveformSurface::default(),
            analyser_loop: PeriodicTask::every_frame("analyser"),
            import: ImportDialog::default(),
        }
    }

    pub fn player(&self) -> &Player<B> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player<B> {
        &mut self.player
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
    }

    /// Per-frame bookkeeping that does not draw: apply media events and run the analyser loop.
    pub fn tick(&mut self, now: Instant) {
        self.player.pump_events();
        self.analyser_loop.arm_while(self.player.state().is_playing);
        if self.analyser_loop.poll(now) {
            self.player.refresh_analyzer();
        }
    }

    /// Cancel every redraw loop. The binding releases its listeners when the app is dropped.
    pub fn teardown(&mut self) {
        self.visualizer.cancel();
        self.waveform.cancel();
        self.analyser_loop.cancel();
    }

    fn header(&mut self, ui: &mut egui::Ui, palette: &Palette) {
        ui.horizontal(|ui| {
            if ui
                .button(RichText::new("📥").size(18.0))
                .on_hover_text("Import playlist")
                .clicked()
            {
                self.import.open = true;
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui
                    .button(RichText::new(self.theme.toggle_icon()).size(18.0))
                    .on_hover_text("Toggle theme")
                    .clicked()
                {
                    self.toggle_theme();
                }
            });
        });

        let state = self.player.state();
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new(&state.current_track.title).strong().color(palette.text));
            ui.label(RichText::new(&state.current_track.artist).color(palette.muted_text));
            if let Some(error) = &state.audio_error {
                egui::Frame::new()
                    .fill(palette.error_fill)
                    .corner_radius(6.0)
                    .inner_margin(6.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(error).color(palette.error_text));
                    });
            }
        });
    }

    fn transport(&mut self, ui: &mut egui::Ui, palette: &Palette, now: Instant) {
        let state = self.player.state();
        let key = WaveformKey {
            current_time: state.current_time,
            duration: state.duration,
            is_playing: state.is_playing,
        };
        if let Some(target) = self.waveform.show(ui, key, now) {
            self.player.seek(target);
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button(RichText::new("⏮").size(20.0)).clicked() {
                self.player.previous();
            }
            let icon = if self.player.state().is_playing { "⏸" } else { "▶" };
            if ui
                .button(RichText::new(icon).size(24.0).color(palette.accent))
                .clicked()
            {
                self.player.play_pause();
            }
            if ui.button(RichText::new("⏭").size(20.0)).clicked() {
                self.player.next();
            }

            let state = self.player.state();
            ui.label(
                RichText::new(format!(
                    "{} / {}",
                    format_time(state.current_time),
                    format_time(state.duration)
                ))
                .monospace()
                .color(palette.muted_text),
            );

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let mut volume = self.player.state().volume;
                if ui
                    .add(egui::Slider::new(&mut volume, 0..=100).show_value(false))
                    .changed()
                {
                    self.player.set_volume(volume);
                }
                let mute_icon = if self.player.state().is_muted { "🔇" } else { "🔊" };
                if ui.button(mute_icon).clicked() {
                    self.player.toggle_mute();
                }
            });
        });
    }

    fn playlist(&mut self, ui: &mut egui::Ui, palette: &Palette) {
        ui.label(RichText::new("Playlist").strong().color(palette.text));
        ui.add_space(4.0);
        let state = self.player.state();
        let picked = egui::ScrollArea::vertical()
            .max_height(260.0)
            .show(ui, |ui| {
                playlist_rows(
                    ui,
                    self.player.playlist(),
                    &state.current_track.id,
                    state.is_playing,
                    palette,
                )
            })
            .inner;
        if let Some(track) = picked {
            self.player.select_track(&track);
        }
    }

    fn import_window(&mut self, ctx: &egui::Context) {
        let mut open = self.import.open;
        let mut imported = false;
        egui::Window::new("Import Playlist")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.label("Paste a JSON array of tracks.");
                ui.add(
                    egui::TextEdit::multiline(&mut self.import.text)
                        .code_editor()
                        .desired_rows(12)
                        .desired_width(f32::INFINITY)
                        .hint_text(r#"[{"id": "1", "title": "...", ...}]"#),
                );
                if let Some(error) = &self.import.error {
                    ui.colored_label(Color32::from_rgb(248, 113, 113), error);
                }
                ui.horizontal(|ui| {
                    if ui.button("Load Example").clicked() {
                        self.import.load_example();
                    }
                    if ui.button("Import").clicked() {
                        imported = self.import.submit(&mut self.player);
                    }
                });
            });
        self.import.open = open && !imported;
    }
}

impl<B: MediaBinding> eframe::App for AudioPlayerApp<B> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.tick(now);

        let palette = self.theme.palette();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let full = ui.max_rect();
                let is_playing = self.player.state().is_playing;
                self.visualizer
                    .paint(ui.painter(), full, self.player.snapshot(), is_playing, now);

                ui.vertical_centered(|ui| {
                    ui.set_max_width(640.0);
                    ui.add_space(24.0);
                    egui::Frame::new()
                        .fill(palette.container_fill)
                        .stroke(palette.panel_stroke)
                        .corner_radius(16.0)
                        .inner_margin(20.0)
                        .show(ui, |ui| {
                            self.header(ui, &palette);
                            ui.add_space(12.0);
                            egui::Frame::new()
                                .fill(palette.panel_fill)
                                .corner_radius(12.0)
                                .inner_margin(12.0)
                                .show(ui, |ui| self.transport(ui, &palette, now));
                            ui.add_space(12.0);
                            egui::Frame::new()
                                .fill(palette.panel_fill)
                                .corner_radius(12.0)
                                .inner_margin(12.0)
                                .show(ui, |ui| self.playlist(ui, &palette));
                        });
                });
            });

        if self.import.open {
            self.import_window(ctx);
        }

        self.visualizer.schedule(ctx, now);
        self.waveform.schedule(ctx, now);
        self.analyser_loop.schedule(ctx, now);
    }
}

impl<B: MediaBinding> Drop for AudioPlayerApp<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
