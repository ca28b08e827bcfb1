//! Browser audio player: playlist, seekable waveform and a frequency visualizer, rendered
//! with egui on a canvas and played through an `HtmlAudioElement`.

pub mod analyzer;
pub mod app;
pub mod config;
pub mod error;
pub mod media;
pub mod player;
pub mod playlist;
pub mod schedule;
pub mod theme;
pub mod ui;
pub mod visualizer;
pub mod waveform;
pub mod web;

#[cfg(test)]
mod testing;

pub use analyzer::{AnalyzerSnapshot, FrequencyAnalyzer};
pub use app::AudioPlayerApp;
pub use config::{AnalyzerConfig, PlayerOptions};
pub use error::{ImportError, PlayerError, PlayerResult};
pub use media::{FrequencyTap, MediaBinding, MediaEvent};
pub use player::{PlaybackState, Player};
pub use playlist::{Playlist, Track};
pub use theme::Theme;
pub use web::HtmlMediaBinding;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if eframe::WebLogger::init(log::LevelFilter::Debug).is_err() {
        web_sys::console::warn_1(&"logger already installed".into());
    }
}

/// Running player mounted on a canvas. Call `destroy` to unmount it.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct PlayerHandle {
    runner: eframe::WebRunner,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl PlayerHandle {
    /// Stop rendering and drop the app: redraw loops are cancelled, media listeners removed
    /// and the audio context closed.
    pub fn destroy(&self) {
        log::debug!("destroying player");
        self.runner.destroy();
    }

    pub fn has_panicked(&self) -> bool {
        self.runner.has_panicked()
    }
}

/// Mount the player on the canvas with id `canvas_id` using default options
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start(canvas_id: &str) -> Result<PlayerHandle, JsValue> {
    run(canvas_id, PlayerOptions::default())
}

/// Mount the player with options given as JSON (`initialTrack`, `playlist`, `volume`,
/// `theme`). Invalid JSON falls back to the defaults.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_with_options(canvas_id: &str, options_json: &str) -> Result<PlayerHandle, JsValue> {
    run(canvas_id, PlayerOptions::from_json(options_json))
}

#[cfg(target_arch = "wasm32")]
fn run(canvas_id: &str, options: PlayerOptions) -> Result<PlayerHandle, JsValue> {
    use wasm_bindgen::JsCast;

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{canvas_id}'")))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("element '{canvas_id}' is not a canvas")))?;

    let binding = HtmlMediaBinding::new().map_err(|e| {
        log::error!("audio setup failed: {e} ({})", e.detail().unwrap_or_default());
        JsValue::from_str(&e.to_string())
    })?;
    let theme = options.theme.unwrap_or_default();
    let player = Player::new(binding, &options);

    let runner = eframe::WebRunner::new();
    let handle = PlayerHandle {
        runner: runner.clone(),
    };
    wasm_bindgen_futures::spawn_local(async move {
        let started = runner
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(AudioPlayerApp::new(cc, player, theme)))),
            )
            .await;
        if let Err(e) = started {
            log::error!("failed to start eframe: {}", web::describe(&e));
        }
    });
    Ok(handle)
}
