//! Browser media binding: one `HtmlAudioElement`, optionally routed through an
//! `AudioContext` analyser.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AnalyserNode, AudioContext, HtmlAudioElement, MediaElementAudioSourceNode};

use crate::config::AnalyzerConfig;
use crate::error::{PlayerError, PlayerResult};
use crate::media::{EventQueue, FrequencyTap, MediaBinding, MediaEvent, PlayGeneration};

type Listener = Closure<dyn FnMut(web_sys::Event)>;

// Event listeners registered on one target; removed again on drop.
struct ListenerGuard {
    target: web_sys::EventTarget,
    listeners: Vec<(&'static str, Listener)>,
}

impl ListenerGuard {
    fn new(target: web_sys::EventTarget) -> Self {
        Self {
            target,
            listeners: Vec::new(),
        }
    }

    fn listen(
        &mut self,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        self.target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push((event, closure));
        Ok(())
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        for (event, closure) in self.listeners.drain(..) {
            if let Err(e) = self
                .target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                log::warn!("failed to remove {event} listener: {}", describe(&e));
            }
        }
    }
}

/// Best-effort text for a JS exception or rejection value
pub fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return format!("{}: {}", String::from(error.name()), String::from(error.message()));
    }
    format!("{value:?}")
}

fn media_error_detail(audio: &HtmlAudioElement) -> String {
    let Some(error) = audio.error() else {
        return "unknown media error".to_owned();
    };
    let code = match error.code() {
        web_sys::MediaError::MEDIA_ERR_ABORTED => "MEDIA_ERR_ABORTED",
        web_sys::MediaError::MEDIA_ERR_NETWORK => "MEDIA_ERR_NETWORK",
        web_sys::MediaError::MEDIA_ERR_DECODE => "MEDIA_ERR_DECODE",
        web_sys::MediaError::MEDIA_ERR_SRC_NOT_SUPPORTED => "MEDIA_ERR_SRC_NOT_SUPPORTED",
        _ => "MEDIA_ERR_UNKNOWN",
    };
    let message = error.message();
    if message.is_empty() {
        code.to_owned()
    } else {
        format!("{code}: {message}")
    }
}

fn close_context(ctx: &AudioContext) {
    if let Err(e) = ctx.close() {
        log::warn!("audio context close failed: {}", describe(&e));
    }
}

// An element can be routed into an audio graph only once, so the context and source node
// live as long as the binding, across analyser wiring failures.
struct AudioGraph {
    ctx: AudioContext,
    source: MediaElementAudioSourceNode,
}

impl AudioGraph {
    fn route(audio: &HtmlAudioElement) -> Result<Self, JsValue> {
        let ctx = AudioContext::new()?;
        match ctx.create_media_element_source(audio) {
            Ok(source) => Ok(Self { ctx, source }),
            Err(e) => {
                close_context(&ctx);
                Err(e)
            }
        }
    }

    fn wire_analyser(&self, config: &AnalyzerConfig) -> Result<WebAnalyserTap, JsValue> {
        self.source.disconnect()?;
        let analyser = self.ctx.create_analyser()?;
        analyser.set_fft_size(config.fft_size);
        analyser.set_smoothing_time_constant(config.smoothing);

        self.source.connect_with_audio_node(&analyser)?;
        analyser.connect_with_audio_node(&self.ctx.destination())?;
        Ok(WebAnalyserTap { analyser })
    }

    // Element straight to the speakers, so playback stays audible without an analyser
    fn bypass(&self) {
        let connected = self
            .source
            .disconnect()
            .and_then(|()| self.source.connect_with_audio_node(&self.ctx.destination()));
        if let Err(e) = connected {
            log::warn!("audio bypass failed: {}", describe(&e));
        }
    }
}

pub struct HtmlMediaBinding {
    audio: HtmlAudioElement,
    queue: EventQueue,
    graph: Option<AudioGraph>,
    _listeners: ListenerGuard,
}

impl HtmlMediaBinding {
    /// Create the audio element and register its media listeners.
    ///
    /// # Errors
    ///
    /// [`PlayerError::Initialization`] when the element cannot be created or a listener
    /// cannot be registered.
    pub fn new() -> PlayerResult<Self> {
        let init_error = |e: JsValue| PlayerError::Initialization(describe(&e));

        let audio = HtmlAudioElement::new().map_err(init_error)?;
        audio.set_cross_origin(Some("anonymous"));
        audio.set_preload("auto");

        let queue = EventQueue::default();
        let mut listeners = ListenerGuard::new(audio.clone().into());

        let (q, a) = (queue.clone(), audio.clone());
        listeners
            .listen("loadedmetadata", move |_| {
                q.push(MediaEvent::MetadataLoaded(a.duration()));
            })
            .map_err(init_error)?;

        let (q, a) = (queue.clone(), audio.clone());
        listeners
            .listen("timeupdate", move |_| {
                q.push(MediaEvent::TimeUpdate(a.current_time()));
            })
            .map_err(init_error)?;

        let q = queue.clone();
        listeners
            .listen("ended", move |_| q.push(MediaEvent::Ended))
            .map_err(init_error)?;

        let (q, a) = (queue.clone(), audio.clone());
        listeners
            .listen("error", move |_| {
                q.push(MediaEvent::Error(media_error_detail(&a)));
            })
            .map_err(init_error)?;

        Ok(Self {
            audio,
            queue,
            graph: None,
            _listeners: listeners,
        })
    }
}

impl MediaBinding for HtmlMediaBinding {
    fn load(&mut self, url: &str) {
        self.audio.set_src(url);
        self.audio.load();
    }

    fn request_play(&mut self, generation: PlayGeneration) {
        // A context created before user activation starts suspended
        if let Some(graph) = &self.graph {
            if let Err(e) = graph.ctx.resume() {
                log::warn!("audio context resume failed: {}", describe(&e));
            }
        }

        let promise = match self.audio.play() {
            Ok(promise) => promise,
            Err(e) => {
                self.queue
                    .push(MediaEvent::PlayRejected(generation, describe(&e)));
                return;
            }
        };
        let queue = self.queue.clone();
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => queue.push(MediaEvent::PlayStarted(generation)),
                Err(e) => queue.push(MediaEvent::PlayRejected(generation, describe(&e))),
            }
        });
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            log::warn!("pause failed: {}", describe(&e));
        }
    }

    fn set_position(&mut self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn attach_analyzer(&mut self, config: &AnalyzerConfig) -> PlayerResult<Box<dyn FrequencyTap>> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => AudioGraph::route(&self.audio)
                .map_err(|e| PlayerError::Initialization(describe(&e)))?,
        };
        let graph = self.graph.insert(graph);
        match graph.wire_analyser(config) {
            Ok(tap) => Ok(Box::new(tap)),
            Err(e) => {
                graph.bypass();
                Err(PlayerError::Initialization(describe(&e)))
            }
        }
    }

    fn take_events(&mut self) -> Vec<MediaEvent> {
        self.queue.drain()
    }
}

impl Drop for HtmlMediaBinding {
    fn drop(&mut self) {
        if let Err(e) = self.audio.pause() {
            log::warn!("pause on teardown failed: {}", describe(&e));
        }
        self.audio.set_src("");
        if let Some(graph) = self.graph.take() {
            close_context(&graph.ctx);
        }
    }
}

struct WebAnalyserTap {
    analyser: AnalyserNode,
}

impl FrequencyTap for WebAnalyserTap {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn read_into(&self, out: &mut [u8]) {
        let bins = self.bin_count().min(out.len());
        self.analyser.get_byte_frequency_data(&mut out[..bins]);
    }
}
