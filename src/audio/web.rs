//! Web Audio backend
//!
//! Owned behind `Rc<RefCell<_>>` so the async unlock task and the frame loop
//! can share it. Borrows are never held across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{ArrayBuffer, Promise};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{AudioBuffer, AudioContext, HtmlAudioElement, Response};

use super::{
    AudioError, BGM_URL, CLICK_FREQ_HZ, CLICK_GAIN, CLICK_SECS, Mixer, PlaybackTier, Sound,
    UnlockState, play_first,
};

pub type SharedAudio = Rc<RefCell<WebAudio>>;

#[derive(Default)]
struct SoundSlot {
    /// Preloaded element for the tag fallback
    tag: Option<HtmlAudioElement>,
    /// Bytes fetched at startup, decoded on unlock
    prefetched: Option<ArrayBuffer>,
    buffer: Option<AudioBuffer>,
}

/// Audio manager for the game
pub struct WebAudio {
    unlock: UnlockState,
    ctx: Option<AudioContext>,
    bounce: SoundSlot,
    eat: SoundSlot,
    bgm: Option<HtmlAudioElement>,
    mixer: Mixer,
    rng: Pcg32,
}

impl WebAudio {
    /// Preload tags and start prefetching effect bytes
    pub fn new_shared(mixer: Mixer, seed: u64) -> SharedAudio {
        let bgm = preload_tag(BGM_URL).inspect(|tag| {
            tag.set_loop(true);
            tag.set_volume(mixer.music_gain() as f64);
        });

        let audio = Self {
            unlock: UnlockState::Locked,
            ctx: None,
            bounce: SoundSlot {
                tag: preload_tag(Sound::Bounce.url()),
                ..Default::default()
            },
            eat: SoundSlot {
                tag: preload_tag(Sound::Eat.url()),
                ..Default::default()
            },
            bgm,
            mixer,
            rng: Pcg32::seed_from_u64(seed),
        };

        let shared = Rc::new(RefCell::new(audio));
        for sound in Sound::ALL {
            prefetch(&shared, sound);
        }
        shared
    }

    pub fn unlock_state(&self) -> UnlockState {
        self.unlock
    }

    fn slot(&self, sound: Sound) -> &SoundSlot {
        match sound {
            Sound::Bounce => &self.bounce,
            Sound::Eat => &self.eat,
        }
    }

    fn slot_mut(&mut self, sound: Sound) -> &mut SoundSlot {
        match sound {
            Sound::Bounce => &mut self.bounce,
            Sound::Eat => &mut self.eat,
        }
    }

    /// Play a sound effect through the best available tier
    pub fn play(&mut self, sound: Sound) {
        if self.mixer.muted {
            return;
        }

        let gain = self.mixer.sfx_gain(sound);
        let rate = sound.jittered_rate(&mut self.rng);
        let played = play_first(|tier| match tier {
            PlaybackTier::Buffer => self.play_buffer(sound, gain, rate),
            PlaybackTier::Tag => self.play_tag(sound, gain, rate),
            PlaybackTier::Click => self.play_click(),
        });

        if played.is_none() {
            log::trace!("{:?} dropped, no playback path", sound);
        }
    }

    fn play_buffer(&self, sound: Sound, gain: f32, rate: f32) -> Result<(), AudioError> {
        let ctx = self.ctx.as_ref().ok_or(AudioError::NoContext)?;
        let buffer = self
            .slot(sound)
            .buffer
            .as_ref()
            .ok_or(AudioError::NoBuffer(sound))?;

        let src = ctx.create_buffer_source().map_err(playback)?;
        src.set_buffer(Some(buffer));
        src.playback_rate().set_value(rate);

        let gain_node = ctx.create_gain().map_err(playback)?;
        gain_node.gain().set_value(gain);

        src.connect_with_audio_node(&gain_node).map_err(playback)?;
        gain_node
            .connect_with_audio_node(&ctx.destination())
            .map_err(playback)?;
        src.start().map_err(playback)
    }

    fn play_tag(&self, sound: Sound, gain: f32, rate: f32) -> Result<(), AudioError> {
        let tag = self
            .slot(sound)
            .tag
            .as_ref()
            .filter(|tag| !tag.src().is_empty())
            .ok_or(AudioError::NoTag(sound))?;

        let copy: HtmlAudioElement = tag
            .clone_node_with_deep(true)
            .map_err(playback)?
            .dyn_into()
            .map_err(|_| AudioError::Playback("cloned node is not <audio>".into()))?;
        copy.set_volume(gain as f64);
        copy.set_playback_rate(rate as f64);

        let promise = copy.play().map_err(playback)?;
        watch_play(promise, log::Level::Debug, "Sound effect");
        Ok(())
    }

    fn play_click(&self) -> Result<(), AudioError> {
        let ctx = self.ctx.as_ref().ok_or(AudioError::NoContext)?;

        let osc = ctx.create_oscillator().map_err(playback)?;
        let gain = ctx.create_gain().map_err(playback)?;
        osc.frequency().set_value(CLICK_FREQ_HZ);
        gain.gain().set_value(CLICK_GAIN * self.mixer.sfx_volume);

        osc.connect_with_audio_node(&gain).map_err(playback)?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(playback)?;

        osc.start().map_err(playback)?;
        osc.stop_with_when(ctx.current_time() + CLICK_SECS)
            .map_err(playback)
    }

    /// Start the looping background track
    fn start_music(&self) {
        if self.mixer.muted {
            return;
        }
        let Some(bgm) = &self.bgm else { return };

        match bgm.play() {
            Ok(promise) => watch_play(promise, log::Level::Warn, "Background music"),
            Err(e) => log::warn!("Background music failed to start: {:?}", e),
        }
    }
}

/// Begin the one-time unlock; later calls are no-ops
///
/// Call from a user gesture handler.
pub fn unlock(audio: &SharedAudio) {
    if !audio.borrow_mut().unlock.begin() {
        return;
    }

    log::info!("Unlocking audio...");
    let audio = audio.clone();
    spawn_local(run_unlock(audio));
}

async fn run_unlock(audio: SharedAudio) {
    let ctx = match AudioContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            log::warn!("{}", AudioError::Context(format!("{:?}", e)));
            let mut a = audio.borrow_mut();
            a.unlock.finish(false);
            a.start_music();
            return;
        }
    };
    audio.borrow_mut().ctx = Some(ctx.clone());

    let mut decoded = true;
    for sound in Sound::ALL {
        let prefetched = audio.borrow().slot(sound).prefetched.clone();
        match load_buffer(&ctx, sound, prefetched).await {
            Ok(buffer) => audio.borrow_mut().slot_mut(sound).buffer = Some(buffer),
            // Missing file: that sound falls back, the rest still decode
            Err(e @ AudioError::Status { .. }) => log::error!("{}", e),
            Err(e) => {
                log::warn!("Web Audio decode failed, using <audio> fallback: {}", e);
                decoded = false;
                break;
            }
        }
    }

    let mut a = audio.borrow_mut();
    if !decoded {
        a.bounce.buffer = None;
        a.eat.buffer = None;
    }
    a.unlock.finish(decoded);
    log::info!("Audio unlock finished: {:?}", a.unlock);
    a.start_music();
}

async fn load_buffer(
    ctx: &AudioContext,
    sound: Sound,
    prefetched: Option<ArrayBuffer>,
) -> Result<AudioBuffer, AudioError> {
    let bytes = match prefetched {
        // Decoding detaches its input, keep the prefetched copy intact
        Some(bytes) => bytes.slice(0),
        None => fetch_bytes(sound.url()).await?,
    };

    let promise = ctx.decode_audio_data(&bytes).map_err(decode)?;
    JsFuture::from(promise)
        .await
        .map_err(decode)?
        .dyn_into::<AudioBuffer>()
        .map_err(decode)
}

async fn fetch_bytes(url: &'static str) -> Result<ArrayBuffer, AudioError> {
    let window = web_sys::window().ok_or(AudioError::NoWindow)?;
    let failed = |e: JsValue| AudioError::Fetch {
        url,
        reason: format!("{:?}", e),
    };

    let resp: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(failed)?
        .dyn_into()
        .map_err(failed)?;
    if !resp.ok() {
        return Err(AudioError::Status {
            url,
            status: resp.status(),
        });
    }

    JsFuture::from(resp.array_buffer().map_err(failed)?)
        .await
        .map_err(failed)?
        .dyn_into::<ArrayBuffer>()
        .map_err(failed)
}

fn prefetch(audio: &SharedAudio, sound: Sound) {
    let audio = audio.clone();
    spawn_local(async move {
        match fetch_bytes(sound.url()).await {
            Ok(bytes) => audio.borrow_mut().slot_mut(sound).prefetched = Some(bytes),
            Err(e) => log::debug!("Prefetch skipped: {}", e),
        }
    });
}

fn preload_tag(url: &str) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(url) {
        Ok(tag) => {
            tag.set_preload("auto");
            tag.load();
            Some(tag)
        }
        Err(e) => {
            log::warn!("Cannot create <audio> for {}: {:?}", url, e);
            None
        }
    }
}

/// Log a rejected `play()` promise (autoplay policy) without surfacing it
fn watch_play(promise: Promise, level: log::Level, what: &'static str) {
    spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            log::log!(level, "{} playback blocked: {:?}", what, e);
        }
    });
}

fn playback(e: JsValue) -> AudioError {
    AudioError::Playback(format!("{:?}", e))
}

fn decode(e: JsValue) -> AudioError {
    AudioError::Decode(format!("{:?}", e))
}
