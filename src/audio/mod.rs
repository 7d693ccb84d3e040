//! Sound effects and music
//!
//! Browsers only allow audio after a user gesture, so playback goes through
//! an unlock state machine and a chain of fallbacks:
//! 1. decoded buffer through the `AudioContext` (after unlock)
//! 2. clone of a preloaded `<audio>` element
//! 3. a short synthesized click
//!
//! Failures are logged and swallowed; the frame loop never waits on audio.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{SharedAudio, WebAudio, unlock};

use rand::Rng;
use thiserror::Error;

use crate::sim::GameEvent;

pub const BOUNCE_URL: &str = "sounds/bounce.mp3";
pub const EAT_URL: &str = "sounds/pop.mp3";
pub const BGM_URL: &str = "sounds/bgm.mp3";

/// Last-resort click
pub const CLICK_FREQ_HZ: f32 = 120.0;
pub const CLICK_SECS: f64 = 0.03;
pub const CLICK_GAIN: f32 = 0.25;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Ball hits a wall
    Bounce,
    /// Evil circle eats a ball
    Eat,
}

impl Sound {
    pub const ALL: [Sound; 2] = [Sound::Bounce, Sound::Eat];

    pub fn url(self) -> &'static str {
        match self {
            Sound::Bounce => BOUNCE_URL,
            Sound::Eat => EAT_URL,
        }
    }

    /// Fixed playback gain before the mixer
    pub fn gain(self) -> f32 {
        match self {
            Sound::Bounce => 0.28,
            Sound::Eat => 0.40,
        }
    }

    /// Center playback rate and +/- jitter
    pub fn rate_jitter(self) -> (f32, f32) {
        match self {
            Sound::Bounce => (1.08, 0.05),
            Sound::Eat => (1.00, 0.06),
        }
    }

    /// Playback rate with random pitch variation
    pub fn jittered_rate<R: Rng>(self, rng: &mut R) -> f32 {
        let (center, jitter) = self.rate_jitter();
        center + (rng.random::<f32>() * 2.0 - 1.0) * jitter
    }

    /// Which sound a game event makes, if any
    pub fn for_event(event: GameEvent) -> Option<Sound> {
        match event {
            GameEvent::Bounce => Some(Sound::Bounce),
            GameEvent::Eat => Some(Sound::Eat),
            GameEvent::CountsChanged => None,
        }
    }
}

/// One-shot audio unlock
///
/// `Locked -> Unlocking` happens once, on the first gesture. The async
/// unlock then settles in `Unlocked` or `Degraded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockState {
    /// No gesture yet
    #[default]
    Locked,
    /// Context creation and decoding in flight
    Unlocking,
    /// Context running, buffers decoded where available
    Unlocked,
    /// Context or decode failed; tag and click fallbacks only
    Degraded,
}

impl UnlockState {
    /// Enter `Unlocking`. Returns false if unlock already started.
    pub fn begin(&mut self) -> bool {
        if *self == UnlockState::Locked {
            *self = UnlockState::Unlocking;
            true
        } else {
            false
        }
    }

    /// Settle an in-flight unlock
    pub fn finish(&mut self, decoded: bool) {
        if *self == UnlockState::Unlocking {
            *self = if decoded {
                UnlockState::Unlocked
            } else {
                UnlockState::Degraded
            };
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, UnlockState::Unlocked | UnlockState::Degraded)
    }
}

/// Playback fallback tiers, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTier {
    Buffer,
    Tag,
    Click,
}

impl PlaybackTier {
    pub const ORDER: [PlaybackTier; 3] = [PlaybackTier::Buffer, PlaybackTier::Tag, PlaybackTier::Click];
}

/// Try each tier in order; returns the first that played
pub fn play_first<F>(mut attempt: F) -> Option<PlaybackTier>
where
    F: FnMut(PlaybackTier) -> Result<(), AudioError>,
{
    for tier in PlaybackTier::ORDER {
        match attempt(tier) {
            Ok(()) => return Some(tier),
            Err(e) => log::trace!("{:?} playback unavailable: {}", tier, e),
        }
    }
    None
}

/// Volume settings applied on top of per-sound gains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            sfx_volume: 1.0,
            music_volume: 0.08,
            muted: false,
        }
    }
}

impl Mixer {
    pub fn sfx_gain(&self, sound: Sound) -> f32 {
        if self.muted {
            0.0
        } else {
            sound.gain() * self.sfx_volume
        }
    }

    pub fn music_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }
}

/// Audio failures; logged, never surfaced to the player
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no browser window")]
    NoWindow,
    #[error("audio context unavailable: {0}")]
    Context(String),
    #[error("audio not unlocked yet")]
    NoContext,
    #[error("fetch {url} failed: {reason}")]
    Fetch { url: &'static str, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: &'static str, status: u16 },
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("no decoded buffer for {0:?}")]
    NoBuffer(Sound),
    #[error("no <audio> element for {0:?}")]
    NoTag(Sound),
    #[error("playback failed: {0}")]
    Playback(String),
}
