//! Canvas 2D compositor
//!
//! Layout and text are computed here so they can be tested natively; the
//! wasm-only `canvas` module issues the actual draw calls.

#[cfg(target_arch = "wasm32")]
mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

use crate::consts::{EVIL_SPIN_MS_PER_RAD, TINT_DARK, TINT_LIGHT};
use crate::sim::{GamePhase, GameState, Rgb};

/// Background fill alpha; below 1.0 so moving balls leave trails
pub const TRAIL_ALPHA: f64 = 0.25;
pub const BALL_GLOW_BLUR: f64 = 18.0;
pub const PARTICLE_RADIUS: f64 = 2.0;
pub const RING_WIDTH: f64 = 4.0;
pub const RING_DASH: [f64; 2] = [10.0, 6.0];

pub const OVERLAY_ALPHA: f64 = 0.35;
pub const BANNER_ALPHA: f64 = 0.45;
pub const BANNER_HEIGHT: f64 = 120.0;
const FONT_FAMILY: &str = "system-ui, -apple-system, Segoe UI, Roboto, Arial";

/// Start and end colors of the background gradient
pub fn gradient_stops(tint: Rgb) -> (Rgb, Rgb) {
    (tint.darker(TINT_DARK), tint.darker(TINT_LIGHT))
}

/// Evil circle ring rotation (radians) at host time `now_ms`
pub fn spin_angle(now_ms: f64) -> f64 {
    now_ms / EVIL_SPIN_MS_PER_RAD
}

/// Counter element markup
pub fn hud_html(alive: usize, eaten: usize) -> String {
    format!(
        "Balls left: {}<br>Eaten: {}<br>[P] Pause \u{2022} [R] Restart",
        alive, eaten
    )
}

/// Frozen-frame overlay lines, if the sim is not running
pub fn overlay_lines(phase: GamePhase) -> Option<[&'static str; 2]> {
    match phase {
        GamePhase::Running => None,
        GamePhase::Paused => Some(["Paused \u{2014} press P to resume", "Press R to restart"]),
        GamePhase::GameOver => Some(["Stopped", "Press R to restart"]),
    }
}

/// Win banner lines once every ball is eaten
pub fn win_banner(state: &GameState) -> Option<[String; 2]> {
    let secs = state.elapsed_secs().filter(|_| state.is_game_over())?;
    Some([
        format!("You Win \u{2014} {:.1}s", secs),
        "Press R to play again".to_string(),
    ])
}

pub fn font(px: u32) -> String {
    format!("{}px {}", px, FONT_FAMILY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{INITIAL_TINT, tick};

    #[test]
    fn test_gradient_from_initial_tint() {
        let (start, end) = gradient_stops(INITIAL_TINT);
        assert_eq!(start, Rgb::new(5, 5, 6));
        assert_eq!(end, Rgb::new(13, 13, 16));
    }

    #[test]
    fn test_spin_angle() {
        assert_eq!(spin_angle(0.0), 0.0);
        assert!((spin_angle(400.0 * std::f64::consts::PI) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_hud_text() {
        assert_eq!(
            hud_html(24, 1),
            "Balls left: 24<br>Eaten: 1<br>[P] Pause \u{2022} [R] Restart"
        );
    }

    #[test]
    fn test_overlay_only_when_frozen() {
        assert_eq!(overlay_lines(GamePhase::Running), None);
        assert_eq!(overlay_lines(GamePhase::Paused).map(|l| l[1]), Some("Press R to restart"));
        assert_eq!(overlay_lines(GamePhase::GameOver).map(|l| l[0]), Some("Stopped"));
    }

    #[test]
    fn test_win_banner_after_last_eat() {
        let mut state = GameState::new(800.0, 600.0, 1, 3, 500.0);
        assert!(win_banner(&state).is_none());

        state.balls[0].pos = state.evil.pos;
        tick(&mut state, 12_840.0);

        let banner = win_banner(&state).expect("game should be won");
        assert_eq!(banner[0], "You Win \u{2014} 12.3s");
    }

    #[test]
    fn test_font() {
        assert!(font(28).starts_with("28px system-ui"));
    }
}
