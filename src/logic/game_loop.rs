//! Headless fixed-timestep driver.
//!
//! Plays the selected map of a session with the autoplay bot, one tick per
//! frame, without audio or rendering.

use crate::logic::autoplay::Autoplay;
use crate::models::engine::DROP_SECONDS;
use crate::models::replay::ReplayData;
use crate::state::error::SessionError;
use crate::state::{FrameInput, GameResult, Session};

/// Default ticks per second.
pub const TICK_RATE: u32 = 200;

/// Engine time of the first tick, so notes at time zero are admitted and
/// pressed on time.
const LEAD_IN_SECONDS: f32 = -1.0;

/// What a headless play produced.
#[derive(Debug, Clone)]
pub struct PlayOutcome {
    pub result: GameResult,
    pub replay: ReplayData,
    pub ticks: u64,
}

/// Runs the session's selected map to completion under autoplay at
/// `tick_rate` ticks per second.
///
/// The play ends when the engine reports every note judged and dropped, or
/// at the latest one second after the last note has been dropped.
pub fn run_autoplay(session: &mut Session, tick_rate: u32) -> Result<PlayOutcome, SessionError> {
    let track = session.track().ok_or(SessionError::NoChartLoaded)?;
    let bot = Autoplay::new(track, session.selected_map())?;
    let offset = track.offset;

    let tick_rate = if tick_rate == 0 {
        log::warn!("LOGIC: tick rate 0 is invalid, using {}", TICK_RATE);
        TICK_RATE
    } else {
        tick_rate
    };
    let dt = 1.0 / tick_rate as f32;
    let start = LEAD_IN_SECONDS - offset;
    let deadline = bot.last_arrival().max(start) + DROP_SECONDS + 1.0;

    session.start()?;
    log::info!(
        "LOGIC: autoplay at {} ticks/s, {} presses",
        tick_rate,
        bot.press_count()
    );

    let mut ticks: u64 = 0;
    while session.is_playing() {
        // Multiplying avoids drift from summing `dt`.
        let t = start + ticks as f32 * dt;
        if t > deadline {
            log::warn!("LOGIC: chart did not finish by {:.3}s, ending play", t);
            session.finish()?;
            break;
        }
        let (pressed, down) = bot.frame(t, dt);
        session.update(FrameInput::new(t, dt, pressed, down))?;
        ticks += 1;
    }

    let result = session.result().cloned().ok_or(SessionError::NotPlaying)?;
    let replay = session.replay().cloned().ok_or(SessionError::NotPlaying)?;
    Ok(PlayOutcome {
        result,
        replay,
        ticks,
    })
}
