//! Sound effects driven by simulation events.
//!
//! The director is an [`EventSink`]: the app shell hands it to the tick and
//! every shot, impact and phase change comes out as synthesized Web Audio.
//! All synthesis is oscillator- and noise-buffer-based; there are no sample
//! assets. Browsers refuse to start audio before a user gesture, so the
//! context is created lazily by [`AudioDirector::unlock`].

use rand::Rng;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{DestroyCause, Entity, EntityKind, EventSink};

use super::music::{DUCKED_MASTER_LEVEL, MASTER_LEVEL, MusicSequencer};

pub struct AudioDirector {
    ctx: Option<AudioContext>,
    music: MusicSequencer,
}

impl Default for AudioDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDirector {
    pub fn new() -> Self {
        Self {
            ctx: None,
            music: MusicSequencer::new(),
        }
    }

    /// Creates or resumes the audio context and starts the music loop. Call
    /// from a user-gesture handler; anywhere else the browser will keep the
    /// context suspended.
    pub fn unlock(&mut self) {
        if self.ctx.is_none() {
            self.ctx = AudioContext::new().ok();
            if self.ctx.is_none() {
                log::warn!("Web Audio unavailable; running silent");
            }
        }
        if let Some(ctx) = &self.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            self.music.start(ctx);
        }
    }

    /// Mirrors the sim's pause state onto the music loop.
    pub fn set_music_paused(&self, paused: bool) {
        if paused {
            self.music.pause();
        } else if let Some(ctx) = &self.ctx {
            self.music.resume(ctx);
        }
    }

    /// Rising "pew": a quick downward sine chirp.
    fn play_player_shoot(&self) {
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();
        let Some((osc, gain)) = create_osc(ctx, OscillatorType::Sine) else {
            return;
        };
        osc.frequency().set_value_at_time(800.0, now).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(200.0, now + 0.1)
            .ok();
        gain.gain().set_value_at_time(0.3, now).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, now + 0.1)
            .ok();
        osc.start().ok();
        osc.stop_with_when(now + 0.1).ok();
    }

    /// Lower, slower chirp so enemy fire reads differently from the player's.
    fn play_enemy_shoot(&self) {
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();
        let Some((osc, gain)) = create_osc(ctx, OscillatorType::Sine) else {
            return;
        };
        osc.frequency().set_value_at_time(400.0, now).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(100.0, now + 0.15)
            .ok();
        gain.gain().set_value_at_time(0.2, now).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, now + 0.15)
            .ok();
        osc.start().ok();
        osc.stop_with_when(now + 0.15).ok();
    }

    /// Three stacked layers: a low sine thump, a sawtooth crunch and a white
    /// noise burst.
    fn play_explosion(&self) {
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();

        if let Some((osc, gain)) = create_osc(ctx, OscillatorType::Sine) {
            osc.frequency().set_value_at_time(60.0, now).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, now + 0.3)
                .ok();
            gain.gain().set_value_at_time(0.5, now).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, now + 0.3)
                .ok();
            osc.start().ok();
            osc.stop_with_when(now + 0.3).ok();
        }

        if let Some((osc, gain)) = create_osc(ctx, OscillatorType::Sawtooth) {
            osc.frequency().set_value_at_time(300.0, now).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, now + 0.2)
                .ok();
            gain.gain().set_value_at_time(0.3, now).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, now + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(now + 0.2).ok();
        }

        play_noise_burst(ctx, now);
    }

    /// Harsh sawtooth drop for damage landing on the player.
    fn play_player_hit(&self) {
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();
        let Some((osc, gain)) = create_osc(ctx, OscillatorType::Sawtooth) else {
            return;
        };
        osc.frequency().set_value_at_time(150.0, now).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(50.0, now + 0.2)
            .ok();
        gain.gain().set_value_at_time(0.4, now).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, now + 0.2)
            .ok();
        osc.start().ok();
        osc.stop_with_when(now + 0.2).ok();
    }
}

impl EventSink for AudioDirector {
    fn on_entity_spawned(&mut self, entity: &Entity) {
        if let EntityKind::Bullet { player_owned } = entity.kind {
            if player_owned {
                self.play_player_shoot();
            } else {
                self.play_enemy_shoot();
            }
        }
    }

    fn on_entity_destroyed(&mut self, entity: &Entity, cause: DestroyCause) {
        if cause != DestroyCause::Hit {
            return;
        }
        // Enemy deaths and enemy bullets bursting on the player both explode.
        // A player bullet absorbed by a surviving enemy stays silent.
        match entity.kind {
            EntityKind::Enemy { .. } => self.play_explosion(),
            EntityKind::Bullet { player_owned: false } => self.play_explosion(),
            _ => {}
        }
    }

    fn on_damage(&mut self, _amount: i32) {
        self.play_player_hit();
    }

    fn on_game_over(&mut self) {
        self.music.set_volume(DUCKED_MASTER_LEVEL);
    }

    fn on_reset(&mut self) {
        self.music.set_volume(MASTER_LEVEL);
    }
}

/// Oscillator plus dedicated gain, wired straight to the destination.
fn create_osc(ctx: &AudioContext, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;
    osc.set_type(osc_type);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;
    Some((osc, gain))
}

fn play_noise_burst(ctx: &AudioContext, now: f64) {
    let sample_rate = ctx.sample_rate();
    let len = (sample_rate * 0.15) as u32;
    let Ok(buffer) = ctx.create_buffer(1, len, sample_rate) else {
        return;
    };
    let mut samples = vec![0.0f32; len as usize];
    let mut rng = rand::rng();
    for sample in &mut samples {
        *sample = rng.random_range(-1.0f32..1.0);
    }
    if buffer.copy_to_channel(&mut samples[..], 0).is_err() {
        return;
    }
    let Ok(source) = ctx.create_buffer_source() else {
        return;
    };
    source.set_buffer(Some(&buffer));
    let Ok(gain) = ctx.create_gain() else { return };
    if source.connect_with_audio_node(&gain).is_err()
        || gain.connect_with_audio_node(&ctx.destination()).is_err()
    {
        return;
    }
    gain.gain().set_value_at_time(0.3, now).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, now + 0.15)
        .ok();
    source.start().ok();
}
