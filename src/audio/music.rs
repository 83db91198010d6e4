//! The background music loop.
//!
//! One 16-beat bar at 170 BPM, looped forever: square-wave melody, sawtooth
//! bass, triangle arpeggio, a sine pad underneath and a minimal kick/hi-hat
//! pattern. The pattern data and helpers are target-independent; the
//! `MusicSequencer` that actually schedules oscillators is wasm-only.
//!
//! Scheduling works bar-at-a-time: every note of the bar is queued against
//! the audio clock in one burst, then a timer re-triggers just as the bar
//! ends. Pausing cancels the timer; the already-scheduled remainder of the
//! current bar is allowed to ring out.

pub const BPM: f64 = 170.0;
pub const BEAT_DURATION_S: f64 = 60.0 / BPM;
pub const BEATS_PER_BAR: u32 = 16;
pub const BAR_DURATION_S: f64 = BEAT_DURATION_S * BEATS_PER_BAR as f64;

/// Note envelope: linear attack, hold, linear release.
pub const NOTE_ATTACK_S: f64 = 0.01;
pub const NOTE_RELEASE_S: f64 = 0.1;

// Section mix levels, all feeding the master gain.
pub const MASTER_LEVEL: f32 = 0.15;
/// Master level while the game-over screen is up.
pub const DUCKED_MASTER_LEVEL: f32 = 0.05;
pub const LEAD_LEVEL: f32 = 0.3;
pub const BASS_LEVEL: f32 = 0.4;
pub const ARP_LEVEL: f32 = 0.2;
pub const PAD_LEVEL: f32 = 0.15;
pub const DRUM_LEVEL: f32 = 0.3;

pub const KICK_FREQ: f32 = 150.0;
pub const KICK_DURATION_S: f64 = 0.1;
pub const HAT_FREQ: f32 = 8000.0;
pub const HAT_DURATION_S: f64 = 0.05;

/// (note name, start beat, duration in beats)
pub type PatternNote = (&'static str, f64, f64);

#[rustfmt::skip]
pub const MELODY: &[PatternNote] = &[
    ("E4", 0.0, 0.25), ("G4", 0.25, 0.25), ("A4", 0.5, 0.5),
    ("B4", 1.0, 0.5), ("C5", 1.5, 0.25), ("B4", 1.75, 0.25),
    ("A4", 2.0, 0.5), ("G4", 2.5, 0.5),
    ("E4", 3.0, 0.5), ("G4", 3.5, 0.5),
    ("E4", 4.0, 0.25), ("G4", 4.25, 0.25), ("A4", 4.5, 0.5),
    ("B4", 5.0, 0.5), ("C5", 5.5, 0.5),
    ("D5", 6.0, 0.25), ("C5", 6.25, 0.25), ("B4", 6.5, 0.5),
    ("A4", 7.0, 1.0),
    ("D4", 8.0, 0.25), ("E4", 8.25, 0.25), ("G4", 8.5, 0.5),
    ("A4", 9.0, 0.5), ("B4", 9.5, 0.5),
    ("A4", 10.0, 0.5), ("G4", 10.5, 0.5),
    ("E4", 11.0, 0.5), ("D4", 11.5, 0.5),
    ("D4", 12.0, 0.5), ("E4", 12.5, 0.5),
    ("G4", 13.0, 0.5), ("A4", 13.5, 0.5),
    ("B4", 14.0, 1.0), ("A4", 15.0, 1.0),
];

#[rustfmt::skip]
pub const BASS_LINE: &[PatternNote] = &[
    ("E2", 0.0, 0.5), ("E2", 1.0, 0.5), ("E2", 2.0, 0.5), ("E2", 3.0, 0.5),
    ("A2", 4.0, 0.5), ("A2", 5.0, 0.5), ("A2", 6.0, 0.5), ("A2", 7.0, 0.5),
    ("D2", 8.0, 0.5), ("G2", 9.0, 0.5), ("G2", 10.0, 0.5), ("E2", 11.0, 0.5),
    ("C2", 12.0, 0.5), ("D2", 13.0, 0.5), ("E2", 14.0, 1.0), ("E2", 15.0, 1.0),
];

#[rustfmt::skip]
pub const ARPEGGIO: &[PatternNote] = &[
    ("E5", 0.0, 0.125), ("G5", 0.125, 0.125), ("B5", 0.25, 0.125), ("E5", 0.375, 0.125),
    ("E5", 1.0, 0.125), ("G5", 1.125, 0.125), ("B5", 1.25, 0.125), ("E5", 1.375, 0.125),
    ("A5", 4.0, 0.125), ("C5", 4.125, 0.125), ("E5", 4.25, 0.125), ("A5", 4.375, 0.125),
    ("A5", 5.0, 0.125), ("C5", 5.125, 0.125), ("E5", 5.25, 0.125), ("A5", 5.375, 0.125),
];

/// Sustained pad chord: each note occupies a third of the bar.
pub const PAD_CHORD: &[&str] = &["E3", "A3", "D3"];
pub const PAD_SPAN_BEATS: f64 = 5.33;

pub fn kick_on_beat(beat: u32) -> bool {
    beat % 4 == 0
}

pub fn hat_on_beat(beat: u32) -> bool {
    beat % 2 == 1
}

const NOTE_TABLE: &[(&str, f32)] = &[
    ("C2", 65.41),
    ("D2", 73.42),
    ("E2", 82.41),
    ("G2", 98.00),
    ("A2", 110.00),
    ("D3", 146.83),
    ("E3", 164.81),
    ("A3", 220.00),
    ("D4", 293.66),
    ("E4", 329.63),
    ("G4", 392.00),
    ("A4", 440.00),
    ("B4", 493.88),
    ("C5", 523.25),
    ("D5", 587.33),
    ("E5", 659.25),
    ("G5", 783.99),
    ("A5", 880.00),
    ("B5", 987.77),
];

/// Frequency in Hz for a note name. Unknown names fall back to A4.
pub fn note_to_freq(note: &str) -> f32 {
    NOTE_TABLE
        .iter()
        .find(|(name, _)| *name == note)
        .map(|(_, freq)| *freq)
        .unwrap_or(440.0)
}

#[cfg(target_arch = "wasm32")]
pub use sequencer::MusicSequencer;

#[cfg(target_arch = "wasm32")]
mod sequencer {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use web_sys::{AudioContext, GainNode, OscillatorType};

    use super::*;

    struct Mixer {
        master: GainNode,
        lead: GainNode,
        bass: GainNode,
        arp: GainNode,
        pad: GainNode,
        drums: GainNode,
    }

    impl Mixer {
        fn create(ctx: &AudioContext) -> Option<Self> {
            let master = ctx.create_gain().ok()?;
            master.gain().set_value(MASTER_LEVEL);
            master.connect_with_audio_node(&ctx.destination()).ok()?;

            let section = |level: f32| -> Option<GainNode> {
                let gain = ctx.create_gain().ok()?;
                gain.gain().set_value(level);
                gain.connect_with_audio_node(&master).ok()?;
                Some(gain)
            };
            let lead = section(LEAD_LEVEL)?;
            let bass = section(BASS_LEVEL)?;
            let arp = section(ARP_LEVEL)?;
            let pad = section(PAD_LEVEL)?;
            let drums = section(DRUM_LEVEL)?;

            Some(Self {
                master,
                lead,
                bass,
                arp,
                pad,
                drums,
            })
        }
    }

    struct SequencerState {
        mixer: Option<Mixer>,
        /// Timer handle for the next bar, if one is armed.
        timeout_id: Option<i32>,
        playing: bool,
        paused: bool,
    }

    /// Bar-looping music playback. Internally reference-counted so the
    /// re-trigger timer callback can reach back into the sequencer.
    pub struct MusicSequencer {
        inner: Rc<RefCell<SequencerState>>,
    }

    impl Default for MusicSequencer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MusicSequencer {
        pub fn new() -> Self {
            Self {
                inner: Rc::new(RefCell::new(SequencerState {
                    mixer: None,
                    timeout_id: None,
                    playing: false,
                    paused: false,
                })),
            }
        }

        /// Starts the loop from the top of the bar. Idempotent while already
        /// playing.
        pub fn start(&self, ctx: &AudioContext) {
            {
                let mut state = self.inner.borrow_mut();
                if state.playing {
                    return;
                }
                state.playing = true;
                state.paused = false;
            }
            play_bar(&self.inner, ctx);
        }

        /// Stops the loop at the next bar boundary by disarming the
        /// re-trigger. Notes already scheduled keep ringing.
        pub fn pause(&self) {
            let mut state = self.inner.borrow_mut();
            if !state.playing || state.paused {
                return;
            }
            state.paused = true;
            cancel_retrigger(&mut state);
        }

        /// Resumes a paused loop, replaying from the top of the bar.
        pub fn resume(&self, ctx: &AudioContext) {
            {
                let mut state = self.inner.borrow_mut();
                if !state.playing || !state.paused {
                    return;
                }
                state.paused = false;
            }
            play_bar(&self.inner, ctx);
        }

        pub fn stop(&self) {
            let mut state = self.inner.borrow_mut();
            state.playing = false;
            state.paused = false;
            cancel_retrigger(&mut state);
        }

        /// Master level for the whole music mix. SFX are unaffected.
        pub fn set_volume(&self, level: f32) {
            if let Some(mixer) = &self.inner.borrow().mixer {
                mixer.master.gain().set_value(level);
            }
        }
    }

    fn cancel_retrigger(state: &mut SequencerState) {
        if let Some(id) = state.timeout_id.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(id);
            }
        }
    }

    /// Schedules every note of one bar against the audio clock, then arms
    /// the timer that plays the next bar.
    fn play_bar(inner: &Rc<RefCell<SequencerState>>, ctx: &AudioContext) {
        {
            let mut state = inner.borrow_mut();
            if !state.playing || state.paused {
                return;
            }
            if state.mixer.is_none() {
                state.mixer = Mixer::create(ctx);
            }
            if state.mixer.is_none() {
                log::warn!("music mixer unavailable");
                return;
            }
        }

        {
            let state = inner.borrow();
            let Some(mixer) = &state.mixer else { return };
            let now = ctx.current_time();

            for &(note, start, dur) in MELODY {
                schedule_note(
                    ctx,
                    &mixer.lead,
                    note_to_freq(note),
                    now + start * BEAT_DURATION_S,
                    dur * BEAT_DURATION_S,
                    OscillatorType::Square,
                );
            }
            for &(note, start, dur) in BASS_LINE {
                schedule_note(
                    ctx,
                    &mixer.bass,
                    note_to_freq(note),
                    now + start * BEAT_DURATION_S,
                    dur * BEAT_DURATION_S,
                    OscillatorType::Sawtooth,
                );
            }
            for &(note, start, dur) in ARPEGGIO {
                schedule_note(
                    ctx,
                    &mixer.arp,
                    note_to_freq(note),
                    now + start * BEAT_DURATION_S,
                    dur * BEAT_DURATION_S,
                    OscillatorType::Triangle,
                );
            }
            for (i, note) in PAD_CHORD.iter().enumerate() {
                schedule_note(
                    ctx,
                    &mixer.pad,
                    note_to_freq(note),
                    now + i as f64 * PAD_SPAN_BEATS * BEAT_DURATION_S,
                    PAD_SPAN_BEATS * BEAT_DURATION_S,
                    OscillatorType::Sine,
                );
            }
            for beat in 0..BEATS_PER_BAR {
                let at = now + f64::from(beat) * BEAT_DURATION_S;
                if kick_on_beat(beat) {
                    schedule_drum(ctx, &mixer.drums, KICK_FREQ, at, KICK_DURATION_S);
                }
                if hat_on_beat(beat) {
                    schedule_drum(ctx, &mixer.drums, HAT_FREQ, at, HAT_DURATION_S);
                }
            }
        }

        arm_retrigger(inner, ctx);
    }

    fn arm_retrigger(inner: &Rc<RefCell<SequencerState>>, ctx: &AudioContext) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let cb_inner = inner.clone();
        let cb_ctx = ctx.clone();
        let closure = Closure::once(move || {
            cb_inner.borrow_mut().timeout_id = None;
            play_bar(&cb_inner, &cb_ctx);
        });
        if let Ok(id) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            (BAR_DURATION_S * 1000.0) as i32,
        ) {
            inner.borrow_mut().timeout_id = Some(id);
        }
        closure.forget();
    }

    /// One oscillator note with the shared attack/release envelope.
    fn schedule_note(
        ctx: &AudioContext,
        out: &GainNode,
        freq: f32,
        start: f64,
        duration: f64,
        wave: OscillatorType,
    ) {
        let Ok(osc) = ctx.create_oscillator() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };
        osc.set_type(wave);
        osc.frequency().set_value(freq);
        if osc.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(out).is_err()
        {
            return;
        }
        let env = gain.gain();
        env.set_value_at_time(0.0, start).ok();
        env.linear_ramp_to_value_at_time(1.0, start + NOTE_ATTACK_S).ok();
        env.set_value_at_time(1.0, start + duration - NOTE_RELEASE_S).ok();
        env.linear_ramp_to_value_at_time(0.0, start + duration).ok();
        osc.start_with_when(start).ok();
        osc.stop_with_when(start + duration).ok();
    }

    /// Percussion hit: a sine whose pitch collapses two decades over its
    /// duration. 150Hz reads as a kick, 8kHz as a hi-hat.
    fn schedule_drum(ctx: &AudioContext, out: &GainNode, freq: f32, start: f64, duration: f64) {
        let Ok(osc) = ctx.create_oscillator() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };
        osc.set_type(OscillatorType::Sine);
        if osc.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(out).is_err()
        {
            return;
        }
        osc.frequency().set_value_at_time(freq, start).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(freq * 0.01, start + duration)
            .ok();
        let env = gain.gain();
        env.set_value_at_time(1.0, start).ok();
        env.exponential_ramp_to_value_at_time(0.01, start + duration).ok();
        osc.start_with_when(start).ok();
        osc.stop_with_when(start + duration).ok();
    }
}
