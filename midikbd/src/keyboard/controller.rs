use heapless::Vec;

use crate::config::{Config, SWITCH_NOTE_DISABLED};
use crate::midi::{MidiEvent, MidiSource};

use super::{
    batch, Clock, ExternalCommunicator, FastPressTimers, KeyMapping, PressedKeys, Profile,
    Profiles,
};

pub const MAX_MIDI_SOURCES: usize = 4;

/// The whole runtime: MIDI sources in, keyboard reports out, every piece of
/// mutable state in between. Single-threaded by construction; `tick` is the
/// only entry point the polling loop needs.
pub struct Controller<S, C, T>
where
    S: MidiSource,
    C: ExternalCommunicator,
    T: Clock,
{
    pub communicator: C,
    sources: Vec<S, MAX_MIDI_SOURCES>,
    clock: T,
    config: Config,
    profiles: Profiles,
    pressed: PressedKeys,
    timers: FastPressTimers,
    modifiers: u8,
}

impl<S, C, T> Controller<S, C, T>
where
    S: MidiSource,
    C: ExternalCommunicator,
    T: Clock,
{
    pub fn new(communicator: C, clock: T, config: Config, profiles: Profiles) -> Self {
        Controller {
            communicator,
            sources: Vec::new(),
            clock,
            config,
            profiles,
            pressed: PressedKeys::new(),
            timers: FastPressTimers::new(),
            modifiers: 0,
        }
    }

    pub fn add_source(&mut self, source: S) -> Result<(), S> {
        self.sources.push(source)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    pub fn active_profile(&self) -> &Profile {
        self.profiles.active()
    }

    pub fn pressed_keys(&self) -> &[KeyMapping] {
        self.pressed.as_slice()
    }

    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// One pass of the polling loop: at most one message per source, each
    /// processed to completion before the next source is read, then the
    /// timed-release scan.
    pub fn tick(&mut self) {
        for i in 0..self.sources.len() {
            if let Some(event) = self.sources[i].poll() {
                self.handle_event(event);
            }
        }
        self.release_expired();
    }

    pub fn handle_event(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { note, velocity } if velocity > 0 => self.note_on(note),
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note } => self.note_off(note),
        }
    }

    pub fn cycle_profile(&mut self) {
        if self.profiles.len() > 1 {
            self.switch_profile(self.profiles.next_index());
        }
    }

    /// No-op for out-of-range or invalid targets. Otherwise the held keys
    /// are released one at a time, each with its own report refresh, so the
    /// host observes every transition; the modifier mask is cleared with one
    /// more refresh, and pending timers are discarded (their keys are
    /// already up at this point).
    pub fn switch_profile(&mut self, index: usize) {
        if !self.profiles.can_switch_to(index) {
            return;
        }
        while let Some(mapping) = self.pressed.first() {
            self.pressed.remove(&mapping);
            self.refresh();
        }
        self.modifiers = 0;
        self.refresh();
        self.profiles.activate(index);
        self.timers.clear();
        info!("active profile: {}", index);
    }

    fn is_switch_note(&self, note: u8) -> bool {
        self.config.profile_switch_note != SWITCH_NOTE_DISABLED
            && note == self.config.profile_switch_note
    }

    fn note_on(&mut self, note: u8) {
        if self.is_switch_note(note) {
            self.cycle_profile();
            return;
        }

        let mapping = self.profiles.active().mapping(note);
        if mapping.is_unmapped() {
            return;
        }
        debug!("note on {}", note);

        if mapping.is_modifier_only() {
            self.modifiers |= mapping.modifiers;
            self.refresh();
            return;
        }

        let profile = self.profiles.active();
        let fast_press = profile.fast_press_mode;
        let duration_ms = profile.press_duration_ms;

        if !fast_press {
            // Held until the matching note-off arrives.
            self.pressed.push(mapping);
            self.refresh();
        } else if duration_ms == 0 {
            // Atomic tap: press and release in one cascade.
            self.pressed.push(mapping);
            self.refresh();
            self.pressed.remove(&mapping);
            self.refresh();
        } else {
            self.pressed.push(mapping);
            self.refresh();
            let release_at = self.clock.now_ms() + u64::from(duration_ms);
            if !self.timers.schedule(mapping, release_at) {
                warn!("timer list full, key release deferred to profile switch");
            }
        }
    }

    fn note_off(&mut self, note: u8) {
        if self.is_switch_note(note) {
            return;
        }

        let mapping = self.profiles.active().mapping(note);
        if mapping.is_unmapped() {
            return;
        }
        debug!("note off {}", note);

        if mapping.is_modifier_only() {
            self.modifiers &= !mapping.modifiers;
            self.refresh();
            return;
        }

        // In fast-press mode the release already happened (or is timed);
        // the note-off carries no information.
        if !self.profiles.active().fast_press_mode {
            self.pressed.remove(&mapping);
            self.refresh();
        }
    }

    fn release_expired(&mut self) {
        let now = self.clock.now_ms();
        while let Some(mapping) = self.timers.pop_expired(now) {
            self.pressed.remove(&mapping);
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        if !self.communicator.is_ready() {
            return;
        }
        for report in batch(self.pressed.as_slice(), self.modifiers) {
            if self.communicator.send_report(&report).is_err() {
                warn!("failed to send keyboard report");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{Key, Report};
    use crate::testing::{ReportSink, ScriptedMidi, TestClock};

    const SHIFT: u8 = 0x02;
    const CTRL: u8 = 0x01;
    const H: u8 = 0x0b;
    const G: u8 = 0x0a;

    fn config() -> Config {
        Config {
            fast_press_mode: false,
            press_duration_ms: 0,
            profile_switch_note: 24,
        }
    }

    fn profile(name: &str, config: &Config, mappings: &[(u8, KeyMapping)]) -> Profile {
        let mut profile = Profile::new(name, config);
        for (note, mapping) in mappings {
            profile.set_mapping(*note, *mapping);
        }
        profile.is_valid = true;
        profile
    }

    fn controller<'a>(
        sink: &'a ReportSink,
        clock: &'a TestClock,
        config: Config,
        profiles: std::vec::Vec<Profile>,
    ) -> Controller<ScriptedMidi, &'a ReportSink, &'a TestClock> {
        let mut list: Vec<Profile, 8> = Vec::new();
        for p in profiles {
            let _ = list.push(p);
        }
        let profiles = Profiles::new(list, &config);
        Controller::new(sink, clock, config, profiles)
    }

    fn report(keys: &[u8], modifier: u8) -> Report {
        let mut report = Report::empty();
        report.modifier = modifier;
        report.key_codes[..keys.len()].copy_from_slice(keys);
        report
    }

    fn on(note: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            note,
            velocity: 100,
        }
    }

    fn off(note: u8) -> MidiEvent {
        MidiEvent::NoteOff { note }
    }

    #[test]
    fn note_on_then_off_round_trips_a_modified_key() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let game = profile("GAME", &cfg, &[(60, KeyMapping::new(H, SHIFT))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(60));
        assert_eq!(ctl.pressed_keys(), &[KeyMapping::new(H, SHIFT)][..]);
        assert_eq!(&sink.take()[..], &[report(&[H], SHIFT)][..]);

        ctl.handle_event(off(60));
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(&sink.take()[..], &[Report::empty()][..]);
    }

    #[test]
    fn unmapped_notes_are_ignored() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let game = profile("GAME", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(61));
        ctl.handle_event(off(61));
        assert!(sink.take().is_empty());
    }

    #[test]
    fn zero_velocity_note_on_acts_as_note_off() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let game = profile("GAME", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(60));
        ctl.handle_event(MidiEvent::NoteOn {
            note: 60,
            velocity: 0,
        });
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(&sink.take()[..], &[report(&[H], 0), Report::empty()][..]);
    }

    #[test]
    fn fast_press_with_zero_duration_taps() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let mut cfg = config();
        cfg.fast_press_mode = true;
        let game = profile("GAME", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(60));
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(&sink.take()[..], &[report(&[H], 0), Report::empty()][..]);

        // The note-off is a deliberate no-op afterwards.
        ctl.handle_event(off(60));
        assert!(sink.take().is_empty());
    }

    #[test]
    fn fast_press_with_duration_releases_on_schedule() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let mut cfg = config();
        cfg.fast_press_mode = true;
        cfg.press_duration_ms = 250;
        let game = profile("GAME", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        clock.set(1000);
        ctl.handle_event(on(60));
        assert_eq!(ctl.pressed_keys(), &[KeyMapping::new(H, 0)][..]);
        assert_eq!(ctl.pending_timers(), 1);
        assert_eq!(&sink.take()[..], &[report(&[H], 0)][..]);

        clock.set(1100);
        ctl.tick();
        assert_eq!(ctl.pressed_keys(), &[KeyMapping::new(H, 0)][..]);
        assert!(sink.take().is_empty());

        clock.set(1260);
        ctl.tick();
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(ctl.pending_timers(), 0);
        assert_eq!(&sink.take()[..], &[Report::empty()][..]);
    }

    #[test]
    fn overflowing_timer_leaves_its_key_held() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let mut cfg = config();
        cfg.fast_press_mode = true;
        cfg.press_duration_ms = 100;
        let game = profile(
            "GAME",
            &cfg,
            &[(30, KeyMapping::new(H, 0)), (31, KeyMapping::new(G, 0))],
        );
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        // Re-pressing the same note is a pressed-set no-op but schedules a
        // fresh timer each time, so six presses saturate the timer list.
        clock.set(0);
        for _ in 0..6 {
            ctl.handle_event(on(30));
        }
        assert_eq!(ctl.pending_timers(), 6);

        // This press lands in the pressed set but its timer is dropped.
        ctl.handle_event(on(31));
        assert_eq!(ctl.pending_timers(), 6);
        sink.take();

        clock.set(100);
        ctl.tick();
        // Note 30 released by its timers; note 31 stays held with nothing
        // left to release it short of a profile switch.
        assert_eq!(ctl.pressed_keys(), &[KeyMapping::new(G, 0)][..]);
        assert_eq!(ctl.pending_timers(), 0);
    }

    #[test]
    fn modifier_only_pad_raises_and_lowers_the_mask() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let game = profile(
            "GAME",
            &cfg,
            &[(40, KeyMapping::new(0, SHIFT)), (60, KeyMapping::new(H, 0))],
        );
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(40));
        assert_eq!(ctl.modifiers(), SHIFT);
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(&sink.take()[..], &[report(&[], SHIFT)][..]);

        ctl.handle_event(on(60));
        assert_eq!(&sink.take()[..], &[report(&[H], SHIFT)][..]);

        ctl.handle_event(off(40));
        assert_eq!(ctl.modifiers(), 0);
        assert_eq!(&sink.take()[..], &[report(&[H], 0)][..]);
    }

    #[test]
    fn modifier_only_pad_ignores_fast_press_mode() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let mut cfg = config();
        cfg.fast_press_mode = true;
        let game = profile("GAME", &cfg, &[(40, KeyMapping::new(0, CTRL))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(40));
        assert_eq!(ctl.modifiers(), CTRL);
        ctl.handle_event(off(40));
        assert_eq!(ctl.modifiers(), 0);
    }

    #[test]
    fn switch_note_cycles_without_reaching_the_table() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        // Note 24 is also mapped; the switch must consume the event first.
        let a = profile(
            "A",
            &cfg,
            &[(24, KeyMapping::new(G, 0)), (60, KeyMapping::new(H, 0))],
        );
        let b = profile("B", &cfg, &[(60, KeyMapping::new(G, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![a, b]);

        ctl.handle_event(on(24));
        assert_eq!(ctl.active_profile().name.as_str(), "B");
        for report in &sink.take() {
            assert!(!report.key_codes.contains(&G));
        }

        ctl.handle_event(off(24));
        assert!(sink.take().is_empty());
    }

    #[test]
    fn switch_note_with_single_profile_is_consumed_quietly() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let a = profile("A", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![a]);

        ctl.handle_event(on(24));
        assert_eq!(ctl.active_profile().name.as_str(), "A");
        assert!(sink.take().is_empty());
    }

    #[test]
    fn disabled_switch_note_routes_to_the_table() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let mut cfg = config();
        cfg.profile_switch_note = SWITCH_NOTE_DISABLED;
        let a = profile("A", &cfg, &[(24, KeyMapping::new(H, 0))]);
        let b = profile("B", &cfg, &[(60, KeyMapping::new(G, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![a, b]);

        ctl.handle_event(on(24));
        assert_eq!(ctl.active_profile().name.as_str(), "A");
        assert_eq!(&sink.take()[..], &[report(&[H], 0)][..]);
    }

    #[test]
    fn profile_switch_drains_keys_one_at_a_time() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let a = profile(
            "A",
            &cfg,
            &[
                (60, KeyMapping::new(H, 0)),
                (61, KeyMapping::new(G, 0)),
                (40, KeyMapping::new(0, SHIFT)),
            ],
        );
        let b = profile("B", &cfg, &[]);
        let mut ctl = controller(&sink, &clock, cfg, vec![a, b]);

        ctl.handle_event(on(60));
        ctl.handle_event(on(61));
        ctl.handle_event(on(40));
        sink.take();

        ctl.switch_profile(1);
        assert_eq!(ctl.active_profile().name.as_str(), "B");
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(ctl.modifiers(), 0);
        // Key-by-key release sequence, then the mask-clear refresh.
        assert_eq!(
            &sink.take()[..],
            &[report(&[G], SHIFT), report(&[], SHIFT), Report::empty()][..]
        );
    }

    #[test]
    fn profile_switch_discards_pending_timers() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let mut cfg = config();
        cfg.fast_press_mode = true;
        cfg.press_duration_ms = 500;
        let a = profile("A", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let b = profile("B", &cfg, &[]);
        let mut ctl = controller(&sink, &clock, cfg, vec![a, b]);

        clock.set(0);
        ctl.handle_event(on(60));
        assert_eq!(ctl.pending_timers(), 1);

        ctl.switch_profile(1);
        assert_eq!(ctl.pending_timers(), 0);
        assert!(ctl.pressed_keys().is_empty());
        sink.take();

        // The old timer must not fire against the new profile's state.
        clock.set(1000);
        ctl.tick();
        assert!(sink.take().is_empty());
    }

    #[test]
    fn switch_to_invalid_index_is_a_noop() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let a = profile("A", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![a]);

        ctl.handle_event(on(60));
        sink.take();
        ctl.switch_profile(3);
        assert_eq!(ctl.active_profile().name.as_str(), "A");
        assert_eq!(ctl.pressed_keys(), &[KeyMapping::new(H, 0)][..]);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn per_profile_settings_override_the_global_mode() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config(); // global: normal mode
        let mut fast = profile("FAST", &cfg, &[(60, KeyMapping::new(H, 0))]);
        fast.fast_press_mode = true;
        fast.press_duration_ms = 0;
        let mut ctl = controller(&sink, &clock, cfg, vec![fast]);

        ctl.handle_event(on(60));
        // Tap semantics despite the global default.
        assert!(ctl.pressed_keys().is_empty());
        assert_eq!(sink.take().len(), 2);
    }

    #[test]
    fn tick_polls_each_source_once_in_order() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let game = profile(
            "GAME",
            &cfg,
            &[(60, KeyMapping::new(H, 0)), (61, KeyMapping::new(G, 0))],
        );
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.add_source(ScriptedMidi::new(&[on(60), off(60)])).unwrap();
        ctl.add_source(ScriptedMidi::new(&[on(61)])).unwrap();

        ctl.tick();
        // The first source's cascade lands before the second is polled.
        assert_eq!(&sink.take()[..], &[report(&[H], 0), report(&[H, G], 0)][..]);

        ctl.tick();
        assert_eq!(&sink.take()[..], &[report(&[G], 0)][..]);
    }

    #[test]
    fn nothing_is_sent_before_the_transport_is_ready() {
        let sink = ReportSink::new();
        sink.set_ready(false);
        let clock = TestClock::new();
        let cfg = config();
        let game = profile("GAME", &cfg, &[(60, KeyMapping::new(H, 0))]);
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(60));
        assert!(sink.take().is_empty());
        // State still tracks so the first ready refresh is correct.
        assert_eq!(ctl.pressed_keys(), &[KeyMapping::new(H, 0)][..]);
    }

    #[test]
    fn chord_order_survives_into_reports() {
        let sink = ReportSink::new();
        let clock = TestClock::new();
        let cfg = config();
        let game = profile(
            "GAME",
            &cfg,
            &[
                (60, KeyMapping::new(Key::W.key_code(), 0)),
                (62, KeyMapping::new(Key::A.key_code(), 0)),
                (64, KeyMapping::new(Key::D.key_code(), SHIFT)),
            ],
        );
        let mut ctl = controller(&sink, &clock, cfg, vec![game]);

        ctl.handle_event(on(60));
        ctl.handle_event(on(62));
        ctl.handle_event(on(64));
        let reports = sink.take();
        // Final refresh: the unmodified run, then the shifted key.
        assert_eq!(
            &reports[reports.len() - 2..],
            &[
                report(&[Key::W.key_code(), Key::A.key_code()], 0),
                report(&[Key::D.key_code()], SHIFT),
            ][..]
        );
    }
}
