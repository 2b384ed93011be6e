use std::sync::{Arc, Mutex};
use std::time::Duration;

use stepgrid::grid::{Action, SequenceStore};
use stepgrid::runtime::Player;
use stepgrid::sequencing::{
    AudioClock, Beat, BeatScheduler, CatchUpPolicy, HandlerError, ManualClock, SchedulerConfig,
    VisualScheduler,
};

type Recorded = Arc<Mutex<Vec<Beat>>>;

fn recording_scheduler(bpm: f64, clock: &ManualClock) -> (BeatScheduler<ManualClock>, Recorded) {
    let beats: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = beats.clone();
    let mut scheduler = BeatScheduler::new(bpm, clock.clone()).unwrap();
    scheduler.set_handler(move |beat: Beat| -> Result<(), HandlerError> {
        sink.lock().unwrap().push(beat);
        Ok(())
    });
    (scheduler, beats)
}

#[test]
fn ninety_six_bpm_start_at_ten_seconds() {
    let clock = ManualClock::new(10.0);
    let (mut scheduler, beats) = recording_scheduler(96.0, &clock);
    assert_eq!(scheduler.beat_length(), 0.625);

    scheduler.start().unwrap();
    assert_eq!(beats.lock().unwrap().len(), 1);
    assert_eq!(beats.lock().unwrap()[0].start_time, 10.0);

    clock.set(10.52);
    scheduler.poll().unwrap();
    assert_eq!(beats.lock().unwrap().len(), 1, "tick 1 is outside the window");

    clock.set(10.53);
    scheduler.poll().unwrap();
    let beats = beats.lock().unwrap();
    assert_eq!(beats.len(), 2);
    assert_eq!(beats[1].tick, 1);
    assert_eq!(beats[1].start_time, 10.625);
}

#[test]
fn schedule_does_not_depend_on_poll_cadence() {
    let steady_clock = ManualClock::new(3.0);
    let jittery_clock = ManualClock::new(3.0);
    let (mut steady, steady_beats) = recording_scheduler(137.0, &steady_clock);
    let (mut jittery, jittery_beats) = recording_scheduler(137.0, &jittery_clock);

    steady.start().unwrap();
    jittery.start().unwrap();

    // Regular 5 ms polls
    for i in 1..=2_000 {
        steady_clock.set(3.0 + i as f64 * 0.005);
        steady.poll().unwrap();
    }

    // Irregular polls, including a two second stall
    for &t in &[3.013, 3.4, 3.41, 5.41, 5.9, 7.333, 12.0, 13.0] {
        jittery_clock.set(t);
        jittery.poll().unwrap();
    }

    assert_eq!(*steady_beats.lock().unwrap(), *jittery_beats.lock().unwrap());
}

#[test]
fn stall_emits_every_missed_tick_in_order() {
    let clock = ManualClock::new(0.0);
    let (mut scheduler, beats) = recording_scheduler(120.0, &clock);
    scheduler.start().unwrap();

    clock.set(3.0);
    let emitted = scheduler.poll().unwrap();

    // Ticks 1..=6 start before 3.1
    assert_eq!(emitted, 6);
    let beats = beats.lock().unwrap();
    let ticks: Vec<u64> = beats.iter().map(|b| b.tick).collect();
    assert_eq!(ticks, (0..=6).collect::<Vec<_>>());
    for pair in beats.windows(2) {
        assert!(pair[1].start_time > pair[0].start_time);
    }
}

#[test]
fn nothing_beyond_the_lookahead_window() {
    let config = SchedulerConfig::default().lookahead(Duration::from_millis(80));
    let clock = ManualClock::new(1.0);
    let beats: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = beats.clone();
    let probe = clock.clone();
    let mut scheduler = BeatScheduler::with_config(150.0, config, clock.clone()).unwrap();
    scheduler.set_handler(move |beat: Beat| -> Result<(), HandlerError> {
        assert!(beat.start_time < probe.now() + 0.08);
        sink.lock().unwrap().push(beat);
        Ok(())
    });

    scheduler.start().unwrap();
    for i in 0..500 {
        clock.set(1.0 + i as f64 * 0.017);
        scheduler.poll().unwrap();
        assert!(scheduler.next_start_time() >= clock.now() + 0.08);
    }
    assert!(!beats.lock().unwrap().is_empty());
}

#[test]
fn start_times_are_exact_multiples_of_the_beat() {
    let clock = ManualClock::new(0.25);
    let (mut scheduler, beats) = recording_scheduler(133.0, &clock);
    scheduler.start().unwrap();

    // About 10k beats in one poll
    clock.set(0.25 + 10_000.0 * 60.0 / 133.0);
    scheduler.poll().unwrap();

    let beat_length = 60.0 / 133.0;
    for beat in beats.lock().unwrap().iter() {
        assert_eq!(beat.start_time, 0.25 + beat.tick as f64 * beat_length);
        assert_eq!(beat.duration, beat_length);
    }
}

#[test]
fn restart_resets_the_timeline() {
    let clock = ManualClock::new(0.0);
    let (mut scheduler, beats) = recording_scheduler(120.0, &clock);
    scheduler.start().unwrap();
    clock.set(2.0);
    scheduler.poll().unwrap();
    scheduler.stop();

    clock.set(5.0);
    beats.lock().unwrap().clear();
    scheduler.start().unwrap();

    let beats = beats.lock().unwrap();
    assert_eq!(beats[0].tick, 0);
    assert_eq!(beats[0].start_time, 5.0);
    assert_eq!(scheduler.origin(), 5.0);
}

#[test]
fn length_change_is_read_per_tick() {
    let clock = ManualClock::new(0.0);
    let store = SequenceStore::new(8).shared();
    let (feed, mut visual) = VisualScheduler::with_feed(64);
    let visual_ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = visual_ticks.clone();
    visual = visual.policy(CatchUpPolicy::Every);
    visual.set_handler(move |index| sink.lock().unwrap().push(index));

    let mut scheduler = BeatScheduler::new(120.0, clock.clone()).unwrap();
    scheduler.set_handler(Player::new(store.clone()).visual(feed));
    scheduler.start().unwrap();

    // Ticks 0..=7 start before 3.6
    clock.set(3.5);
    scheduler.poll().unwrap();
    assert_eq!(scheduler.tick(), 8);

    store.write().unwrap().apply(&Action::Resize { len: 4 });
    clock.set(4.0);
    scheduler.poll().unwrap();

    visual.pump(10.0);
    assert_eq!(
        *visual_ticks.lock().unwrap(),
        vec![0, 1, 2, 3, 4, 5, 6, 7, 0]
    );
}

#[test]
fn visual_fires_only_when_the_audio_clock_arrives() {
    let clock = ManualClock::new(0.0);
    let store = SequenceStore::new(4).shared();
    let (feed, mut visual) = VisualScheduler::with_feed(16);

    let mut scheduler = BeatScheduler::new(120.0, clock.clone()).unwrap();
    scheduler.set_handler(Player::new(store).visual(feed));
    scheduler.start().unwrap();

    // Tick 1 (0.5s) is scheduled at 0.45 but must not show until 0.5
    clock.set(0.45);
    scheduler.poll().unwrap();
    assert_eq!(visual.pump(0.0), Some(0));
    assert_eq!(visual.pump(0.45), None);
    assert_eq!(visual.pump(0.4999), None);
    assert_eq!(visual.pump(0.5), Some(1));
}
