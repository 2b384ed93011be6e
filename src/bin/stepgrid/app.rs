//! App - wires the grid, the schedulers and the audio stream to the terminal

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result, WrapErr};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::{Consumer, RingBuffer};

use stepgrid::{
    grid::{Action, Column, SequenceStore, SharedStore},
    runtime::Player,
    sequencing::{AudioClock, BeatScheduler, SampleClock, SchedulerConfig, VisualScheduler},
    synth::{note_channel, Engine, EngineConfig},
};

use super::audio::Output;
use super::ui::{self, Cursor, View};

/// Display refresh period (~60 fps)
const FRAME: Duration = Duration::from_millis(16);

/// Oscilloscope history length
const SCOPE_SIZE: usize = 1024;

const NOTE_QUEUE: usize = 256;
const VISUAL_QUEUE: usize = 256;

/// Playhead value meaning "nothing playing"
const NO_STEP: usize = usize::MAX;

pub struct App {
    store: SharedStore,
    beats: BeatScheduler<SampleClock>,
    visual: VisualScheduler,
    playhead: Arc<AtomicUsize>,
    clock: SampleClock,
    sample_rate: f32,

    scope_rx: Consumer<f32>,
    scope: Vec<f32>,

    cursor: Cursor,
    should_quit: bool,

    // Keeps audio running for the lifetime of the app
    _stream: cpal::Stream,
}

impl App {
    pub fn new(bpm: f64, steps: usize, config: SchedulerConfig) -> Result<Self> {
        let output = Output::default_device()?;
        let sample_rate = output.sample_rate();

        let (notes_tx, notes_rx) = note_channel(NOTE_QUEUE);
        let engine = Engine::new(EngineConfig::default().sample_rate(sample_rate), notes_rx);
        let clock = engine.clock();

        let store = SequenceStore::new(steps).shared();
        let (feed, mut visual) = VisualScheduler::with_feed(VISUAL_QUEUE);

        let playhead = Arc::new(AtomicUsize::new(NO_STEP));
        let shown = playhead.clone();
        visual.set_handler(move |index| shown.store(index, Ordering::Relaxed));

        let mut beats = BeatScheduler::with_config(bpm, config, clock.clone())
            .wrap_err("invalid scheduler settings")?;
        beats.set_handler(Player::new(store.clone()).notes(notes_tx).visual(feed));

        let (scope_tx, scope_rx) = RingBuffer::new(SCOPE_SIZE * 4);
        let stream = output.play(engine, scope_tx)?;

        Ok(Self {
            store,
            beats,
            visual,
            playhead,
            clock,
            sample_rate,
            scope_rx,
            scope: vec![0.0; SCOPE_SIZE],
            cursor: Cursor::default(),
            should_quit: false,
            _stream: stream,
        })
    }

    /// Run the event loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            self.beats
                .run_due(Instant::now())
                .wrap_err("beat scheduler failed")?;
            self.visual.pump(self.clock.now());
            self.poll_scope();

            self.draw(terminal)?;

            // Wake for whichever comes first: the next frame or the next poll
            let wait = self
                .beats
                .time_until_due(Instant::now())
                .map_or(FRAME, |due| due.min(FRAME));

            if event::poll(wait)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }
        }

        self.beats.stop();
        Ok(())
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> Result<()> {
        let store = self
            .store
            .read()
            .map_err(|_| eyre!("sequence store lock poisoned"))?;

        let view = View {
            store: &store,
            cursor: self.cursor,
            playhead: match self.playhead.load(Ordering::Relaxed) {
                NO_STEP => None,
                step => Some(step),
            },
            bpm: self.beats.tempo().bpm(),
            running: self.beats.is_running(),
            tick: self.beats.tick(),
            audio_time: self.clock.now(),
            sample_rate: self.sample_rate,
            scope: &self.scope,
        };

        terminal.draw(|frame| ui::render(frame, &view))?;
        Ok(())
    }

    /// Keep the newest SCOPE_SIZE samples
    fn poll_scope(&mut self) {
        let available = self.scope_rx.slots();
        if available == 0 {
            return;
        }
        if let Ok(chunk) = self.scope_rx.read_chunk(available) {
            let (first, second) = chunk.as_slices();
            self.scope.extend_from_slice(first);
            self.scope.extend_from_slice(second);
            chunk.commit_all();
        }
        if self.scope.len() > SCOPE_SIZE {
            let excess = self.scope.len() - SCOPE_SIZE;
            self.scope.drain(..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        let len = self.store_len()?;
        let step = self.cursor.step;
        let column = self.cursor.column;

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle_playback()?,

            KeyCode::Left => self.cursor.step = (step + len - 1) % len,
            KeyCode::Right => self.cursor.step = (step + 1) % len,
            KeyCode::Up => self.cursor.column = self.cursor.previous_column(),
            KeyCode::Down => self.cursor.column = self.cursor.next_column(),

            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge(1)?,
            KeyCode::Char('-') | KeyCode::Char('_') => self.nudge(-1)?,

            KeyCode::Char('h') => self.apply(Action::ToggleHold { step })?,
            KeyCode::Char('r') => self.apply(Action::Randomize {
                seed: rand::random(),
                column: Some(column),
            })?,
            KeyCode::Char('R') => self.apply(Action::Randomize {
                seed: rand::random(),
                column: None,
            })?,
            KeyCode::Char('[') => self.apply(Action::Shift { offset: -1 })?,
            KeyCode::Char(']') => self.apply(Action::Shift { offset: 1 })?,
            KeyCode::Char(',') => self.apply(Action::Resize { len: len - 1 })?,
            KeyCode::Char('.') => self.apply(Action::Resize { len: len + 1 })?,
            KeyCode::Char('c') => self.apply(Action::Clear)?,
            _ => {}
        }

        // Resizing may have removed the step under the cursor
        let len = self.store_len()?;
        self.cursor.step = self.cursor.step.min(len - 1);
        Ok(())
    }

    fn toggle_playback(&mut self) -> Result<()> {
        if self.beats.is_running() {
            self.beats.stop();
            self.visual.clear();
            self.playhead.store(NO_STEP, Ordering::Relaxed);
        } else {
            self.beats.start().wrap_err("failed to start playback")?;
        }
        Ok(())
    }

    fn nudge(&mut self, direction: i32) -> Result<()> {
        let Cursor { step, column } = self.cursor;
        let current = {
            let store = self
                .store
                .read()
                .map_err(|_| eyre!("sequence store lock poisoned"))?;
            store.cell(step).map_or(0.0, |cell| cell.get(column))
        };

        self.apply(Action::Paint {
            step,
            column,
            value: column.nudge(current, direction),
        })
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        log::debug!("apply {action:?}");
        self.store
            .write()
            .map_err(|_| eyre!("sequence store lock poisoned"))?
            .apply(&action);
        Ok(())
    }

    fn store_len(&self) -> Result<usize> {
        let store = self
            .store
            .read()
            .map_err(|_| eyre!("sequence store lock poisoned"))?;
        Ok(store.len())
    }
}

impl Cursor {
    fn previous_column(&self) -> Column {
        let i = self.column.index();
        Column::ALL[(i + Column::COUNT - 1) % Column::COUNT]
    }

    fn next_column(&self) -> Column {
        Column::ALL[(self.column.index() + 1) % Column::COUNT]
    }
}
