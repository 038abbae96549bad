//! Game engine: the outer loop around one game
//!
//! ```text
//! Idle --press--> Countdown --> Active --game over--> GameOver --> Idle
//! ```
//!
//! Each active tick polls one event batch, hands it to the game together
//! with the scaled wall-clock delta, plays the cues the game asked for,
//! repaints changed scores and commits the frame diff.

use crate::consts::{MAX_PHYSICAL, SIDE_COLUMN};
use crate::highscores::HighScores;
use crate::platform::{ButtonEvent, Clock, DevicePort, SystemClock};
use crate::renderer::{FrameDiff, ScoreDisplay};
use crate::settings::Settings;
use crate::sim::{Cue, Game, ScoreLayout, StepInput, StepOutcome};

/// Countdown glyphs are red, warming towards amber on each step
const GLYPH_RED: u8 = 2;

/// Where the engine is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Countdown,
    Active,
    GameOver,
}

/// How a round went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub scores: Vec<u32>,
    pub ticks: u64,
    /// False when the device went away mid-round
    pub finished: bool,
}

pub struct Engine<D: DevicePort, C: Clock = SystemClock> {
    device: D,
    clock: C,
    game: Box<dyn Game>,
    settings: Settings,
    layout: ScoreLayout,
    frame: FrameDiff,
    display: ScoreDisplay,
    scores: Vec<u32>,
    high_scores: HighScores,
    phase: Phase,
}

impl<D: DevicePort> Engine<D> {
    /// Engine on the system clock. Fails if the game wants an unsupported
    /// score layout.
    pub fn new(device: D, game: Box<dyn Game>, settings: Settings) -> anyhow::Result<Self> {
        Self::with_clock(device, SystemClock, game, settings)
    }
}

impl<D: DevicePort, C: Clock> Engine<D, C> {
    pub fn with_clock(
        device: D,
        clock: C,
        game: Box<dyn Game>,
        settings: Settings,
    ) -> anyhow::Result<Self> {
        let layout = game.layout();
        let display = ScoreDisplay::new(layout.players)?;
        Ok(Self {
            device,
            clock,
            game,
            settings,
            layout,
            frame: FrameDiff::new(),
            display,
            scores: vec![0; layout.players],
            high_scores: HighScores::new(layout.players, layout.high_score),
            phase: Phase::Idle,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Serve rounds until the device disconnects
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.device.flush_buttons()?;
        log::info!("{}: press any button to start", self.game.title());
        while self.device.is_connected() {
            if self.wait_for_start()? {
                self.play_round()?;
                if self.device.is_connected() {
                    log::info!("Press any button to start");
                }
            }
        }
        Ok(())
    }

    /// One idle poll. True when the batch opens with a press.
    fn wait_for_start(&mut self) -> anyhow::Result<bool> {
        let events = self.device.poll_events()?;
        Ok(events.first().is_some_and(ButtonEvent::is_press))
    }

    /// Reset, count down and play until game over or disconnect
    pub fn play_round(&mut self) -> anyhow::Result<RoundSummary> {
        self.phase = Phase::Countdown;
        self.scores.fill(0);
        self.frame.forget();
        self.device.flush_buttons()?;
        self.game.reset();
        self.countdown()?;

        self.phase = Phase::Active;
        self.paint_scores(true)?;

        let mut ticks = 0;
        let mut finished = false;
        let mut last = self.clock.now();
        while self.device.is_connected() {
            let events = self.device.poll_events()?;
            let now = self.clock.now();
            let elapsed = now.saturating_duration_since(last) / self.settings.time_scale();
            last = now;

            let outcome = {
                let input = StepInput::new(&events, elapsed, &self.scores);
                self.game.step(&input, self.frame.next_mut())
            };
            ticks += 1;

            let wiped = self.play_cues(&outcome.cues)?;
            self.apply_scores(&outcome, wiped)?;
            self.frame.commit(&mut self.device)?;
            if !outcome.cues.is_empty() {
                // Animation time is not game time
                last = self.clock.now();
            }

            if outcome.game_over {
                finished = true;
                break;
            }
        }

        if finished {
            self.game_over()?;
        }
        self.phase = Phase::Idle;
        Ok(RoundSummary {
            scores: self.scores.clone(),
            ticks,
            finished,
        })
    }

    fn countdown(&mut self) -> anyhow::Result<()> {
        if !self.settings.skip_countdown && !log::log_enabled!(log::Level::Debug) {
            let steps = self.settings.countdown_steps;
            for i in 0..steps {
                let remaining = steps - i;
                log::info!("Game starting in {remaining}");
                let glyph = char::from_digit(u32::from(remaining), 10).unwrap_or('*');
                self.device.draw_glyph(glyph, GLYPH_RED, i.min(3))?;
                self.clock.sleep(self.settings.countdown_step());
            }
        }
        self.device.set_all(0)
    }

    fn game_over(&mut self) -> anyhow::Result<()> {
        self.phase = Phase::GameOver;
        log::info!("Game over! Scores: {:?}", self.scores);
        if self.high_scores.is_enabled() {
            log::info!("High scores: {:?}", self.high_scores.best());
        }
        self.device.set_all(self.settings.game_over_intensity)
    }

    fn paint_scores(&mut self, with_high_scores: bool) -> anyhow::Result<()> {
        self.display
            .paint_score(&mut self.device, &self.scores, self.layout.cumulative)?;
        if with_high_scores && self.high_scores.is_enabled() {
            self.display
                .paint_high_score(&mut self.device, self.high_scores.best())?;
        }
        Ok(())
    }

    fn apply_scores(&mut self, outcome: &StepOutcome, repaint: bool) -> anyhow::Result<()> {
        for (player, score) in self.scores.iter_mut().enumerate() {
            let delta = outcome.score_deltas[player];
            if delta == 0 {
                continue;
            }
            *score += delta;
            if self.high_scores.record(player, *score) {
                log::debug!("New high score for player {player}: {score}");
            }
        }
        if repaint || outcome.scored() {
            self.paint_scores(false)?;
        }
        Ok(())
    }

    /// Render cues. Returns true if the board was wiped.
    fn play_cues(&mut self, cues: &[Cue]) -> anyhow::Result<bool> {
        let mut wiped = false;
        for cue in cues {
            match *cue {
                Cue::PointScored { x, y } => {
                    self.sweep(x, y)?;
                    self.device.set_all(0)?;
                    // This tick's marks survive and are drawn onto the blank board
                    self.frame.forget_committed();
                    wiped = true;
                }
                Cue::LevelUp { level } => {
                    let row = (MAX_PHYSICAL as u32 + 1).checked_sub(level);
                    if let Some(row) = row.filter(|row| (1..=MAX_PHYSICAL as u32).contains(row)) {
                        let intensity = level.min(3) as u8;
                        self.device
                            .set_cell(SIDE_COLUMN, row as u8, intensity, intensity)?;
                    }
                }
                Cue::RowsCleared { rows } => {
                    self.clock.sleep(self.settings.line_clear_pause() * rows);
                }
            }
        }
        Ok(wiped)
    }

    /// Two-column trail running away from where the ball left the board.
    /// The exit coordinates are used as physical ones, score row included.
    fn sweep(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        let direction = if y > 4 { -1 } else { 1 };
        for i in 0..i32::from(self.settings.point_animation_frames) {
            let head = y + i * direction;
            let red = (i % 4) as u8;
            let green = ((i + 1) % 4) as u8;
            for column in x..x + 2 {
                self.set_physical(column, head, 0, 0)?;
                for trail in 1..=3 {
                    self.set_physical(column, head - trail * direction, red, green)?;
                }
            }
            self.clock.sleep(self.settings.point_animation_frame());
        }
        Ok(())
    }

    fn set_physical(&mut self, x: i32, y: i32, red: u8, green: u8) -> anyhow::Result<()> {
        let range = 0..=i32::from(MAX_PHYSICAL);
        if range.contains(&x) && range.contains(&y) {
            self.device.set_cell(x as u8, y as u8, red, green)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::platform::testing::{DeviceCall, ManualClock, RecordingDevice};
    use crate::renderer::{Color, FrameSet};

    #[derive(Debug, Default)]
    struct GameLog {
        resets: usize,
        elapsed: Vec<Duration>,
        seen_scores: Vec<Vec<u32>>,
    }

    /// Plays back a fixed list of outcomes, then reports game over
    struct ScriptedGame {
        layout: ScoreLayout,
        script: Vec<StepOutcome>,
        pending: VecDeque<StepOutcome>,
        log: Rc<RefCell<GameLog>>,
    }

    impl ScriptedGame {
        fn boxed(layout: ScoreLayout, script: Vec<StepOutcome>) -> (Box<dyn Game>, Rc<RefCell<GameLog>>) {
            let log = Rc::new(RefCell::new(GameLog::default()));
            let game = Self {
                layout,
                script,
                pending: VecDeque::new(),
                log: Rc::clone(&log),
            };
            (Box::new(game), log)
        }
    }

    impl Game for ScriptedGame {
        fn title(&self) -> &'static str {
            "Scripted"
        }

        fn layout(&self) -> ScoreLayout {
            self.layout
        }

        fn reset(&mut self) {
            self.pending = self.script.iter().cloned().collect();
            self.log.borrow_mut().resets += 1;
        }

        fn step(&mut self, input: &StepInput<'_>, frame: &mut FrameSet) -> StepOutcome {
            let mut log = self.log.borrow_mut();
            // One red cell per tick, walking along row 2
            frame.mark(log.elapsed.len() as i32, 2, Color::RED);
            log.elapsed.push(input.elapsed);
            log.seen_scores.push(input.scores.to_vec());
            self.pending.pop_front().unwrap_or_else(StepOutcome::game_over)
        }
    }

    fn quick_settings() -> Settings {
        Settings {
            skip_countdown: true,
            ..Settings::default()
        }
    }

    fn scoring(player: usize, amount: u32) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        outcome.add_score(player, amount);
        outcome
    }

    fn with_cue(cue: Cue) -> StepOutcome {
        StepOutcome {
            cues: vec![cue],
            ..StepOutcome::default()
        }
    }

    fn engine(
        script: Vec<StepOutcome>,
        layout: ScoreLayout,
        settings: Settings,
    ) -> (Engine<RecordingDevice, ManualClock>, Rc<RefCell<GameLog>>) {
        let (game, log) = ScriptedGame::boxed(layout, script);
        let clock = ManualClock::stepping(Duration::from_millis(40));
        let engine = Engine::with_clock(RecordingDevice::new(), clock, game, settings).unwrap();
        (engine, log)
    }

    #[test]
    fn test_rejects_unsupported_player_count() {
        let layout = ScoreLayout {
            players: 3,
            high_score: false,
            cumulative: false,
        };
        let (game, _) = ScriptedGame::boxed(layout, Vec::new());
        assert!(Engine::new(RecordingDevice::new(), game, quick_settings()).is_err());
    }

    #[test]
    fn test_countdown_shows_digits_and_sleeps() {
        let (mut engine, log) = engine(Vec::new(), ScoreLayout::single_player(), Settings::default());
        engine.play_round().unwrap();

        let glyphs: Vec<(char, u8, u8)> = engine
            .device()
            .calls
            .iter()
            .filter_map(|call| match *call {
                DeviceCall::Glyph { glyph, red, green } => Some((glyph, red, green)),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs, vec![('3', 2, 0), ('2', 2, 1), ('1', 2, 2)]);
        assert_eq!(engine.clock().slept, Duration::from_secs(3));
        assert_eq!(log.borrow().resets, 1);
    }

    #[test]
    fn test_skipped_countdown_still_blanks_the_board() {
        let (mut engine, _) = engine(Vec::new(), ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();
        let calls = &engine.device().calls;
        assert!(!calls.iter().any(|c| matches!(c, DeviceCall::Glyph { .. })));
        assert_eq!(calls[..2], [DeviceCall::Flush, DeviceCall::Fill(0)]);
        assert_eq!(engine.clock().slept, Duration::ZERO);
    }

    #[test]
    fn test_elapsed_is_scaled_wall_clock() {
        let script = vec![StepOutcome::default(), StepOutcome::default()];
        let (mut engine, log) = engine(script, ScoreLayout::single_player(), quick_settings());
        let summary = engine.play_round().unwrap();

        assert_eq!(summary.ticks, 3);
        assert!(summary.finished);
        // 40 ms per clock reading, divided by 4
        assert!(log.borrow().elapsed.iter().all(|&e| e == Duration::from_millis(10)));
    }

    #[test]
    fn test_frame_is_committed_below_the_score_row() {
        let (mut engine, _) = engine(Vec::new(), ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();
        assert!(engine.device().cell_writes().contains(&(0, 3, 3, 0)));
    }

    #[test]
    fn test_every_round_flushes_stale_presses() {
        let (mut engine, _) = engine(Vec::new(), ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();
        engine.play_round().unwrap();
        let flushes = engine
            .device()
            .calls
            .iter()
            .filter(|&&c| c == DeviceCall::Flush)
            .count();
        assert_eq!(flushes, 2);
    }

    #[test]
    fn test_game_over_flashes_and_returns_to_idle() {
        let (mut engine, _) = engine(Vec::new(), ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();
        assert_eq!(engine.device().calls.last(), Some(&DeviceCall::Fill(3)));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_scores_accumulate_and_games_see_them() {
        let script = vec![scoring(0, 1), scoring(0, 2), StepOutcome::default()];
        let (mut engine, log) = engine(script, ScoreLayout::single_player(), quick_settings());
        let summary = engine.play_round().unwrap();

        assert_eq!(summary.scores, vec![3]);
        assert_eq!(log.borrow().seen_scores[2], vec![3]);
        // Score 3 lights the ones segment at column 2 of the score row
        assert!(engine.device().cell_writes().contains(&(2, 0, 3, 3)));
    }

    #[test]
    fn test_high_score_survives_the_next_round() {
        let (mut engine, _) = engine(vec![scoring(0, 5)], ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();
        assert_eq!(engine.high_scores().top_score(0), 5);

        engine.device_mut().clear();
        engine.play_round().unwrap();
        assert_eq!(engine.scores(), &[5]);
        assert_eq!(engine.high_scores().top_score(0), 5);
        // Shown in green at round start
        assert!(engine.device().cell_writes().contains(&(4, 0, 0, 3)));
    }

    #[test]
    fn test_second_player_scores_on_the_side_column() {
        let layout = ScoreLayout {
            players: 2,
            high_score: false,
            cumulative: true,
        };
        let (mut engine, _) = engine(vec![scoring(1, 1)], layout, quick_settings());
        engine.play_round().unwrap();
        assert!(engine.device().cell_writes().contains(&(8, 8, 3, 3)));
        assert!(engine.high_scores().best().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_level_up_lights_the_side_column() {
        let script = vec![
            with_cue(Cue::LevelUp { level: 2 }),
            with_cue(Cue::LevelUp { level: 5 }),
            with_cue(Cue::LevelUp { level: 12 }),
        ];
        let (mut engine, _) = engine(script, ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();

        let side: Vec<_> = engine
            .device()
            .cell_writes()
            .into_iter()
            .filter(|&(x, ..)| x == SIDE_COLUMN)
            .collect();
        assert_eq!(side, vec![(8, 7, 2, 2), (8, 4, 3, 3)]);
    }

    #[test]
    fn test_rows_cleared_pauses() {
        let script = vec![with_cue(Cue::RowsCleared { rows: 2 })];
        let (mut engine, log) = engine(script, ScoreLayout::single_player(), quick_settings());
        engine.play_round().unwrap();

        assert_eq!(engine.clock().slept, Duration::from_millis(1000));
        // The pause is not passed on as game time
        assert!(log.borrow().elapsed.iter().all(|&e| e == Duration::from_millis(10)));
    }

    #[test]
    fn test_point_sweep_wipes_and_repaints() {
        let mut point = with_cue(Cue::PointScored { x: 3, y: 8 });
        point.add_score(0, 1);
        let layout = ScoreLayout {
            players: 2,
            high_score: false,
            cumulative: true,
        };
        let (mut engine, _) = engine(vec![point], layout, quick_settings());
        engine.play_round().unwrap();

        let calls = &engine.device().calls;
        let wipe = calls
            .iter()
            .rposition(|c| *c == DeviceCall::Fill(0))
            .unwrap();
        // The sweep climbs from the exit row in columns 3 and 4, up to the score row
        assert!(calls[..wipe].contains(&DeviceCall::Set { x: 3, y: 8, red: 1, green: 2 }));
        assert!(calls[..wipe].contains(&DeviceCall::Set { x: 4, y: 8, red: 1, green: 2 }));
        assert!(calls[..wipe].contains(&DeviceCall::Set { x: 3, y: 0, red: 0, green: 0 }));
        assert!(calls[..wipe].contains(&DeviceCall::Set { x: 3, y: 1, red: 0, green: 1 }));
        let after = &calls[wipe..];
        // Score repainted after the wipe
        assert!(after.contains(&DeviceCall::Set { x: 0, y: 0, red: 3, green: 3 }));
        // The scoring tick's own frame is drawn onto the blank board
        assert!(after.contains(&DeviceCall::Set { x: 0, y: 3, red: 3, green: 0 }));
        assert_eq!(engine.clock().slept, Duration::from_millis(80 * 14));
    }

    #[test]
    fn test_disconnect_ends_round_unfinished() {
        let script = vec![StepOutcome::default(); 10];
        let (game, _) = ScriptedGame::boxed(ScoreLayout::single_player(), script);
        let device = RecordingDevice::scripted(vec![Vec::new(); 2]);
        let clock = ManualClock::stepping(Duration::from_millis(40));
        let mut engine = Engine::with_clock(device, clock, game, quick_settings()).unwrap();

        let summary = engine.play_round().unwrap();
        assert!(!summary.finished);
        assert_eq!(summary.ticks, 3);
        assert_ne!(engine.device().calls.last(), Some(&DeviceCall::Fill(3)));
    }

    #[test]
    fn test_run_waits_for_a_press() {
        let (game, log) = ScriptedGame::boxed(ScoreLayout::single_player(), Vec::new());
        let device = RecordingDevice::scripted(vec![
            Vec::new(),
            vec![ButtonEvent::release(5), ButtonEvent::press(6)],
            vec![ButtonEvent::press(6)],
            Vec::new(),
        ]);
        let clock = ManualClock::stepping(Duration::from_millis(40));
        let mut engine = Engine::with_clock(device, clock, game, quick_settings()).unwrap();

        engine.run().unwrap();
        assert_eq!(log.borrow().resets, 1);
        assert_eq!(engine.device().calls.first(), Some(&DeviceCall::Flush));
        assert!(!engine.device().is_connected());
    }
}
