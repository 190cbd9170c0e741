use crate::round::{self, Round};
use crate::score;
use crate::session::{ConfigError, SessionConfig, SessionContext};
use crate::timer::{TimerHandle, TimerId, TimerSpawner};
use crate::trial::{ActiveTrial, Response, Trial, TrialOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Top-level phase of a running session. `Hit` and `FalseAlarm` are
/// presentation tag states for feedback coloring; behaviorally they are
/// round play waiting for the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    StartingRound,
    WaitingForResponse,
    Hit,
    FalseAlarm,
    GameOver,
}

impl Phase {
    /// Phases in which a stimulus is on display and the response-window
    /// timer is running.
    pub fn in_round(&self) -> bool {
        matches!(
            self,
            Phase::WaitingForResponse | Phase::Hit | Phase::FalseAlarm
        )
    }
}

/// Events consumed by the controller. `Tick` is timer-sourced and carries
/// the emitting timer's id; external callers send the other variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Start,
    Response(Response),
    Tick(TimerId),
    Restart,
    ToggleVoice,
}

/// Read-only view handed to the presentation layer on every change.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub context: &'a SessionContext,
    pub config: &'a SessionConfig,
}

/// The session state machine. Owns the context, the live timer handle, the
/// timer spawner and the RNG; processes one event to completion at a time.
/// Events that are not legal in the current phase are silently dropped, as
/// are ticks from a timer that has since been cancelled.
pub struct SessionController<S> {
    config: SessionConfig,
    context: SessionContext,
    phase: Phase,
    timer: Option<TimerHandle>,
    timers: S,
    active: Option<ActiveTrial>,
    rng: StdRng,
}

impl<S: TimerSpawner> SessionController<S> {
    pub fn new(config: SessionConfig, timers: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, timers, StdRng::from_entropy())
    }

    /// Construction with an explicit RNG so round generation is
    /// reproducible under test with a fixed seed.
    pub fn with_rng(config: SessionConfig, timers: S, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let context = SessionContext::new(&config);
        Ok(Self {
            config,
            context,
            phase: Phase::Idle,
            timer: None,
            timers,
            active: None,
            rng,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn timers(&self) -> &S {
        &self.timers
    }

    /// Handle of the timer owned by the current phase, if any.
    pub fn active_timer(&self) -> Option<&TimerHandle> {
        self.timer.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            context: &self.context,
            config: &self.config,
        }
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            // A pure context mutation with no round-state interaction;
            // legal in every phase.
            Event::ToggleVoice => {
                self.context.voice_enabled = !self.context.voice_enabled;
            }
            Event::Start if self.phase == Phase::Idle => self.start(),
            Event::Restart if self.phase == Phase::GameOver => self.restart(),
            Event::Response(response) if self.phase == Phase::WaitingForResponse => {
                self.on_response(response)
            }
            Event::Tick(id) if self.expects(id) => self.on_tick(),
            _ => {}
        }
    }

    fn expects(&self, id: TimerId) -> bool {
        self.timer.as_ref().map(|t| t.id()) == Some(id)
    }

    /// Cancel the previous phase's timer before owning a new one.
    fn set_timer(&mut self, handle: TimerHandle) {
        self.cancel_timer();
        self.timer = Some(handle);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn start(&mut self) {
        if self.config.countdown_secs == 0 {
            self.enter_starting_round();
            return;
        }
        self.context.countdown = self.config.countdown_secs;
        self.phase = Phase::Countdown;
        let handle = self.timers.repeating(COUNTDOWN_INTERVAL);
        self.set_timer(handle);
    }

    fn restart(&mut self) {
        self.cancel_timer();
        self.active = None;
        self.context.reset(&self.config);
        self.phase = Phase::Idle;
    }

    fn on_tick(&mut self) {
        match self.phase {
            Phase::Countdown => {
                self.context.countdown = self.context.countdown.saturating_sub(1);
                if self.context.countdown == 0 {
                    self.context.countdown = self.config.countdown_secs;
                    self.enter_starting_round();
                }
            }
            Phase::StartingRound => self.enter_playing_round(),
            Phase::WaitingForResponse | Phase::Hit | Phase::FalseAlarm => self.advance_trial(),
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Generate and record the next round, then wait out the pre-round
    /// delay so the subject can take in the origin square.
    fn enter_starting_round(&mut self) {
        let origin = round::choose_origin(self.config.piece, self.config.trials_per_round, &mut self.rng);
        let round = match Round::new(
            self.config.piece,
            origin,
            self.config.trials_per_round,
            &mut self.rng,
        ) {
            Ok(round) => round,
            // Unreachable for configs accepted by validate(); bail out
            // rather than looping on a bad origin.
            Err(_) => {
                self.cancel_timer();
                self.phase = Phase::Idle;
                return;
            }
        };

        self.context.round_number += 1;
        self.context.rounds.insert(self.context.round_number, round);
        self.context.trials_remaining = self.config.trials_per_round;
        self.context.current_square = None;
        self.active = None;
        self.phase = Phase::StartingRound;
        let handle = self.timers.one_shot(self.config.round_delay);
        self.set_timer(handle);
    }

    fn enter_playing_round(&mut self) {
        self.present_next();
        let handle = self.timers.repeating(self.config.response_window);
        self.set_timer(handle);
    }

    /// Put the next unused stimulus of the current round on display.
    fn present_next(&mut self) {
        if let Some(round) = self.context.rounds.get(&self.context.round_number) {
            let index = round.sequence.len() - self.context.trials_remaining;
            if let Some(&square) = round.sequence.get(index) {
                let is_target = round.is_target(square);
                self.active = Some(ActiveTrial::new(square, is_target));
                self.context.current_square = Some(square);
                self.phase = Phase::WaitingForResponse;
            }
        }
    }

    /// An explicit response inside the open window: classify immediately
    /// and show feedback until the next tick.
    fn on_response(&mut self, response: Response) {
        if let Some(mut active) = self.active.take() {
            active.respond(response);
            let trial = active.finish();
            self.phase = match trial.outcome {
                TrialOutcome::Hit => Phase::Hit,
                _ => Phase::FalseAlarm,
            };
            self.record(trial);
        }
    }

    /// The response window closed. Classify the open trial with whatever
    /// response it recorded up to this tick (none at all if the subject
    /// stayed silent), then move on.
    fn advance_trial(&mut self) {
        if let Some(active) = self.active.take() {
            self.record(active.finish());
        }
        self.context.trials_remaining = self.context.trials_remaining.saturating_sub(1);
        if self.context.trials_remaining > 0 {
            self.present_next();
        } else {
            self.finish_round();
        }
    }

    fn record(&mut self, trial: Trial) {
        if trial.outcome.is_correct() {
            self.context.score += 1;
        } else {
            self.context.mistakes += 1;
        }
        if let Some(round) = self.context.rounds.get_mut(&self.context.round_number) {
            round.trials.push(trial);
        }
    }

    fn finish_round(&mut self) {
        self.cancel_timer();
        self.context.current_square = None;
        if self.context.round_number >= self.config.rounds {
            self.context.accuracy = Some(score::accuracy(self.context.rounds.values()));
            self.phase = Phase::GameOver;
        } else {
            self.enter_starting_round();
        }
    }
}
