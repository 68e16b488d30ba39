//! Session runner - the frame clock around one match engine

use std::collections::VecDeque;

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::snapshot::{FrameSnapshot, SnapshotBuilder};
use crate::game::{FighterInput, GameEvent, MatchEngine};
use crate::util::time::{tick_duration, Timer};

use super::protocol::{HostCommand, HostMsg};

/// Owns the engine and exchanges commands and frames with the transport
pub struct SessionRunner {
    id: Uuid,
    engine: MatchEngine,
    command_rx: mpsc::Receiver<HostCommand>,
    output_tx: mpsc::Sender<HostMsg>,
    snapshot_builder: SnapshotBuilder,
    /// Latched held input per player
    inputs: [FighterInput; 2],
    /// Command replies waiting for room on the output channel
    replies: VecDeque<HostMsg>,
}

impl SessionRunner {
    pub fn new(
        engine: MatchEngine,
        command_rx: mpsc::Receiver<HostCommand>,
        output_tx: mpsc::Sender<HostMsg>,
        snapshot_interval: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine,
            command_rx,
            output_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            inputs: Default::default(),
            replies: VecDeque::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Run the frame loop until quit, disconnect, or the output closes
    pub async fn run(mut self) {
        let fps = self.engine.config().fps;
        let dt = self.engine.config().tick_delta();
        let frame_budget = tick_duration(fps);
        info!(session_id = %self.id, fps, "Session started");

        let mut frame_clock = interval(frame_budget);
        frame_clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            frame_clock.tick().await;
            let timer = Timer::new();

            if !self.process_commands() {
                info!(session_id = %self.id, "Command stream ended");
                break;
            }
            if !self.tick(dt) {
                info!(session_id = %self.id, "Output closed");
                break;
            }

            let elapsed = timer.elapsed();
            if elapsed > frame_budget {
                warn!(
                    session_id = %self.id,
                    tick = self.engine.state().tick,
                    elapsed_us = timer.elapsed_micros(),
                    "Frame overran its budget"
                );
            }
        }

        info!(session_id = %self.id, tick = self.engine.state().tick, "Session ended");
    }

    /// Drain pending commands, returns false when the session should stop
    pub fn process_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(HostCommand::Quit) => return false,
                Ok(command) => self.apply(command),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply(&mut self, command: HostCommand) {
        let phase_before = self.engine.phase();

        let result = match command {
            HostCommand::Input { player, input } => {
                self.inputs[player.index()] = input;
                return;
            }
            HostCommand::StartMatch => self.engine.start_match(),
            HostCommand::OpenOptions => self.engine.open_options(),
            HostCommand::OpenCharacterSelect => self.engine.open_character_select(),
            HostCommand::SelectFighter { player, fighter } => {
                self.engine.select_fighter(player, &fighter)
            }
            HostCommand::ConfirmSelection => self.engine.confirm_selection(),
            HostCommand::SetMetrics { fighter, metrics } => {
                self.engine.set_metrics(&fighter, metrics)
            }
            HostCommand::Pause => self.engine.pause(),
            HostCommand::Resume => self.engine.resume(),
            HostCommand::RestartRound => self.engine.restart_round(),
            HostCommand::BackToMenu => self.engine.back_to_menu(),
            HostCommand::Quit => Ok(()),
        };

        match result {
            Ok(()) => {
                let phase = self.engine.phase();
                if phase != phase_before {
                    // Held buttons from the previous phase must not leak across
                    self.inputs = Default::default();
                    self.snapshot_builder.force_next();
                    debug!(session_id = %self.id, from = %phase_before, to = %phase, "Command changed phase");
                }
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Rejected command");
                self.reply(HostMsg::from(&e));
            }
        }
    }

    /// Step the engine once and emit a frame when due
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.flush_replies() {
            return false;
        }

        let events = self.engine.step(&self.inputs, dt);
        if events.iter().any(is_milestone) {
            self.snapshot_builder.force_next();
        }

        if self.snapshot_builder.should_send() {
            let frame = self.snapshot_builder.build(self.engine.state(), events);
            self.send_frame(frame)
        } else {
            self.snapshot_builder.buffer(events);
            true
        }
    }

    /// Queue a frame without blocking the frame loop
    ///
    /// A frame that does not fit hands its events back to the builder so
    /// they ride in the next frame.
    fn send_frame(&mut self, frame: FrameSnapshot) -> bool {
        match self.output_tx.try_send(HostMsg::Frame(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(msg)) => {
                if let HostMsg::Frame(frame) = msg {
                    self.snapshot_builder.buffer(frame.events);
                }
                self.snapshot_builder.force_next();
                warn!(session_id = %self.id, "Output backlog full, deferring frame");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    fn reply(&mut self, msg: HostMsg) {
        self.replies.push_back(msg);
        self.flush_replies();
    }

    /// Send held command replies in order, returns false once the output is closed
    fn flush_replies(&mut self) -> bool {
        while let Some(msg) = self.replies.pop_front() {
            match self.output_tx.try_send(msg) {
                Ok(()) => {}
                Err(TrySendError::Full(msg)) => {
                    self.replies.push_front(msg);
                    debug!(session_id = %self.id, held = self.replies.len(), "Output backlog full, holding replies");
                    return true;
                }
                Err(TrySendError::Closed(_)) => return false,
            }
        }
        true
    }
}

fn is_milestone(event: &GameEvent) -> bool {
    matches!(
        event,
        GameEvent::RoundStarted { .. }
            | GameEvent::RoundEnded { .. }
            | GameEvent::MatchEnded { .. }
            | GameEvent::Paused
            | GameEvent::Resumed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::GameConfig;
    use crate::game::{AttackId, MatchPhase, PlayerSlot, SessionContext};

    const DT: f32 = 1.0 / 60.0;

    type Harness = (
        SessionRunner,
        mpsc::Sender<HostCommand>,
        mpsc::Receiver<HostMsg>,
    );

    fn runner(snapshot_interval: u32) -> Harness {
        runner_with_capacity(snapshot_interval, 16)
    }

    fn runner_with_capacity(snapshot_interval: u32, capacity: usize) -> Harness {
        let engine = MatchEngine::new(Arc::new(GameConfig::default()), SessionContext::default());
        let (command_tx, command_rx) = mpsc::channel(16);
        let (output_tx, output_rx) = mpsc::channel(capacity);
        (
            SessionRunner::new(engine, command_rx, output_tx, snapshot_interval),
            command_tx,
            output_rx,
        )
    }

    #[test]
    fn commands_drive_the_engine() {
        let (mut runner, tx, _rx) = runner(1);
        tx.try_send(HostCommand::OpenCharacterSelect).unwrap();
        tx.try_send(HostCommand::SelectFighter {
            player: PlayerSlot::Two,
            fighter: "samurai_commander".to_string(),
        })
        .unwrap();
        tx.try_send(HostCommand::ConfirmSelection).unwrap();

        assert!(runner.process_commands());
        assert_eq!(runner.engine().phase(), MatchPhase::Playing);
        let p2 = runner.engine().state().fighter(PlayerSlot::Two).unwrap();
        assert_eq!(p2.profile_id, "samurai_commander");
    }

    #[test]
    fn inputs_are_latched_and_cleared_on_pause() {
        let (mut runner, tx, _rx) = runner(1);
        tx.try_send(HostCommand::StartMatch).unwrap();
        tx.try_send(HostCommand::Input {
            player: PlayerSlot::One,
            input: FighterInput {
                move_right: true,
                attacks: vec![AttackId::Punch],
                ..Default::default()
            },
        })
        .unwrap();
        runner.process_commands();

        assert!(runner.inputs[0].move_right);
        runner.tick(DT);
        runner.tick(DT);
        let p1 = runner.engine().state().fighter(PlayerSlot::One).unwrap();
        assert!(p1.x > 400.0);

        tx.try_send(HostCommand::Pause).unwrap();
        runner.process_commands();
        assert_eq!(runner.inputs[0], FighterInput::default());
    }

    #[test]
    fn rejected_command_reports_an_error() {
        let (mut runner, tx, mut rx) = runner(1);
        tx.try_send(HostCommand::Pause).unwrap();
        tx.try_send(HostCommand::SetMetrics {
            fighter: "nobody".to_string(),
            metrics: Default::default(),
        })
        .unwrap();

        assert!(runner.process_commands());
        assert_eq!(runner.engine().phase(), MatchPhase::Menu);

        let codes: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|msg| match msg {
                HostMsg::Error { code, .. } => Some(code),
                HostMsg::Frame(_) => None,
            })
            .collect();
        assert_eq!(codes, ["invalid_transition", "unknown_fighter"]);
    }

    #[test]
    fn quit_and_disconnect_stop_the_session() {
        let (mut runner, tx, _rx) = runner(1);
        tx.try_send(HostCommand::Quit).unwrap();
        assert!(!runner.process_commands());

        let (mut runner, tx, _rx) = self::runner(1);
        drop(tx);
        assert!(!runner.process_commands());
    }

    #[test]
    fn frames_follow_the_snapshot_interval_and_keep_events() {
        let (mut runner, tx, mut rx) = runner(4);
        tx.try_send(HostCommand::StartMatch).unwrap();
        runner.process_commands();

        // Phase change forces the first frame, carrying RoundStarted
        assert!(runner.tick(DT));
        match rx.try_recv() {
            Ok(HostMsg::Frame(frame)) => {
                assert_eq!(frame.phase, MatchPhase::Playing);
                assert!(frame.events.contains(&GameEvent::RoundStarted { round: 1 }));
            }
            other => panic!("expected a frame, got {other:?}"),
        }

        for _ in 0..3 {
            runner.tick(DT);
        }
        assert!(rx.try_recv().is_err());
        runner.tick(DT);
        assert!(matches!(rx.try_recv(), Ok(HostMsg::Frame(_))));
    }

    #[test]
    fn closed_output_stops_ticking() {
        let (mut runner, _tx, rx) = runner(1);
        drop(rx);
        assert!(!runner.tick(DT));
    }

    #[test]
    fn full_output_defers_frame_events() {
        let (mut runner, tx, mut rx) = runner_with_capacity(1, 1);
        tx.try_send(HostCommand::StartMatch).unwrap();
        runner.process_commands();
        assert!(runner.tick(DT));

        tx.try_send(HostCommand::Pause).unwrap();
        runner.process_commands();
        assert!(runner.tick(DT));

        match rx.try_recv() {
            Ok(HostMsg::Frame(frame)) => assert!(!frame.events.contains(&GameEvent::Paused)),
            other => panic!("expected a frame, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());

        assert!(runner.tick(DT));
        match rx.try_recv() {
            Ok(HostMsg::Frame(frame)) => {
                assert_eq!(frame.phase, MatchPhase::Paused);
                assert_eq!(frame.events, vec![GameEvent::Paused]);
            }
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn full_output_holds_rejection_replies() {
        let (mut runner, tx, mut rx) = runner_with_capacity(1, 1);
        assert!(runner.tick(DT));

        tx.try_send(HostCommand::Pause).unwrap();
        tx.try_send(HostCommand::RestartRound).unwrap();
        runner.process_commands();
        assert!(matches!(rx.try_recv(), Ok(HostMsg::Frame(_))));

        assert!(runner.tick(DT));
        assert!(matches!(
            rx.try_recv(),
            Ok(HostMsg::Error { code, .. }) if code == "invalid_transition"
        ));
        assert!(runner.tick(DT));
        assert!(matches!(rx.try_recv(), Ok(HostMsg::Error { .. })));
        assert!(runner.replies.is_empty());
    }
}
