//! Command dispatcher: one entry point per external command source.
//!
//! Each source (web operator, voice pipeline) feeds a channel of decoded
//! [`CommandMessage`]s; a [`Dispatcher`] clone pumps each channel.  Every
//! command is bracketed by an arbiter acquire/release pair, so the two
//! sources never interleave mid-command, a denied source hears who is
//! busy, and a source that was turned away hears "now available" once the
//! holder finishes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use trundle_hal::Announcer;
use trundle_kernel::{MediumArbiter, ModeSupervisor};
use trundle_middleware::{CommandMessage, ManualStep, NoticeBus};
use trundle_types::{Medium, Mode, Notice};

use crate::behavior::{self, BehaviorContext};

const SOURCE: &str = "trundle-runtime::dispatch";

/// Routes decoded commands into mode switches and manual steps.
#[derive(Clone)]
pub struct Dispatcher {
    arbiter: Arc<MediumArbiter>,
    supervisor: Arc<ModeSupervisor>,
    ctx: BehaviorContext,
    steps_tx: mpsc::Sender<ManualStep>,
}

impl Dispatcher {
    pub fn new(
        arbiter: Arc<MediumArbiter>,
        supervisor: Arc<ModeSupervisor>,
        ctx: BehaviorContext,
        steps_tx: mpsc::Sender<ManualStep>,
    ) -> Self {
        Self {
            arbiter,
            supervisor,
            ctx,
            steps_tx,
        }
    }

    /// Pump one command source until its channel closes or shutdown.
    pub async fn pump(
        &self,
        medium: Medium,
        mut commands: mpsc::Receiver<CommandMessage>,
        cancel: CancellationToken,
    ) {
        loop {
            let msg = tokio::select! {
                _ = cancel.cancelled() => break,
                msg = commands.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };
            self.handle(medium, msg).await;
        }
        info!(%medium, "command source closed");
    }

    /// Run one command under the arbiter bracket.
    pub async fn handle(&self, medium: Medium, msg: CommandMessage) {
        if !self.acquire_or_announce(medium).await {
            return;
        }
        self.execute(medium, msg).await;
        self.release_and_announce(medium).await;
    }

    async fn execute(&self, medium: Medium, msg: CommandMessage) {
        info!(%medium, ?msg, "command");
        match msg {
            CommandMessage::Motor(step) => {
                // Driving input implies MANUAL; switch first if needed.
                if self.supervisor.current_mode().await != Some(Mode::Manual) {
                    self.switch(Mode::Manual, None).await;
                }
                if self.steps_tx.try_send(step).is_err() {
                    warn!(%step, "manual step queue full, dropping");
                }
            }
            CommandMessage::SetMode(mode @ (Mode::Find | Mode::Follow)) => {
                // These modes need a target name; the sources send them
                // through Find/Follow instead.
                warn!(%mode, "mode change without a target, ignoring");
                self.ctx
                    .announcer
                    .say("tell me what to look for first")
                    .await;
            }
            CommandMessage::SetMode(mode) => {
                self.switch(mode, None).await;
            }
            CommandMessage::Find { target } => {
                self.switch(Mode::Find, Some(target)).await;
            }
            CommandMessage::Follow { target } => {
                self.switch(Mode::Follow, Some(target)).await;
            }
        }
    }

    async fn switch(&self, mode: Mode, target: Option<String>) {
        let ctx = self.ctx.clone();
        match (mode, target) {
            (Mode::Manual, _) => {
                self.supervisor
                    .switch_to(mode, |cancel| behavior::manual_relay(ctx, cancel))
                    .await;
            }
            (Mode::Autonomous, _) => {
                self.supervisor
                    .switch_to(mode, |cancel| behavior::explore(ctx, cancel))
                    .await;
            }
            (Mode::Find, Some(target)) => {
                self.supervisor
                    .switch_to(mode, |cancel| behavior::find_object(ctx, target, cancel))
                    .await;
            }
            (Mode::Follow, Some(target)) => {
                self.supervisor
                    .switch_to(mode, |cancel| behavior::follow_target(ctx, target, cancel))
                    .await;
            }
            (Mode::Find | Mode::Follow, None) => unreachable!("target checked in execute"),
        }
        self.ctx.bus.publish(SOURCE, Notice::ModeChanged { mode });
    }

    async fn acquire_or_announce(&self, medium: Medium) -> bool {
        if self.arbiter.acquire(medium).await {
            return true;
        }
        let holder = self.arbiter.holder().await;
        if let Some(holder) = holder {
            self.ctx
                .announcer
                .say(&format!("one moment, the {holder} control is using me"))
                .await;
            self.ctx.bus.publish(SOURCE, Notice::Busy { holder });
        }
        false
    }

    async fn release_and_announce(&self, medium: Medium) {
        if let Some(waiting) = self.arbiter.release(medium).await {
            info!(%waiting, "announcing availability to the turned-away source");
            self.ctx.announcer.say("now available").await;
            self.ctx.bus.publish(SOURCE, Notice::Available);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trundle_hal::{
        MotorCommand, RecordingAnnouncer, ScriptedRangeArray, ScriptedVision, SimMotor,
    };
    use trundle_types::DistanceSample;

    use crate::behavior::BehaviorSettings;
    use crate::manual::step_queue;

    struct Rig {
        dispatcher: Dispatcher,
        supervisor: Arc<ModeSupervisor>,
        motor: Arc<SimMotor>,
        announcer: Arc<RecordingAnnouncer>,
        bus: NoticeBus,
    }

    fn rig() -> Rig {
        let motor = Arc::new(SimMotor::new());
        let announcer = Arc::new(RecordingAnnouncer::new());
        let bus = NoticeBus::default();
        let (steps_tx, steps) = step_queue();
        let ctx = BehaviorContext {
            motor: motor.clone(),
            range: Arc::new(ScriptedRangeArray::steady(DistanceSample {
                front: 90.0,
                left: 90.0,
                right: 90.0,
                back: 90.0,
            })),
            vision: Arc::new(ScriptedVision::new()),
            announcer: announcer.clone(),
            bus: bus.clone(),
            steps,
            settings: BehaviorSettings::default(),
        };
        let supervisor = Arc::new(ModeSupervisor::new());
        let dispatcher = Dispatcher::new(
            Arc::new(MediumArbiter::new()),
            supervisor.clone(),
            ctx,
            steps_tx,
        );
        Rig {
            dispatcher,
            supervisor,
            motor,
            announcer,
            bus,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mode_command_switches_the_supervisor() {
        let rig = rig();
        let mut notices = rig.bus.subscribe();

        rig.dispatcher
            .handle(Medium::Web, CommandMessage::SetMode(Mode::Autonomous))
            .await;

        assert_eq!(rig.supervisor.current_mode().await, Some(Mode::Autonomous));
        assert_eq!(
            notices.recv().await.unwrap().payload,
            Notice::ModeChanged {
                mode: Mode::Autonomous
            }
        );
        rig.supervisor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn motor_command_implies_manual_mode() {
        let rig = rig();

        rig.dispatcher
            .handle(Medium::Web, CommandMessage::SetMode(Mode::Autonomous))
            .await;
        rig.dispatcher
            .handle(Medium::Web, CommandMessage::Motor(ManualStep::Forward))
            .await;

        assert_eq!(rig.supervisor.current_mode().await, Some(Mode::Manual));
        // Let the relay drain the queued step.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rig.motor.last(), Some(MotorCommand::Forward));
        rig.supervisor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn busy_source_is_told_who_holds_control() {
        let rig = rig();

        assert!(rig.dispatcher.acquire_or_announce(Medium::Voice).await);
        assert!(!rig.dispatcher.acquire_or_announce(Medium::Web).await);

        assert_eq!(
            rig.announcer.transcript(),
            vec!["one moment, the voice control is using me"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn release_announces_availability_to_the_turned_away_source() {
        let rig = rig();
        let mut notices = rig.bus.subscribe();

        assert!(rig.dispatcher.acquire_or_announce(Medium::Voice).await);
        assert!(!rig.dispatcher.acquire_or_announce(Medium::Web).await);
        rig.dispatcher.release_and_announce(Medium::Voice).await;

        assert_eq!(rig.announcer.transcript().last().unwrap(), "now available");
        // Busy first, then available.
        assert_eq!(
            notices.recv().await.unwrap().payload,
            Notice::Busy {
                holder: Medium::Voice
            }
        );
        assert_eq!(notices.recv().await.unwrap().payload, Notice::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn uncontested_release_stays_quiet() {
        let rig = rig();

        assert!(rig.dispatcher.acquire_or_announce(Medium::Web).await);
        rig.dispatcher.release_and_announce(Medium::Web).await;

        assert!(rig.announcer.transcript().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bare_find_mode_request_asks_for_a_target() {
        let rig = rig();

        rig.dispatcher
            .handle(Medium::Voice, CommandMessage::SetMode(Mode::Find))
            .await;

        assert_eq!(rig.supervisor.current_mode().await, None);
        assert_eq!(
            rig.announcer.transcript(),
            vec!["tell me what to look for first"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pump_stops_when_the_source_channel_closes() {
        let rig = rig();
        let (tx, rx) = trundle_middleware::command_channel();

        let dispatcher = rig.dispatcher.clone();
        let handle = tokio::spawn(async move {
            dispatcher
                .pump(Medium::Web, rx, CancellationToken::new())
                .await;
        });

        tx.send(CommandMessage::SetMode(Mode::Manual)).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(rig.supervisor.current_mode().await, Some(Mode::Manual));
        rig.supervisor.shutdown().await;
    }
}
