//! [`DirectionalScanner`] – four-heading visual sweep for a named object.
//!
//! The camera is fixed to the chassis, so "look right" means "rotate the
//! chassis a quarter turn".  The sweep visits FRONT, RIGHT, BACK, LEFT in
//! that order; at each heading it polls the detector a bounded number of
//! times, stops on the first non-empty frame, and checks that frame for
//! the target.  A miss rotates to the next heading, so a full miss sweep
//! leaves the robot facing the way it started.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};
use trundle_hal::{MotorCommand, Vision};
use trundle_middleware::NoticeBus;
use trundle_types::{Notice, ScanHeading, TrundleError};

use crate::motion::Drivetrain;

const SOURCE: &str = "trundle-runtime::scanner";

/// Empty detector frames tolerated per heading before giving up on it.
const DETECT_POLL_LIMIT: usize = 5;
/// Clockwise quarter turn between headings.
const QUARTER_TURN: Duration = Duration::from_millis(300);
/// Camera settle time after arriving at a heading.
const HEADING_SETTLE: Duration = Duration::from_millis(200);
/// Pause between detector polls at the same heading.
const POLL_PACING: Duration = Duration::from_millis(200);

/// Rotating sweep that answers "is `target` visible from here?".
pub struct DirectionalScanner {
    drivetrain: Drivetrain,
    vision: Arc<dyn Vision>,
    bus: NoticeBus,
}

impl DirectionalScanner {
    pub fn new(drivetrain: Drivetrain, vision: Arc<dyn Vision>, bus: NoticeBus) -> Self {
        Self {
            drivetrain,
            vision,
            bus,
        }
    }

    /// Sweep all four headings looking for `target` (matched
    /// case-insensitively against detected labels).
    ///
    /// Returns `Ok(true)` as soon as the target shows up in a frame,
    /// leaving the chassis at that heading.  Returns `Ok(false)` after a
    /// full sweep, back at the starting heading.
    pub async fn scan_for(&self, target: &str) -> Result<bool, TrundleError> {
        self.bus.publish(
            SOURCE,
            Notice::Searching {
                target: target.to_string(),
            },
        );

        for heading in ScanHeading::SWEEP {
            sleep(HEADING_SETTLE).await;
            if self.look_for(target, heading).await? {
                info!(%heading, target, "target sighted");
                self.bus.publish(
                    SOURCE,
                    Notice::TargetFound {
                        name: target.to_string(),
                    },
                );
                return Ok(true);
            }
            // Rotate to the next heading; after LEFT this completes the
            // circle back to the starting orientation.
            self.drivetrain
                .pulse(MotorCommand::TurnRight, QUARTER_TURN)
                .await;
        }
        Ok(false)
    }

    /// Poll the detector at one heading until a frame has content or the
    /// poll budget runs out, then report whether `target` is in it.
    async fn look_for(&self, target: &str, heading: ScanHeading) -> Result<bool, TrundleError> {
        for attempt in 0..DETECT_POLL_LIMIT {
            let frame = self.vision.detect().await?;
            if frame.is_empty() {
                debug!(%heading, attempt, "empty frame");
                sleep(POLL_PACING).await;
                continue;
            }
            let names: Vec<String> = frame.iter().map(|o| o.name.clone()).collect();
            debug!(%heading, objects = ?names, "frame contents");
            self.bus.publish(
                SOURCE,
                Notice::ObjectsSeen {
                    heading,
                    names: names.clone(),
                },
            );
            // One real frame per heading is enough; judge it and move on.
            return Ok(frame.iter().any(|o| o.matches(target)));
        }
        debug!(%heading, "nothing visible within the poll budget");
        Ok(false)
    }
}
