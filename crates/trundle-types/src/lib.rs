use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Sentinel distance meaning a range sensor got no valid echo within its
/// timeout.  Treated as "no obstacle known" in every threshold comparison.
pub const NO_ECHO: f32 = -1.0;

/// One reading from the four fixed ultrasonic sensors, in centimeters.
///
/// Produced fresh on every poll and discarded after the control iteration
/// that consumed it.  A field holding [`NO_ECHO`] means that sensor timed out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    pub front: f32,
    pub left: f32,
    pub right: f32,
    pub back: f32,
}

impl DistanceSample {
    /// A sample with every sensor reporting [`NO_ECHO`].
    pub fn no_echo() -> Self {
        Self {
            front: NO_ECHO,
            left: NO_ECHO,
            right: NO_ECHO,
            back: NO_ECHO,
        }
    }

    /// `true` when `reading` is a real echo closer than `threshold_cm`.
    ///
    /// [`NO_ECHO`] never blocks.
    pub fn blocks(reading: f32, threshold_cm: f32) -> bool {
        reading != NO_ECHO && reading < threshold_cm
    }

    /// `true` when `reading` is [`NO_ECHO`] or strictly beyond `threshold_cm`.
    ///
    /// Not the complement of [`blocks`][Self::blocks]: a reading exactly at
    /// the threshold neither blocks nor counts as clear, matching the strict
    /// comparisons of the avoidance decision table.
    pub fn clear(reading: f32, threshold_cm: f32) -> bool {
        reading == NO_ECHO || reading > threshold_cm
    }

    /// `true` when `reading` is a *known* echo strictly beyond `threshold_cm`.
    ///
    /// Used for the rear check before backing up: an unknown rear distance is
    /// not treated as room to reverse into.
    pub fn known_beyond(reading: f32, threshold_cm: f32) -> bool {
        reading != NO_ECHO && reading > threshold_cm
    }
}

/// Class of the last steering action, recorded into the stuck detector.
///
/// The discriminants are part of the stuck-pattern arithmetic: a left turn
/// and a right turn sum to 1 in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum MovementCode {
    Forward = -1,
    TurnLeft = 0,
    TurnRight = 1,
    Backward = 2,
}

impl MovementCode {
    /// Numeric code used by the oscillation pattern check.
    pub fn code(self) -> i8 {
        self as i8
    }
}

/// The four relative headings of a directional scan, in sweep order.
///
/// Each step from one heading to the next is a quarter-turn clockwise of the
/// chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanHeading {
    Front,
    Right,
    Back,
    Left,
}

impl ScanHeading {
    /// The rotation order of a full sweep.
    pub const SWEEP: [ScanHeading; 4] = [
        ScanHeading::Front,
        ScanHeading::Right,
        ScanHeading::Back,
        ScanHeading::Left,
    ];
}

impl std::fmt::Display for ScanHeading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanHeading::Front => write!(f, "front"),
            ScanHeading::Right => write!(f, "right"),
            ScanHeading::Back => write!(f, "back"),
            ScanHeading::Left => write!(f, "left"),
        }
    }
}

/// Horizontal position of a tracked target relative to camera center.
///
/// A target that is not visible at all is represented as `Option<Bearing>`
/// being `None`, never as an extra variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bearing {
    Left,
    Center,
    Right,
}

/// One per-frame detection produced by the vision collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectObservation {
    /// Detected class name, e.g. `"bottle"`.
    pub name: String,
    /// Horizontal bearing, when the detector could localise the box.
    pub bearing: Option<Bearing>,
    /// Bounding-box area in pixels; a proxy for proximity (larger = closer).
    pub area: f32,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl ObjectObservation {
    /// Case-insensitive, whitespace-trimmed exact match against `target`.
    pub fn matches(&self, target: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(target.trim())
    }
}

/// An external actor allowed to issue commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    /// The remote web operator.
    Web,
    /// The onboard voice pipeline.
    Voice,
}

impl std::fmt::Display for Medium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Medium::Web => write!(f, "web"),
            Medium::Voice => write!(f, "voice"),
        }
    }
}

/// The currently active behavior family.  Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Manual,
    Find,
    Follow,
    Autonomous,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Manual => write!(f, "manual"),
            Mode::Find => write!(f, "find"),
            Mode::Follow => write!(f, "follow"),
            Mode::Autonomous => write!(f, "autonomous"),
        }
    }
}

/// One-way status payloads pushed to the notification sink.
///
/// Delivery is best-effort; no notice ever aborts the behavior that emitted
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum Notice {
    /// A previously busy command medium is free again.
    Available,
    /// A command was dropped because another medium holds control.
    Busy { holder: Medium },
    /// The supervisor switched behaviors.
    ModeChanged { mode: Mode },
    /// A find/follow behavior is looking for its target.
    Searching { target: String },
    /// Class names seen while scanning a heading.
    ObjectsSeen {
        heading: ScanHeading,
        names: Vec<String>,
    },
    /// The target was located.
    TargetFound { name: String },
    /// The target dropped out of view past the lost-frame budget.
    TargetLost { name: String },
    /// The oscillation detector fired and an escape turn was made.
    Stuck,
    /// The approach loop is holding inside the safe-distance band.
    Holding { distance_cm: f32 },
    /// A manual relay step was executed.
    Moved { step: String },
}

/// Envelope for a [`Notice`] travelling over the notice bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"trundle-runtime::scanner"`
    pub source: String,
    pub payload: Notice,
}

impl Event {
    /// Wrap `payload` with a fresh id and the current timestamp.
    pub fn now(source: impl Into<String>, payload: Notice) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Global error type spanning hardware faults, channel plumbing, and
/// configuration problems.
///
/// Arbitration denial, a missed vision frame, and behavior cancellation are
/// *not* errors: the first two are ordinary values and the last is an
/// expected control-flow signal.
#[derive(Error, Debug)]
pub enum TrundleError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Config Error: {0}")]
    Config(String),
}
