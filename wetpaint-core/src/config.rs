//! Per-ride painting configuration.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::host::RideId;
use crate::props::{TailModeProps, TrainModeProps};

/// Which rule family a configuration uses. Exactly one is active at a time
/// and only its payload exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintMode {
    Train(TrainModeProps),
    Tail(TailModeProps),
}

impl Default for PaintMode {
    fn default() -> Self {
        Self::Train(TrainModeProps::default())
    }
}

impl PaintMode {
    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Train(_) => ModeKind::Train,
            Self::Tail(_) => ModeKind::Tail,
        }
    }

    /// Fresh default payload for `kind`.
    #[must_use]
    pub fn default_for(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Train => Self::Train(TrainModeProps::default()),
            ModeKind::Tail => Self::Tail(TailModeProps::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Train,
    Tail,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Tail => write!(f, "tail"),
        }
    }
}

/// Painting configuration for one ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintConfig {
    pub ride: RideId,
    pub enabled: bool,
    pub mode: PaintMode,
}

impl PaintConfig {
    /// Disabled configuration in train mode with default rules.
    #[must_use]
    pub fn new(ride: RideId) -> Self {
        Self {
            ride,
            enabled: false,
            mode: PaintMode::default(),
        }
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PaintMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn train_props(&self) -> Option<&TrainModeProps> {
        match &self.mode {
            PaintMode::Train(props) => Some(props),
            PaintMode::Tail(_) => None,
        }
    }

    #[must_use]
    pub const fn tail_props(&self) -> Option<&TailModeProps> {
        match &self.mode {
            PaintMode::Tail(props) => Some(props),
            PaintMode::Train(_) => None,
        }
    }

    /// Restore every rule to its default, keeping the ride binding.
    pub fn reset(&mut self) {
        self.enabled = false;
        self.mode = PaintMode::default();
    }
}
