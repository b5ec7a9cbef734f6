//! Two-stage startup: the image must arrive before the canvas can be sized,
//! and the program must compile before the first frame.
//!
//! ```text
//!   Empty ──image_loaded──▶ ImageLoaded ──program_ready──▶ Ready
//!     │                         │
//!     └────────── fail ─────────┴──────────▶ Failed
//! ```
//!
//! The machine is generic over what each stage produces so the host can park
//! its own resources (window, GPU context, pipeline) inside it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Empty,
    ImageLoaded,
    Ready,
    Failed,
}

impl fmt::Display for StartupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupPhase::Empty => f.write_str("empty"),
            StartupPhase::ImageLoaded => f.write_str("image-loaded"),
            StartupPhase::Ready => f.write_str("ready"),
            StartupPhase::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("cannot {action} while startup is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: StartupPhase,
    },
}

pub enum Startup<I, P> {
    Empty,
    ImageLoaded { image: I },
    Ready { image: I, program: P },
    Failed { reason: String },
}

impl<I, P> Default for Startup<I, P> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<I, P> Startup<I, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> StartupPhase {
        match self {
            Startup::Empty => StartupPhase::Empty,
            Startup::ImageLoaded { .. } => StartupPhase::ImageLoaded,
            Startup::Ready { .. } => StartupPhase::Ready,
            Startup::Failed { .. } => StartupPhase::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Startup::Ready { .. })
    }

    pub fn image_loaded(&mut self, image: I) -> Result<(), StartupError> {
        match self {
            Startup::Empty => {
                *self = Startup::ImageLoaded { image };
                tracing::info!(phase = %self.phase(), "startup advanced");
                Ok(())
            }
            other => Err(StartupError::InvalidTransition {
                action: "accept an image",
                phase: other.phase(),
            }),
        }
    }

    pub fn program_ready(&mut self, program: P) -> Result<(), StartupError> {
        match std::mem::take(self) {
            Startup::ImageLoaded { image } => {
                *self = Startup::Ready { image, program };
                tracing::info!(phase = %self.phase(), "startup advanced");
                Ok(())
            }
            previous => {
                let phase = previous.phase();
                *self = previous;
                Err(StartupError::InvalidTransition {
                    action: "accept a program",
                    phase,
                })
            }
        }
    }

    /// Moves to `Failed`. Only loading stages can fail; a running sketch
    /// never goes back.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), StartupError> {
        match self.phase() {
            StartupPhase::Empty | StartupPhase::ImageLoaded => {
                let reason = reason.into();
                tracing::error!(%reason, "startup failed");
                *self = Startup::Failed { reason };
                Ok(())
            }
            phase => Err(StartupError::InvalidTransition {
                action: "fail",
                phase,
            }),
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Startup::Failed { reason } => Some(reason.as_str()),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&I> {
        match self {
            Startup::ImageLoaded { image } | Startup::Ready { image, .. } => Some(image),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut I> {
        match self {
            Startup::ImageLoaded { image } | Startup::Ready { image, .. } => Some(image),
            _ => None,
        }
    }

    /// Both stages, available only once rendering is allowed.
    pub fn ready_mut(&mut self) -> Result<(&mut I, &mut P), StartupError> {
        match self {
            Startup::Ready { image, program } => Ok((image, program)),
            other => Err(StartupError::InvalidTransition {
                action: "render",
                phase: other.phase(),
            }),
        }
    }
}
