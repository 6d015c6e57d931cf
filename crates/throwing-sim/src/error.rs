//! Errors returned by engine entry points.

use thiserror::Error;

use throwing_core::error::ConfigError;
use throwing_core::types::{ActorId, ProjectileId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown projectile {0}")]
    UnknownProjectile(ProjectileId),

    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("projectile {0} has already terminated")]
    AlreadyTerminated(ProjectileId),

    #[error("actor {0} is dead")]
    DeadActor(ActorId),

    #[error("actor {0} has no hands to catch with")]
    NotACatcher(ActorId),

    #[error("projectile {0} cannot do that in its current phase")]
    WrongPhase(ProjectileId),

    #[error("thrown stack is empty")]
    EmptyStack,

    #[error("scenario references actor #{0}, which it does not define")]
    UnknownScenarioActor(usize),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type EngineResult<T> = Result<T, EngineError>;
