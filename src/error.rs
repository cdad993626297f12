use thiserror::Error;

use crate::utils::{BodyId, JointId};

/// Errors returned by [`Space`](crate::space::Space) mutation APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// The body id is stale or belongs to a different space.
    #[error("unknown body id {0:?}")]
    UnknownBody(BodyId),

    /// The joint id is stale or belongs to a different space.
    #[error("unknown joint id {0:?}")]
    UnknownJoint(JointId),

    /// A joint referenced the same body twice.
    #[error("joint connects a body to itself")]
    SelfJoint,
}
