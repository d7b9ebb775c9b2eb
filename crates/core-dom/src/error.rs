use crate::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

/// Failures of document queries. The detector turns these into measurement
/// error strings; they never cross its public surface as panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("no element matches selector `{0}`")]
    NotFound(String),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} is not attached to the document")]
    Detached(NodeId),

    #[error("range over node {0:?} is empty: element has no child nodes")]
    EmptyRange(NodeId),

    #[error("geometry unavailable for node {0:?}")]
    GeometryUnavailable(NodeId),

    #[error("computed style unavailable for node {0:?}")]
    StyleUnavailable(NodeId),

    #[error("cannot insert {child:?} into {parent:?}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
