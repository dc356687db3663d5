use crate::view::ElementId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),
    #[error("cannot attach {child:?} under {parent:?}: it is an ancestor of the new parent")]
    CyclicParent { parent: ElementId, child: ElementId },
    #[error(
        "layout did not converge after {rounds} rounds under root {root:?} ({} elements still dirty)",
        .unsettled.len()
    )]
    DidNotConverge {
        root: ElementId,
        rounds: usize,
        unsettled: Vec<ElementId>,
    },
    #[error("invalid anchor value `{0}`")]
    InvalidAnchor(String),
    #[error("invalid positioning value `{0}`")]
    InvalidPositioning(String),
}
