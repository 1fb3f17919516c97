use std::path::PathBuf;

use thiserror::Error;

use crate::document::ElementId;

/// Failure to edit the element tree
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
    #[error("appending {child} under {parent} would create a cycle")]
    Cycle { parent: ElementId, child: ElementId },
}

/// Failure to construct a popup controller
#[derive(Debug, Error)]
pub enum PopupMenuError {
    #[error("popup root {0} does not exist in the document")]
    MissingRoot(ElementId),
    #[error("popup root {0} is not a list element")]
    RootNotAList(ElementId),
}

/// Failure to arm a deferred callback
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to insert timer into the event loop: {0}")]
    Insert(#[from] calloop::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
