//! Tab session error types

use thiserror::Error;

use crate::tab::TabId;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Tab session not found: {0}")]
    NotFound(TabId),
}
