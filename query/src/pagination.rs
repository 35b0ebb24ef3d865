//! Page/size pagination.

use gnx_core::{Pipeline, Stage};
use serde::Deserialize;

/// Requested page. Applied only when both fields are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Records per page.
    pub size: Option<u32>,
}

impl Pagination {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    /// Skip/Limit stages for this page. Page 0 is treated as page 1.
    pub fn stages(&self) -> Option<[Stage; 2]> {
        let (page, size) = (self.page?, self.size?);
        let skip = u64::from(size) * u64::from(page.saturating_sub(1));
        Some([Stage::Skip(skip), Stage::Limit(u64::from(size))])
    }

    /// Append this page's stages to a compiled pipeline.
    pub fn apply(&self, pipeline: &mut Pipeline) {
        if let Some(stages) = self.stages() {
            for stage in stages {
                pipeline.push(stage);
            }
        }
    }
}
