use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;

use crate::transfer::title_parser::TrackQuery;

/// Outcome of one transfer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub matched_count: usize,
    /// Tracks that failed both searches, in playlist order.
    pub unmatched: Vec<TrackQuery>,
    /// `None` only when nothing was transferable and no playlist was created.
    pub destination_playlist_id: Option<String>,
}

impl TransferReport {
    pub fn empty() -> Self {
        Self {
            matched_count: 0,
            unmatched: Vec::new(),
            destination_playlist_id: None,
        }
    }

    /// Unmatched tracks as `"{title} - {artist}"`, one per line, no trailing newline.
    pub fn unmatched_text(&self) -> String {
        self.unmatched
            .iter()
            .map(|track| format!("{} - {}", track.title, track.artist))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_unmatched(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.unmatched_text())
            .wrap_err_with(|| format!("Failed to write unmatched tracks to {}", path.display()))
    }
}
