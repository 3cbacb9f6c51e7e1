//! Background image decoding to keep the UI thread responsive.

use std::path::PathBuf;

use image::RgbaImage;
use tokio::sync::mpsc;

use super::state::AppState;
use crate::core::story::{self, StoryError};

pub struct DecodeUpdate {
    pub generation: u64,
    pub index: usize,
    pub result: Result<RgbaImage, StoryError>,
}

pub fn spawn_decode(
    tx: mpsc::UnboundedSender<DecodeUpdate>,
    generation: u64,
    index: usize,
    path: PathBuf,
    budget: (u32, u32),
) {
    std::thread::spawn(move || {
        let result = story::decode(&path, budget.0, budget.1);
        let _ = tx.send(DecodeUpdate {
            generation,
            index,
            result,
        });
    });
}

/// Story indices on the cube faces that still need a decode.
pub fn wanted(state: &AppState) -> Vec<usize> {
    let mut wanted: Vec<usize> = state
        .cube
        .panes()
        .iter()
        .filter(|pane| state.contains(pane.index))
        .map(|pane| pane.index as usize)
        .filter(|i| {
            !state.images.contains_key(i)
                && !state.decode_errors.contains_key(i)
                && !state.pending.contains(i)
        })
        .collect();
    // Front face first.
    let current = state.current();
    wanted.sort_by_key(|&i| i.abs_diff(current));
    wanted.dedup();
    wanted
}

/// Start decodes for every face that shows a story without an image.
pub fn request_visible(state: &mut AppState, tx: &mpsc::UnboundedSender<DecodeUpdate>) {
    if state.decode_budget == (0, 0) {
        state.decode_budget = state.face_pixels();
    }
    state.evict_far_images();
    for index in wanted(state) {
        state.pending.insert(index);
        tracing::debug!(index, "decode requested");
        spawn_decode(
            tx.clone(),
            state.decode_generation,
            index,
            state.stories[index].path.clone(),
            state.decode_budget,
        );
    }
}

/// Store a finished decode.  Results from an older generation are dropped.
pub fn apply(state: &mut AppState, update: DecodeUpdate) {
    if update.generation != state.decode_generation {
        return;
    }
    state.pending.remove(&update.index);
    match update.result {
        Ok(image) => {
            state.images.insert(update.index, image);
        }
        Err(e) => {
            tracing::warn!("{e}");
            state.decode_errors.insert(update.index, e.to_string());
        }
    }
}
