use std::collections::VecDeque;
use std::path::PathBuf;

use super::loader::load_cp;
use super::store::SeriesStore;
use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// Path provider – where file names come from
// ---------------------------------------------------------------------------

/// Supplies file paths to import routines, keeping them free of prompts.
///
/// `prompt` describes the file being asked for ("Positive CP data file").
/// Returning `None` means the user cancelled.
pub trait PathProvider {
    fn path_for(&mut self, prompt: &str) -> Option<PathBuf>;
}

/// Hands out a fixed list of paths in order, ignoring the prompt.
#[derive(Debug, Clone, Default)]
pub struct FixedPaths {
    queue: VecDeque<PathBuf>,
}

impl FixedPaths {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        FixedPaths {
            queue: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl PathProvider for FixedPaths {
    fn path_for(&mut self, _prompt: &str) -> Option<PathBuf> {
        self.queue.pop_front()
    }
}

/// Ask `provider` for the positive and negative halves of a CP run and
/// register them as `pos_tag` / `neg_tag`.
///
/// Returns `Ok(false)` when the provider is cancelled before both paths are
/// known; nothing is imported in that case.
pub fn import_cp_pair(
    store: &mut SeriesStore,
    provider: &mut dyn PathProvider,
    pos_tag: &str,
    neg_tag: &str,
) -> Result<bool, SeriesError> {
    let Some(pos_path) = provider.path_for("Positive CP data file") else {
        return Ok(false);
    };
    let Some(neg_path) = provider.path_for("Negative CP data file") else {
        return Ok(false);
    };

    store.labeled_import(pos_tag, || load_cp(&pos_path))?;
    if let Err(e) = store.labeled_import(neg_tag, || load_cp(&neg_path)) {
        store.remove(pos_tag);
        return Err(e);
    }
    Ok(true)
}
