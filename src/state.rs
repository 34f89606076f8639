use std::path::{Path, PathBuf};

use rusty_echem::config::FigureConfig;
use rusty_echem::data::loader::{import_dir, load_eis, load_pdf, load_xrd, tag_for};
use rusty_echem::data::model::SeriesKind;
use rusty_echem::data::provider::{import_cp_pair, PathProvider};
use rusty_echem::data::store::SeriesStore;
use rusty_echem::figure::{cp_figure, eis_figure, pdf_figure, xrd_figure, Figure};
use rusty_echem::SeriesError;

// ---------------------------------------------------------------------------
// Which figure is on screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FigureView {
    Cp { pos: String, neg: String },
    Eis { tag: String },
    Xrd { tags: Vec<String> },
    Pdf { tag: String },
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Every loaded dataset, by tag.
    pub store: SeriesStore,

    /// Settings the figure builders read.
    pub config: FigureConfig,

    /// Selected figure (None until something is loaded).
    pub view: Option<FigureView>,

    /// Figure built from `view` (cached).
    pub figure: Option<Figure>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// CP pairs imported so far; numbers the `CP+ n` / `CP- n` tags.
    cp_imports: usize,
}

impl AppState {
    pub fn new(config: FigureConfig) -> Self {
        Self {
            store: SeriesStore::new(),
            config,
            view: None,
            figure: None,
            status_message: None,
            cp_imports: 0,
        }
    }

    fn report(&mut self, err: SeriesError) {
        log::error!("{err}");
        self.status_message = Some(format!("Error: {err}"));
    }

    /// Import the two halves of a CP run and show them.
    pub fn import_cp(&mut self, provider: &mut dyn PathProvider) {
        let n = self.cp_imports;
        let (pos, neg) = (format!("CP+ {n}"), format!("CP- {n}"));
        match import_cp_pair(&mut self.store, provider, &pos, &neg) {
            Ok(true) => {
                self.cp_imports += 1;
                self.set_view(FigureView::Cp { pos, neg });
            }
            Ok(false) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn import_eis(&mut self, path: &Path) {
        let tag = tag_for(path);
        match self.store.labeled_import(&tag, || load_eis(path)) {
            Ok(_) => self.set_view(FigureView::Eis { tag }),
            Err(e) => self.report(e),
        }
    }

    pub fn import_pdf(&mut self, path: &Path) {
        let tag = tag_for(path);
        let header_rows = self.config.header_rows;
        match self.store.labeled_import(&tag, || load_pdf(path, header_rows)) {
            Ok(_) => self.set_view(FigureView::Pdf { tag }),
            Err(e) => self.report(e),
        }
    }

    /// Import diffraction patterns; the x column is read in `config.xrd_axis` units.
    pub fn import_xrd(&mut self, paths: &[PathBuf]) {
        let header_rows = self.config.header_rows;
        let axis = self.config.xrd_axis;
        let mut tags = Vec::new();
        let mut errors = Vec::new();
        for path in paths {
            let tag = tag_for(path);
            match self
                .store
                .labeled_import(&tag, || load_xrd(path, header_rows, axis))
            {
                Ok(_) => tags.push(tag),
                Err(e) => errors.push(e),
            }
        }
        if !tags.is_empty() {
            self.set_view(FigureView::Xrd { tags });
        }
        // after the rebuild, which clears the status line on success
        for e in errors {
            self.report(e);
        }
    }

    /// Import every `.xye` / `.xy` file in a directory.
    pub fn import_xrd_dir(&mut self, dir: &Path) {
        let listed = ["xye", "xy"]
            .into_iter()
            .map(|ext| import_dir(dir, Some(ext)))
            .collect::<anyhow::Result<Vec<_>>>();
        match listed {
            Ok(lists) => {
                let mut patterns: Vec<PathBuf> = lists.into_iter().flatten().collect();
                patterns.sort();
                log::info!("Found {} patterns in {}", patterns.len(), dir.display());
                self.import_xrd(&patterns);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn set_view(&mut self, view: FigureView) {
        self.view = Some(view);
        self.rebuild_figure();
    }

    /// Show every stored group of the same kind as `tag`.
    pub fn show_tag(&mut self, tag: &str) {
        let Some(group) = self.store.get(tag) else {
            return;
        };
        let view = match group.kind() {
            SeriesKind::Cp { .. } => match self.view.clone() {
                Some(FigureView::Cp { pos, neg }) if pos == tag || neg == tag => {
                    FigureView::Cp { pos, neg }
                }
                _ => return,
            },
            SeriesKind::Eis { .. } => FigureView::Eis {
                tag: tag.to_string(),
            },
            SeriesKind::Xrd { .. } => FigureView::Xrd {
                tags: self
                    .store
                    .iter()
                    .filter(|g| matches!(g.kind(), SeriesKind::Xrd { .. }))
                    .map(|g| g.tag().to_string())
                    .collect(),
            },
            SeriesKind::Pdf { .. } => FigureView::Pdf {
                tag: tag.to_string(),
            },
        };
        self.set_view(view);
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.store.remove(tag);
        let still_valid = match &self.view {
            Some(FigureView::Cp { pos, neg }) => pos != tag && neg != tag,
            Some(FigureView::Eis { tag: t }) | Some(FigureView::Pdf { tag: t }) => t != tag,
            Some(FigureView::Xrd { tags }) => tags.iter().any(|t| t != tag),
            None => true,
        };
        if let Some(FigureView::Xrd { tags }) = &mut self.view {
            tags.retain(|t| t != tag);
        }
        if !still_valid {
            self.view = None;
        }
        self.rebuild_figure();
    }

    /// Rebuild `figure` from `view` after a data or config change.
    pub fn rebuild_figure(&mut self) {
        let Some(view) = &self.view else {
            self.figure = None;
            return;
        };
        let result = self.build(view);
        match result {
            Ok(figure) => {
                self.figure = Some(figure);
                self.status_message = None;
            }
            Err(e) => {
                self.figure = None;
                self.report(e);
            }
        }
    }

    fn build(&self, view: &FigureView) -> Result<Figure, SeriesError> {
        self.config.validate()?;
        match view {
            FigureView::Cp { pos, neg } => cp_figure(
                self.store.require(pos)?,
                self.store.require(neg)?,
                &self.config,
            ),
            FigureView::Eis { tag } => eis_figure(self.store.require(tag)?, &self.config),
            FigureView::Pdf { tag } => pdf_figure(self.store.require(tag)?, &self.config),
            FigureView::Xrd { tags } => {
                let groups = tags
                    .iter()
                    .map(|t| self.store.require(t))
                    .collect::<Result<Vec<_>, _>>()?;
                xrd_figure(&groups, &self.config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusty_echem::data::provider::FixedPaths;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn cp_tags_stay_unique_after_removal() {
        let dir = tempfile::tempdir().unwrap();
        let pos = write(dir.path(), "pos.csv", "time,<Ewe>\n0,0.1\n1,0.2\n");
        let neg = write(dir.path(), "neg.csv", "time,<Ewe>\n0,-0.1\n1,-0.2\n");
        let mut state = AppState::new(FigureConfig::default());

        for _ in 0..2 {
            state.import_cp(&mut FixedPaths::new([&pos, &neg]));
        }
        state.remove_tag("CP+ 0");
        state.remove_tag("CP- 0");
        state.import_cp(&mut FixedPaths::new([&pos, &neg]));

        let tags: Vec<&str> = state.store.tags().collect();
        assert_eq!(tags, ["CP+ 1", "CP- 1", "CP+ 2", "CP- 2"]);
        assert_eq!(state.status_message, None);
        assert_eq!(
            state.view,
            Some(FigureView::Cp {
                pos: "CP+ 2".to_string(),
                neg: "CP- 2".to_string(),
            })
        );
    }

    #[test]
    fn failed_pattern_keeps_its_status_message() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.xye", "10 1 0.1\n20 2 0.2\n");
        let bad = write(dir.path(), "bad.xye", "10 1\n20 2\n");
        let mut state = AppState::new(FigureConfig::default());

        state.import_xrd(&[good, bad]);

        assert!(state.figure.is_some());
        assert!(state.store.contains("good"));
        let msg = state.status_message.unwrap();
        assert!(msg.contains("'bad'"), "{msg}");
    }

    #[test]
    fn pattern_folder_ignores_extension_case() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "LiCoO2.XYE", "10 1 0.1\n20 2 0.2\n");
        write(dir.path(), "NMC811.xy", "10 1\n20 2\n");
        write(dir.path(), "notes.txt", "not a pattern\n");
        let mut state = AppState::new(FigureConfig::default());

        state.import_xrd_dir(dir.path());

        let tags: Vec<&str> = state.store.tags().collect();
        assert_eq!(tags, ["LiCoO2", "NMC811"]);
        assert_eq!(state.status_message, None);
    }
}
