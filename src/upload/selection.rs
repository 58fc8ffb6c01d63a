use crate::upload::types::SelectedFile;
use ignore::WalkBuilder;
use std::io;
use std::path::PathBuf;
use tracing::warn;

/// Selection gathered from picked or dropped paths
#[derive(Debug, Default)]
pub struct Selection {
    pub files: Vec<SelectedFile>,
    pub unreadable: Vec<(PathBuf, io::Error)>,
}

/// Turns picked or dropped paths into selections. Directories are expanded
/// into their files, skipping hidden and git-ignored entries.
pub fn collect_selection(paths: impl IntoIterator<Item = PathBuf>) -> Selection {
    let mut selection = Selection::default();

    for path in paths {
        if !path.is_dir() {
            selection.push(path);
            continue;
        }

        let walk = WalkBuilder::new(&path)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walk {
            match entry {
                Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                    selection.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(dir = %path.display(), error = %e, "error walking directory");
                }
            }
        }
    }

    selection
}

impl Selection {
    fn push(&mut self, path: PathBuf) {
        match SelectedFile::from_path(&path) {
            Ok(file) => self.files.push(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read selected file");
                self.unreadable.push((path, e));
            }
        }
    }
}
