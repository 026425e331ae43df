use crate::config::LibraryConfig;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Filesystem operations the library index depends on.
pub trait MediaFs {
    fn directory_exists(&self, path: &Path) -> bool;

    /// Creates a single directory. The parent must already exist.
    fn create_directory(&self, path: &Path) -> io::Result<()>;

    /// Names of the immediate children of `path`, sorted.
    fn list_directory_entries(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// [`MediaFs`] backed by the local disk.
#[derive(Debug, Clone)]
#[cfg_attr(not(unix), allow(dead_code))]
pub struct LocalFs {
    mode: u32,
    uid: Option<u32>,
    gid: Option<u32>,
}

impl Default for LocalFs {
    fn default() -> Self {
        Self {
            mode: 0o755,
            uid: None,
            gid: None,
        }
    }
}

impl LocalFs {
    #[must_use]
    pub const fn from_config(config: &LibraryConfig) -> Self {
        Self {
            mode: config.folder_mode,
            uid: config.folder_uid,
            gid: config.folder_gid,
        }
    }
}

impl MediaFs for LocalFs {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        let mut builder = std::fs::DirBuilder::new();

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.mode);
        }

        builder.create(path)?;

        #[cfg(unix)]
        if self.uid.is_some() || self.gid.is_some() {
            std::os::unix::fs::chown(path, self.uid, self.gid)?;
        }

        Ok(())
    }

    fn list_directory_entries(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => tracing::debug!(
                    path = %entry.path().display(),
                    "Skipping entry with non UTF-8 name"
                ),
            }
        }

        Ok(names)
    }
}
