use std::path::PathBuf;

/// Error returned by discovery and the rebuild pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Content tree could not be walked or a document could not be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Output directory, page or asset could not be written.
    #[error("Cannot write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Cleaning the output directory would delete the content directory.
    #[error("Output directory {} contains the content directory", .0.display())]
    UnsafeOutputDir(PathBuf),
}

impl SiteError {
    pub(crate) fn discovery(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Discovery { path, source }
    }

    pub(crate) fn output(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Output { path, source }
    }
}

/// Error type for front matter decoding.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),
}
