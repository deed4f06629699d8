use thiserror::Error;

/// The document could not be opened at all. Fatal to the reading session:
/// the reader falls back to a synthetic error spread until a new load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a readable comic archive: {0}")]
    Archive(String),

    #[error("archive contains no page images")]
    NoPages,
}

/// A single page could not be fetched. Recovered locally.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("page {page} is out of range (document has {total} pages)")]
    OutOfRange { page: u32, total: u32 },

    #[error("page {page} could not be read: {reason}")]
    Unreadable { page: u32, reason: String },

    #[error("page {page} has unreadable dimensions: {reason}")]
    BadDimensions { page: u32, reason: String },
}

/// A page was fetched but could not be drawn. Recovered locally.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("page {page} could not be decoded: {reason}")]
    Decode { page: u32, reason: String },

    #[error("page raster could not be scaled: {0}")]
    Scale(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog {path} is not valid JSON")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog {path} contains no valid entries")]
    Empty { path: String },
}
