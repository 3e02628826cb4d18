use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Extension {index} does not exist, the source has {count} extensions")]
    ExtensionOutOfRange { index: usize, count: usize },
    #[error("Extension {index} holds unsupported data: {kind}")]
    UnsupportedData { index: usize, kind: String },
    #[error("Extension {index} declares {expected} values in its header but holds {found}")]
    DataSizeMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}
