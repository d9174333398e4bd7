use thiserror::Error;

/// All errors that the crate can generate. Data-level problems (unparseable
/// amounts, missing optional fields) never surface here—they are defaulted
/// during composition. Only serialization and font parsing can fail.
#[derive(Error, Debug)]
pub enum PDFError {
    #[error(transparent)]
    /// An I/O error occurred while serializing the document
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse an embedded font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),
}
