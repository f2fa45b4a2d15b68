use std::ffi::c_int;

use thiserror::Error;

use crate::errmsg::status_text;
use crate::fitsio::{
    BAD_BITPIX, BAD_FILEPTR, BAD_HDU_NUM, BAD_KEYCHAR, BAD_NAXES, BAD_NAXIS, END_OF_FILE,
    FILE_NOT_OPENED, KEY_NO_EXIST, NO_END, NO_QUOTE, NULL_INPUT_PTR, READ_ERROR, UNKNOWN_REC,
};

pub type Result<T> = std::result::Result<T, FitsError>;

/// Errors raised while locating or reading a header keyword.
///
/// Every variant carries the CFITSIO status code callers at the C boundary
/// expect, see [`FitsError::status`].
#[derive(Debug, Error)]
pub enum FitsError {
    #[error("error reading FITS file: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyword not found in header: {keyword}")]
    KeyNotFound { keyword: String },

    #[error("END keyword not found")]
    NoEnd,

    #[error("illegal character in keyword or card: {card}")]
    BadKeyChar { card: String },

    #[error("complex keyword value has no closing ')': {card}")]
    NoClosingQuote { card: String },

    #[error("1st key not SIMPLE or XTENSION: {card}")]
    UnknownRecord { card: String },

    #[error("illegal HDU number: {hdu}")]
    BadHduNum { hdu: usize },

    #[error("illegal BITPIX keyword value")]
    BadBitpix,

    #[error("illegal NAXIS keyword value")]
    BadNaxis,

    #[error("illegal NAXISn keyword value")]
    BadNaxes,

    #[error("tried to move past end of file")]
    EndOfFile,

    #[error("invalid table handle")]
    BadHandle,

    #[error("NULL input pointer")]
    NullInput,
}

impl FitsError {
    /// CFITSIO status code for this error.
    pub fn status(&self) -> c_int {
        match self {
            FitsError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => FILE_NOT_OPENED,
            FitsError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => END_OF_FILE,
            FitsError::Io(_) => READ_ERROR,
            FitsError::KeyNotFound { .. } => KEY_NO_EXIST,
            FitsError::NoEnd => NO_END,
            FitsError::BadKeyChar { .. } => BAD_KEYCHAR,
            FitsError::NoClosingQuote { .. } => NO_QUOTE,
            FitsError::UnknownRecord { .. } => UNKNOWN_REC,
            FitsError::BadHduNum { .. } => BAD_HDU_NUM,
            FitsError::BadBitpix => BAD_BITPIX,
            FitsError::BadNaxis => BAD_NAXIS,
            FitsError::BadNaxes => BAD_NAXES,
            FitsError::EndOfFile => END_OF_FILE,
            FitsError::BadHandle => BAD_FILEPTR,
            FitsError::NullInput => NULL_INPUT_PTR,
        }
    }

    /// Short CFITSIO text for [`FitsError::status`].
    pub fn status_text(&self) -> &'static str {
        status_text(self.status())
    }
}
