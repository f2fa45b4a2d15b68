//! Keyword comments and text values under the STSDAS tables convention.
//!
//! The tables convention is that for HISTORY, COMMENT or blank keywords the
//! string following the keyword is the value and there is no comment.  The
//! FITS (and CFITSIO) convention is that such keywords have no value and the
//! string is the comment.  The functions here read the raw (value, comment)
//! pair once through a [`HeaderAccess`] and reconcile the two.

use std::ffi::c_int;

use log::warn;

pub use crate::card::RawEntry;
use crate::error::{FitsError, Result};
use crate::fitsio::SZ_FITS_STR;
use crate::header::Header;

/// Source of raw header entries for the resolver.
pub trait HeaderAccess {
    /// Read the (value, comment) pair for `keyword`.  A keyword with no value
    /// indicator comes back with an empty value and the remaining text as
    /// its comment.
    fn read_keyword(&mut self, keyword: &str) -> Result<RawEntry>;

    /// Record an error against this source.  The default only logs it.
    fn report(&mut self, status: c_int, message: &str) {
        warn!("status {status}: {message}");
    }
}

impl HeaderAccess for Header {
    fn read_keyword(&mut self, keyword: &str) -> Result<RawEntry> {
        Header::read_keyword(self, keyword)
    }

    fn report(&mut self, status: c_int, message: &str) {
        warn!("status {status}: {message}");
        self.errors_mut().push(message);
    }
}

/// Result of [`resolve_comment_reported`]: the comment is always usable, and
/// `error` holds the header read failure if there was one.
#[derive(Debug)]
pub struct Resolved {
    pub comment: String,
    pub error: Option<FitsError>,
}

impl Resolved {
    pub fn into_result(self) -> Result<String> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.comment),
        }
    }
}

/// True for HISTORY, COMMENT and blank keywords.  The match is exact and
/// case sensitive; a keyword is blank when its first character is a space.
pub fn is_commentary(keyword: &str) -> bool {
    keyword == "HISTORY" || keyword == "COMMENT" || keyword.starts_with(' ')
}

/// Copy at most `maxch` characters of `src`.
pub fn copy_string(src: &str, maxch: usize) -> String {
    src.chars().take(maxch).collect()
}

/// Get the comment for a keyword from a header.
///
/// HISTORY, COMMENT and blank keywords have no comment under the tables
/// convention, so the result is empty for them.  Otherwise the raw comment is
/// returned, truncated to `maxch` characters.  A failure to read the keyword
/// is returned as the error.
pub fn resolve_comment<H>(access: &mut H, keyword: &str, maxch: usize) -> Result<String>
where
    H: HeaderAccess + ?Sized,
{
    let raw = read_bounded(access, keyword)?;
    Ok(comment_from(&raw, keyword, maxch))
}

/// Like [`resolve_comment`], but a failure to read the keyword does not stop
/// the copy.  The failure is reported through `access` and returned beside a
/// comment resolved from an empty entry.
pub fn resolve_comment_reported<H>(access: &mut H, keyword: &str, maxch: usize) -> Resolved
where
    H: HeaderAccess + ?Sized,
{
    let (raw, error) = match read_bounded(access, keyword) {
        Ok(raw) => (raw, None),
        Err(e) => {
            access.report(e.status(), &format!("error reading comment for {keyword}: {e}"));
            (RawEntry::default(), Some(e))
        }
    };

    Resolved {
        comment: comment_from(&raw, keyword, maxch),
        error,
    }
}

/// Get the text value of a keyword.
///
/// For HISTORY, COMMENT and blank keywords this is the string the header
/// stores as the comment.  For other keywords the enclosing quotes of a
/// string value are removed, doubled quotes are collapsed, and trailing
/// blanks are trimmed.  The result is truncated to `maxch` characters.
pub fn resolve_value<H>(access: &mut H, keyword: &str, maxch: usize) -> Result<String>
where
    H: HeaderAccess + ?Sized,
{
    let raw = read_bounded(access, keyword)?;

    if is_commentary(keyword) {
        return Ok(copy_string(&raw.comment, maxch));
    }
    Ok(copy_string(&unquote(&raw.value), maxch))
}

fn read_bounded<H>(access: &mut H, keyword: &str) -> Result<RawEntry>
where
    H: HeaderAccess + ?Sized,
{
    let raw = access.read_keyword(keyword)?;
    Ok(RawEntry {
        value: copy_string(&raw.value, SZ_FITS_STR),
        comment: copy_string(&raw.comment, SZ_FITS_STR),
    })
}

fn comment_from(raw: &RawEntry, keyword: &str, maxch: usize) -> String {
    if is_commentary(keyword) {
        String::new()
    } else {
        copy_string(&raw.comment, maxch)
    }
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'").trim_end().to_string(),
        None => value.to_string(),
    }
}
