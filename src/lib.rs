#![allow(clippy::missing_safety_doc)]
#![deny(deprecated)]

pub mod card;
pub mod errmsg;
pub mod error;
pub mod ffi;
pub mod fitsio;
pub mod header;
pub mod resolver;
pub mod table;

#[cfg(test)]
pub(crate) mod testhelpers;

pub use card::{Card, KeyClass, RawEntry};
pub use error::{FitsError, Result};
pub use header::Header;
pub use resolver::{
    HeaderAccess, Resolved, resolve_comment, resolve_comment_reported, resolve_value,
};
pub use table::TableHandle;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitsio::KEY_NO_EXIST;
    use crate::testhelpers::{with_temp_file, write_table_file};

    #[test]
    fn test_table_comments() {
        with_temp_file(|filename| {
            write_table_file(
                filename,
                &[
                    "EXTNAME = 'EVENTS'           / extension name".to_string(),
                    "COMMENT   not used".to_string(),
                    "DATE-OBS= '2024-01-01'           / observation date".to_string(),
                    "        blank note".to_string(),
                    "HISTORY processed by pipeline".to_string(),
                    "EXPOSURE=               1200.0 / total exposure (s)".to_string(),
                ],
            );

            let mut table = TableHandle::open(&format!("{filename}[EVENTS]"), 0).unwrap();

            assert_eq!(resolve_comment(&mut table, "COMMENT", 80).unwrap(), "");
            assert_eq!(resolve_comment(&mut table, "DATE-OBS", 7).unwrap(), "observa");
            assert_eq!(resolve_comment(&mut table, " ", 80).unwrap(), "");
            assert_eq!(resolve_comment(&mut table, "HISTORY", 80).unwrap(), "");
            assert_eq!(
                resolve_comment(&mut table, "EXPOSURE", 80).unwrap(),
                "total exposure (s)"
            );
            assert_eq!(resolve_comment(&mut table, "EXPOSURE", 0).unwrap(), "");

            assert_eq!(
                resolve_value(&mut table, "HISTORY", 80).unwrap(),
                "processed by pipeline"
            );

            let resolved = resolve_comment_reported(&mut table, "EXPTIME", 80);
            assert_eq!(resolved.comment, "");
            assert_eq!(resolved.error.as_ref().map(FitsError::status), Some(KEY_NO_EXIST));
            assert!(!table.errors().is_empty());
        });
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        with_temp_file(|filename| {
            write_table_file(
                filename,
                &["DATE-OBS= '2024-01-01'           / observation date".to_string()],
            );

            let mut table = TableHandle::open(filename, 1).unwrap();
            let first = resolve_comment(&mut table, "DATE-OBS", 30).unwrap();
            let second = resolve_comment(&mut table, "DATE-OBS", 30).unwrap();
            assert_eq!(first, second);
            assert_eq!(table.header().len(), 9);
        });
    }

    #[test]
    fn test_duplicate_keyword_is_stable() {
        with_temp_file(|filename| {
            write_table_file(
                filename,
                &[
                    "DATE-OBS= '2024-01-01'           / first date".to_string(),
                    "DATE-OBS= '2024-02-01'           / second date".to_string(),
                ],
            );

            let mut table = TableHandle::open(filename, 1).unwrap();
            for _ in 0..3 {
                assert_eq!(resolve_comment(&mut table, "DATE-OBS", 80).unwrap(), "first date");
                assert_eq!(resolve_value(&mut table, "DATE-OBS", 80).unwrap(), "2024-01-01");
            }
        });
    }
}
