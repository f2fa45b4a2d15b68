//! C entry points following the STSDAS `c_tb*` naming.
//!
//! Errors at this boundary are recorded in a per-thread error record, read
//! back with [`c_iraferr`] and [`c_iraferrmsg`] and reset with
//! [`clear_cvoserr`].

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char, c_int};
use std::{ptr, slice};

use bytemuck::cast_slice_mut;
use log::{debug, trace};

use crate::error::FitsError;
use crate::fitsio::{FLEN_ERRMSG, OK};
use crate::resolver::{resolve_comment_reported, resolve_value};
use crate::table::TableHandle;

struct ErrorRecord {
    status: c_int,
    message: CString,
}

thread_local! {
    static LAST_ERROR: RefCell<ErrorRecord> = RefCell::new(ErrorRecord {
        status: OK,
        message: CString::default(),
    });
}

fn set_error(status: c_int, message: &str) {
    let message: String = message
        .chars()
        .filter(|&c| c != '\0')
        .take(FLEN_ERRMSG - 1)
        .collect();
    debug!("error {status}: {message}");

    LAST_ERROR.with(|e| {
        let mut e = e.borrow_mut();
        e.status = status;
        e.message = CString::new(message).unwrap_or_default();
    });
}

fn fail(e: &FitsError, message: &str) {
    set_error(e.status(), message);
}

/// Copy `src` into a C buffer, truncating to leave room for the terminator.
fn copy_to_c(dst: &mut [c_char], src: &str) {
    let dst: &mut [u8] = cast_slice_mut(dst);
    let Some(room) = dst.len().checked_sub(1) else {
        return;
    };
    let n = src.len().min(room);
    dst[..n].copy_from_slice(&src.as_bytes()[..n]);
    dst[n] = 0;
}

/// Status of the most recent error on this thread, 0 if none.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub extern "C" fn c_iraferr() -> c_int {
    LAST_ERROR.with(|e| e.borrow().status)
}

/// Message of the most recent error on this thread.  The pointer stays valid
/// until the next error is recorded or cleared on this thread.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub extern "C" fn c_iraferrmsg() -> *const c_char {
    LAST_ERROR.with(|e| e.borrow().message.as_ptr())
}

#[cfg_attr(not(test), unsafe(no_mangle))]
pub extern "C" fn clear_cvoserr() {
    set_error(OK, "");
}

/// Open a table.  `name` may select the HDU with `name[n]` or
/// `name[EXTNAME]`; otherwise `hdu` is used.  Returns null on failure.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub unsafe extern "C" fn c_tbtopn(name: *const c_char, hdu: c_int) -> *mut TableHandle {
    unsafe {
        if name.is_null() {
            fail(&FitsError::NullInput, "c_tbtopn:  null table name");
            return ptr::null_mut();
        }
        let name = CStr::from_ptr(name).to_string_lossy();

        match TableHandle::open(&name, hdu.max(0) as usize) {
            Ok(tp) => Box::into_raw(Box::new(tp)),
            Err(e) => {
                fail(&e, &format!("c_tbtopn:  {e}"));
                ptr::null_mut()
            }
        }
    }
}

/// Close a table opened with [`c_tbtopn`].  A null handle is ignored.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub unsafe extern "C" fn c_tbtclo(tp: *mut TableHandle) {
    unsafe {
        if !tp.is_null() {
            let tp = Box::from_raw(tp);
            trace!("closed {} HDU {}", tp.name(), tp.hdu());
        }
    }
}

/// Get the comment for a keyword from a header.
///
/// The STSDAS tables convention (followed here) is that for HISTORY,
/// COMMENT or blank keyword, the following string is the value and there is
/// no comment, so `comment` is set to the empty string for those.
/// `comment` must have room for `maxch + 1` bytes.  A failure to read the
/// keyword is recorded in the error record and an empty comment is written.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub unsafe extern "C" fn c_tbhgcm(
    tp: *mut TableHandle,   /* I - table descriptor                          */
    keyword: *const c_char, /* I - keyword name                              */
    comment: *mut c_char,   /* O - value for the comment                     */
    maxch: c_int,           /* I - maximum length of the comment (excl. NUL) */
) {
    unsafe {
        if keyword.is_null() || comment.is_null() {
            fail(&FitsError::NullInput, "c_tbhgcm:  null input pointer");
            return;
        }
        let maxch = maxch.max(0) as usize;
        let comment = slice::from_raw_parts_mut(comment, maxch + 1);
        copy_to_c(comment, "");

        let Some(tp) = tp.as_mut() else {
            fail(&FitsError::BadHandle, "c_tbhgcm:  invalid table descriptor");
            return;
        };
        let keyword = CStr::from_ptr(keyword).to_string_lossy();

        let resolved = resolve_comment_reported(tp, &keyword, maxch);
        if let Some(e) = &resolved.error {
            fail(e, "c_tbhgcm:  error reading comment");
        }
        copy_to_c(comment, &resolved.comment);
    }
}

/// Get the text value of a keyword, following the same convention as
/// [`c_tbhgcm`]: for HISTORY, COMMENT or blank keyword the value is the
/// string that follows the keyword.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub unsafe extern "C" fn c_tbhgtt(
    tp: *mut TableHandle,   /* I - table descriptor                          */
    keyword: *const c_char, /* I - keyword name                              */
    text: *mut c_char,      /* O - value of the keyword                      */
    maxch: c_int,           /* I - maximum length of the value (excl. NUL)   */
) {
    unsafe {
        if keyword.is_null() || text.is_null() {
            fail(&FitsError::NullInput, "c_tbhgtt:  null input pointer");
            return;
        }
        let maxch = maxch.max(0) as usize;
        let text = slice::from_raw_parts_mut(text, maxch + 1);
        copy_to_c(text, "");

        let Some(tp) = tp.as_mut() else {
            fail(&FitsError::BadHandle, "c_tbhgtt:  invalid table descriptor");
            return;
        };
        let keyword = CStr::from_ptr(keyword).to_string_lossy();

        match resolve_value(tp, &keyword, maxch) {
            Ok(value) => copy_to_c(text, &value),
            Err(e) => report(tp, &e, "c_tbhgtt:  error reading keyword"),
        }
    }
}

fn report(tp: &mut TableHandle, e: &FitsError, message: &str) {
    tp.errors_mut().push(&format!("{message}: {e}"));
    fail(e, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitsio::{BAD_FILEPTR, FILE_NOT_OPENED, KEY_NO_EXIST, NULL_INPUT_PTR};
    use crate::testhelpers::{with_temp_file, write_table_file};

    fn c_str_of(buf: &[c_char]) -> String {
        let bytes: &[u8] = bytemuck::cast_slice(buf);
        CStr::from_bytes_until_nul(bytes)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    fn open(filename: &str) -> *mut TableHandle {
        let name = CString::new(filename).unwrap();
        let tp = unsafe { c_tbtopn(name.as_ptr(), 1) };
        assert!(!tp.is_null());
        tp
    }

    fn table_cards() -> Vec<String> {
        vec![
            "COMMENT   not used".to_string(),
            "DATE-OBS= '2024-01-01'           / observation date".to_string(),
            "        blank note".to_string(),
            "HISTORY calibrated".to_string(),
        ]
    }

    #[test]
    fn test_c_tbhgcm() {
        with_temp_file(|filename| {
            write_table_file(filename, &table_cards());
            let tp = open(filename);
            let mut comment = [1 as c_char; 81];

            unsafe {
                c_tbhgcm(tp, c"COMMENT".as_ptr(), comment.as_mut_ptr(), 80);
                assert_eq!(c_str_of(&comment), "");

                c_tbhgcm(tp, c"DATE-OBS".as_ptr(), comment.as_mut_ptr(), 7);
                assert_eq!(c_str_of(&comment), "observa");
                assert_eq!(comment[7], 0);

                c_tbhgcm(tp, c" ".as_ptr(), comment.as_mut_ptr(), 80);
                assert_eq!(c_str_of(&comment), "");

                c_tbhgcm(tp, c"DATE-OBS".as_ptr(), comment.as_mut_ptr(), 0);
                assert_eq!(c_str_of(&comment), "");

                c_tbtclo(tp);
            }
        });
    }

    #[test]
    fn test_c_tbhgcm_read_failure() {
        with_temp_file(|filename| {
            write_table_file(filename, &table_cards());
            let tp = open(filename);
            let mut comment = [1 as c_char; 81];

            clear_cvoserr();
            unsafe {
                c_tbhgcm(tp, c"EXPTIME".as_ptr(), comment.as_mut_ptr(), 80);
                assert_eq!(c_str_of(&comment), "");
                assert_eq!(c_iraferr(), KEY_NO_EXIST);
                assert_eq!(
                    CStr::from_ptr(c_iraferrmsg()).to_str().unwrap(),
                    "c_tbhgcm:  error reading comment"
                );
                assert!(!(*tp).errors().is_empty());

                clear_cvoserr();
                assert_eq!(c_iraferr(), OK);

                c_tbtclo(tp);
            }
        });
    }

    #[test]
    fn test_c_tbhgcm_bad_pointers() {
        let mut comment = [1 as c_char; 8];

        clear_cvoserr();
        unsafe {
            c_tbhgcm(ptr::null_mut(), c"EXPTIME".as_ptr(), comment.as_mut_ptr(), 7);
            assert_eq!(c_iraferr(), BAD_FILEPTR);
            assert_eq!(c_str_of(&comment), "");

            c_tbhgcm(ptr::null_mut(), ptr::null(), comment.as_mut_ptr(), 7);
            assert_eq!(c_iraferr(), NULL_INPUT_PTR);

            c_tbhgtt(ptr::null_mut(), c"EXPTIME".as_ptr(), comment.as_mut_ptr(), 7);
            assert_eq!(c_iraferr(), FitsError::BadHandle.status());
            assert_eq!(
                CStr::from_ptr(c_iraferrmsg()).to_str().unwrap(),
                "c_tbhgtt:  invalid table descriptor"
            );

            assert!(c_tbtopn(ptr::null(), 0).is_null());
            assert_eq!(c_iraferr(), FitsError::NullInput.status());

            c_tbtclo(ptr::null_mut());
        }
    }

    #[test]
    fn test_c_tbhgtt() {
        with_temp_file(|filename| {
            write_table_file(filename, &table_cards());
            let tp = open(filename);
            let mut text = [0 as c_char; 81];

            unsafe {
                c_tbhgtt(tp, c"HISTORY".as_ptr(), text.as_mut_ptr(), 80);
                assert_eq!(c_str_of(&text), "calibrated");

                c_tbhgtt(tp, c"DATE-OBS".as_ptr(), text.as_mut_ptr(), 80);
                assert_eq!(c_str_of(&text), "2024-01-01");

                clear_cvoserr();
                c_tbhgtt(tp, c"NOSUCH".as_ptr(), text.as_mut_ptr(), 80);
                assert_eq!(c_iraferr(), KEY_NO_EXIST);
                assert_eq!(c_str_of(&text), "");

                c_tbtclo(tp);
            }
        });
    }

    #[test]
    fn test_c_tbtopn_missing_file() {
        with_temp_file(|filename| {
            let name = CString::new(filename).unwrap();
            clear_cvoserr();
            let tp = unsafe { c_tbtopn(name.as_ptr(), 0) };
            assert!(tp.is_null());
            assert_eq!(c_iraferr(), FILE_NOT_OPENED);
        });
    }
}
