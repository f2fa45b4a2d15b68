use std::ffi::c_int;

pub const BLOCK_LEN: usize = 2880; /* size in bytes of a FITS logical record */
pub const CARD_LEN: usize = 80; /* length of a header record, excluding any terminator */
pub const CARDS_PER_BLOCK: usize = BLOCK_LEN / CARD_LEN;

pub const FLEN_KEYWORD: usize = 75; /* max length of a keyword (HIERARCH convention) */
pub const FLEN_CARD: usize = 81; /* length of a FITS header card */
pub const FLEN_VALUE: usize = 71; /* max length of a keyword value string */
pub const FLEN_COMMENT: usize = 73; /* max length of a keyword comment string */
pub const FLEN_ERRMSG: usize = 81; /* max length of a FITSIO error message */
pub const FLEN_STATUS: usize = 31; /* max length of a FITSIO status text string */

/* bound on the raw value and comment strings handed to the tables layer */
pub const SZ_FITS_STR: usize = FLEN_CARD - 1;

pub const NMAXFILES: usize = 10000; /* max number of HDUs walked when positioning */
pub const MAXDIMS: usize = 999; /* max NAXIS value allowed by the standard */
pub const MAXMSG: usize = 25; /* max number of messages kept on an error stack */

pub const OK: c_int = 0;
pub const FILE_NOT_OPENED: c_int = 104; /* could not open the named file */
pub const END_OF_FILE: c_int = 107; /* tried to move past end of file */
pub const READ_ERROR: c_int = 108; /* error reading from FITS file */
pub const BAD_FILEPTR: c_int = 114; /* invalid table handle */
pub const NULL_INPUT_PTR: c_int = 115; /* NULL input pointer to routine */

pub const KEY_NO_EXIST: c_int = 202; /* keyword not found in header */
pub const NO_QUOTE: c_int = 205; /* string is missing the closing quote */
pub const BAD_KEYCHAR: c_int = 207; /* illegal character in keyword name or card */
pub const NO_END: c_int = 210; /* couldn't find END keyword */
pub const BAD_BITPIX: c_int = 211; /* illegal BITPIX keyword value*/
pub const BAD_NAXIS: c_int = 212; /* illegal NAXIS keyword value */
pub const BAD_NAXES: c_int = 213; /* illegal NAXISn keyword value */
pub const UNKNOWN_REC: c_int = 252; /* unrecognizable FITS record */

pub const BAD_HDU_NUM: c_int = 301; /* HDU number < 1 or > MAXHDU */
