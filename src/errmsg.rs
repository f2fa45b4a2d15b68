use std::collections::VecDeque;
use std::ffi::c_int;
use std::io::{self, Write};

use crate::fitsio::{FLEN_ERRMSG, MAXMSG};

/*--------------------------------------------------------------------------*/
/// Return a short descriptive error message that corresponds to the input
/// error status value.  The message is at most 30 characters long.
pub fn status_text(status: c_int) -> &'static str {
    match status {
        0 => "OK - no error",
        104 => "could not open the named file",
        107 => "tried to move past end of file",
        108 => "error reading from FITS file",
        114 => "invalid table handle",
        115 => "NULL input pointer",
        202 => "keyword not found in header",
        205 => "string missing closing quote",
        207 => "illegal character in keyword",
        210 => "END keyword not found",
        211 => "illegal BITPIX keyword value",
        212 => "illegal NAXIS keyword value",
        213 => "illegal NAXISn keyword value",
        252 => "1st key not SIMPLE or XTENSION",
        301 => "illegal HDU number",
        _ => "unknown error status",
    }
}

/*--------------------------------------------------------------------------*/
/// Print out the status text and drain the messages on the error stack.
/// Nothing is printed when `status` is not positive.
pub fn report_error<W: Write>(
    stream: &mut W,
    status: c_int,
    errors: &mut ErrorStack,
) -> io::Result<()> {
    if status > 0 {
        writeln!(stream, "\nFITS status = {status}: {}", status_text(status))?;

        while let Some(msg) = errors.pop_oldest() {
            writeln!(stream, "{msg}")?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Mark,
    Message(String),
}

/// Stack of error messages owned by a table handle.
///
/// Messages are queued oldest first.  Each entry holds at most 80 characters;
/// longer messages are split over several entries.  When the stack is full
/// the oldest entry is discarded to make room.
#[derive(Debug, Default, Clone)]
pub struct ErrorStack {
    entries: VecDeque<Entry>,
}

impl ErrorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// put message on to error stack
    pub fn push(&mut self, message: &str) {
        let chars: Vec<char> = message.chars().collect();
        for chunk in chars.chunks(FLEN_ERRMSG - 1) {
            self.put(Entry::Message(chunk.iter().collect()));
        }
    }

    ///  write a marker to the stack.  It is then possible to pop only those
    ///  messages following the marker off of the stack, leaving the previous
    ///  messages unaffected.
    pub fn mark(&mut self) {
        self.put(Entry::Mark);
    }

    /// get oldest message from error stack, ignoring markers
    pub fn pop_oldest(&mut self) -> Option<String> {
        while let Some(entry) = self.entries.pop_front() {
            if let Entry::Message(msg) = entry {
                return Some(msg);
            }
        }
        None
    }

    /// erase newest messages in the error stack, stopping if a marker is found.
    /// The marker is also erased in this case.
    pub fn clear_to_mark(&mut self) {
        while let Some(entry) = self.entries.pop_back() {
            if entry == Entry::Mark {
                break;
            }
        }
    }

    ///  erase all messages in the error stack
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of messages on the stack, markers excluded.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Message(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&mut self, entry: Entry) {
        if self.entries.len() == MAXMSG {
            self.entries.pop_front(); /* buffers full; reuse oldest buffer */
        }
        self.entries.push_back(entry);
    }
}
