use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::card::RawEntry;
use crate::errmsg::ErrorStack;
use crate::error::{FitsError, Result};
use crate::fitsio::{BLOCK_LEN, CARD_LEN, NMAXFILES};
use crate::header::{Header, is_end_record};
use crate::resolver::HeaderAccess;

/// Which HDU of a file a handle is positioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HduSpec {
    /// 0 is the primary array, 1 the first extension, and so on.
    Number(usize),
    /// first extension whose EXTNAME (or HDUNAME) matches, ignoring case
    Name(String),
}

/// Split an extended filename such as `obs.fits[2]` or `obs.fits[EVENTS]`
/// into the file name and the HDU it selects.
pub fn parse_filename(name: &str) -> (&str, Option<HduSpec>) {
    let trimmed = name.trim();
    let Some(stripped) = trimmed.strip_suffix(']') else {
        return (trimmed, None);
    };
    let Some(open) = stripped.rfind('[') else {
        return (trimmed, None);
    };

    let inner = stripped[open + 1..].trim();
    let spec = match inner.parse::<usize>() {
        Ok(n) => HduSpec::Number(n),
        Err(_) => HduSpec::Name(inner.to_string()),
    };
    (&stripped[..open], Some(spec))
}

/// A read-only handle on one HDU of a FITS file.
#[derive(Debug)]
pub struct TableHandle {
    name: String,
    hdu: usize,
    header: Header,
}

impl TableHandle {
    /// Open `name` and position on HDU `hdu`.  An HDU given in the filename
    /// (`name[n]` or `name[EXTNAME]`) takes precedence over `hdu`.
    pub fn open(name: &str, hdu: usize) -> Result<TableHandle> {
        let (filename, spec) = parse_filename(name);
        let spec = spec.unwrap_or(HduSpec::Number(hdu));

        let file = File::open(Path::new(filename))?;
        let mut reader = BufReader::new(file);
        let (hdu, header) = locate(&mut reader, &spec)?;

        debug!("opened {filename} at HDU {hdu} ({} keywords)", header.len());
        Ok(TableHandle {
            name: filename.to_string(),
            hdu,
            header,
        })
    }

    /// Position on HDU `hdu` of an in-memory FITS file.
    pub fn from_bytes(bytes: &[u8], hdu: usize) -> Result<TableHandle> {
        let mut reader = Cursor::new(bytes);
        let (hdu, header) = locate(&mut reader, &HduSpec::Number(hdu))?;

        Ok(TableHandle {
            name: "mem://".to_string(),
            hdu,
            header,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hdu(&self) -> usize {
        self.hdu
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn errors(&self) -> &ErrorStack {
        self.header.errors()
    }

    pub fn errors_mut(&mut self) -> &mut ErrorStack {
        self.header.errors_mut()
    }
}

impl HeaderAccess for TableHandle {
    fn read_keyword(&mut self, keyword: &str) -> Result<RawEntry> {
        self.header.read_keyword(keyword)
    }

    fn report(&mut self, status: i32, message: &str) {
        self.header.report(status, message);
    }
}

/// Walk the HDUs of a file until the requested one is reached.
fn locate<R: Read + Seek>(reader: &mut R, spec: &HduSpec) -> Result<(usize, Header)> {
    for hdu in 0..NMAXFILES {
        let header = match read_header(reader) {
            Ok(header) => header,
            Err(FitsError::EndOfFile) => {
                let hdu = match spec {
                    HduSpec::Number(n) => *n,
                    HduSpec::Name(_) => hdu,
                };
                return Err(FitsError::BadHduNum { hdu });
            }
            Err(e) => return Err(e),
        };

        let found = match spec {
            HduSpec::Number(n) => *n == hdu,
            HduSpec::Name(name) => hdu > 0 && has_name(&header, name),
        };
        if found {
            return Ok((hdu, header));
        }

        let skip = i64::try_from(header.data_len()?).map_err(|_| FitsError::BadNaxes)?;
        reader.seek(SeekFrom::Current(skip))?;
    }

    Err(FitsError::BadHduNum { hdu: NMAXFILES })
}

fn has_name(header: &Header, name: &str) -> bool {
    let mut scratch = ErrorStack::new();
    header
        .cards()
        .iter()
        .filter(|c| c.keyword() == "EXTNAME" || c.keyword() == "HDUNAME")
        .filter_map(|c| c.split_value_comment(&mut scratch).ok())
        .any(|entry| {
            let value = entry.value.trim_matches('\'').trim_end();
            value.eq_ignore_ascii_case(name)
        })
}

/// Read header blocks from the current position through the block holding END.
fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut bytes = Vec::new();
    let mut block = [0u8; BLOCK_LEN];

    loop {
        match reader.read_exact(&mut block) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(if bytes.is_empty() {
                    FitsError::EndOfFile
                } else {
                    FitsError::NoEnd
                });
            }
            Err(e) => return Err(e.into()),
        }

        bytes.extend_from_slice(&block);
        if block.chunks_exact(CARD_LEN).any(is_end_record) {
            break;
        }
    }

    let (header, _) = Header::parse(&bytes)?;
    Ok(header)
}
