use log::{trace, warn};

use crate::card::{Card, KeyClass, RawEntry};
use crate::errmsg::ErrorStack;
use crate::error::{FitsError, Result};
use crate::fitsio::{BLOCK_LEN, CARD_LEN, FLEN_KEYWORD, MAXDIMS};

/// The records of one FITS header, up to but excluding `END`.
///
/// A header keeps the position of the last keyword it found, so a repeated
/// lookup of a keyword that occurs several times walks through successive
/// instances.  It also owns the error stack that keyword reads report into.
#[derive(Debug, Clone, Default)]
pub struct Header {
    cards: Vec<Card>,
    next: usize,
    errors: ErrorStack,
}

impl Header {
    /// Read a header from the start of `bytes`.
    ///
    /// Returns the header and the number of bytes it occupies, always a
    /// multiple of the 2880 byte block size.
    pub fn parse(bytes: &[u8]) -> Result<(Header, usize)> {
        if bytes.len() < BLOCK_LEN {
            return Err(FitsError::EndOfFile);
        }

        let mut cards = Vec::new();

        for (nblock, block) in bytes.chunks_exact(BLOCK_LEN).enumerate() {
            for (nrec, record) in block.chunks_exact(CARD_LEN).enumerate() {
                if is_end_record(record) {
                    if !block[(nrec + 1) * CARD_LEN..].iter().all(|&b| b == b' ') {
                        warn!("header fill area after END is not blank");
                    }
                    let header = Header::from_parsed(cards)?;
                    return Ok((header, (nblock + 1) * BLOCK_LEN));
                }
                cards.push(Card::from_record(record)?);
            }
        }

        Err(FitsError::NoEnd)
    }

    /// Build a header from the text of its records.  An `END` record, if
    /// present, terminates the header.
    pub fn from_cards<'a, I>(records: I) -> Result<Header>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cards = Vec::new();
        for record in records {
            if is_end_record(record.as_bytes()) {
                break;
            }
            cards.push(Card::new(record)?);
        }
        Header::from_parsed(cards)
    }

    fn from_parsed(cards: Vec<Card>) -> Result<Header> {
        match cards.first().map(Card::keyword) {
            Some("SIMPLE") | Some("XTENSION") => {}
            _ => {
                let card = cards
                    .first()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default();
                return Err(FitsError::UnknownRecord { card });
            }
        }

        Ok(Header {
            cards,
            next: 0,
            errors: ErrorStack::new(),
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of keywords in the header, excluding `END`.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_primary(&self) -> bool {
        self.cards.first().map(Card::keyword) == Some("SIMPLE")
    }

    pub fn errors(&self) -> &ErrorStack {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorStack {
        &mut self.errors
    }

    /// Read (get) the named keyword, returning the whole card.
    ///
    /// The name is matched case-insensitively with leading and trailing
    /// blanks ignored.  A leading `HIERARCH` is stripped; the bare name
    /// `HIERARCH` matches any HIERARCH card.  Names containing wild cards
    /// (`?` matches any single char in names shorter than 9 chars, `*` any
    /// sequence of chars, `#` any string of decimal digits) are searched only
    /// up to the end of the header; plain names wrap around to the top once.
    ///
    /// The search starts after the card found by the previous call, so
    /// repeated calls walk through duplicated keywords.
    pub fn find_card(&mut self, name: &str) -> Result<&Card> {
        match self.search(name, self.next) {
            Some(ii) => {
                self.next = ii + 1;
                Ok(&self.cards[ii])
            }
            None => Err(self.not_found(name)),
        }
    }

    fn search(&self, name: &str, start: usize) -> Option<usize> {
        let mut keyname: String = name
            .trim_matches(' ')
            .chars()
            .take(FLEN_KEYWORD - 1)
            .collect::<String>()
            .to_ascii_uppercase();
        let mut hier = false;

        if let Some(rest) = keyname.strip_prefix("HIERARCH") {
            if rest.is_empty() {
                /* special case: just looking for any HIERARCH keyword */
                hier = true;
            } else {
                keyname = rest.trim_start_matches(' ').to_string();
            }
        }

        /* '?' is only a wild card in names that fit the 8 char keyword field */
        let wild = (keyname.len() < 9 && keyname.contains('?')) || keyname.contains(['*', '#']);
        let ncards = self.cards.len();
        let start = start.min(ncards);

        /* first, read from next keyword to end; then from the top */
        let order = (start..ncards).chain(if wild { 0..0 } else { 0..start });

        for ii in order {
            let card = &self.cards[ii];
            let found = if hier {
                card.as_str().starts_with("HIERARCH")
            } else if keyname.is_empty() {
                card.class() == KeyClass::Commentary && card.keyword().is_empty()
            } else {
                let cardname = card.keyword().to_ascii_uppercase();
                if wild {
                    matches_template(keyname.as_bytes(), cardname.as_bytes())
                } else {
                    keyname == cardname
                }
            };

            if found {
                trace!("found keyword {name} at record {}", ii + 1);
                return Some(ii);
            }
        }
        None
    }

    fn not_found(&mut self, name: &str) -> FitsError {
        self.errors
            .push(&format!("could not find keyword = {}", name.trim_end()));
        FitsError::KeyNotFound {
            keyword: name.to_string(),
        }
    }

    /// Read (get) the named keyword, returning the keyword value and comment.
    ///
    /// The value is just the literal string of characters in the value field
    /// of the keyword.  In the case of a string valued keyword, the returned
    /// value includes the leading and closing quote characters.  The value may be
    /// up to 70 characters long, and the comment may be up to 72 characters long.
    /// If the keyword has no value (no equal sign in column 9) then an empty value
    /// is returned.
    ///
    /// Unlike [`Header::find_card`] the search always starts at the top of
    /// the header and leaves the search position alone, so the first
    /// instance of a duplicated keyword is returned on every call.
    pub fn read_keyword(&mut self, name: &str) -> Result<RawEntry> {
        match self.search(name, 0) {
            Some(ii) => self.cards[ii].split_value_comment(&mut self.errors),
            None => Err(self.not_found(name)),
        }
    }

    /// Value of an integer keyword, without moving the search position.
    pub fn integer(&self, name: &str) -> Option<i64> {
        let mut scratch = ErrorStack::new();
        self.cards
            .iter()
            .find(|c| c.keyword() == name)
            .and_then(|c| c.split_value_comment(&mut scratch).ok())
            .and_then(|entry| entry.value.parse().ok())
    }

    fn logical(&self, name: &str) -> Option<bool> {
        let mut scratch = ErrorStack::new();
        self.cards
            .iter()
            .find(|c| c.keyword() == name)
            .and_then(|c| c.split_value_comment(&mut scratch).ok())
            .map(|entry| entry.value == "T")
    }

    /// Size in bytes of the data unit that follows this header, rounded up
    /// to a whole number of blocks.
    pub fn data_len(&self) -> Result<usize> {
        let bitpix = self.integer("BITPIX").ok_or(FitsError::BadBitpix)?;
        if ![8, 16, 32, 64, -32, -64].contains(&bitpix) {
            return Err(FitsError::BadBitpix);
        }

        let naxis = self.integer("NAXIS").ok_or(FitsError::BadNaxis)?;
        if !(0..=MAXDIMS as i64).contains(&naxis) {
            return Err(FitsError::BadNaxis);
        }
        if naxis == 0 {
            return Ok(0);
        }

        let mut naxes = Vec::with_capacity(naxis as usize);
        for ii in 1..=naxis {
            match self.integer(&format!("NAXIS{ii}")) {
                Some(n) if n >= 0 => naxes.push(n as u64),
                _ => return Err(FitsError::BadNaxes),
            }
        }

        /* random groups: NAXIS1 = 0 carries no data */
        let random_groups =
            self.is_primary() && naxes[0] == 0 && self.logical("GROUPS") == Some(true);
        let axes = if random_groups { &naxes[1..] } else { &naxes[..] };

        let pcount = self.integer("PCOUNT").unwrap_or(0).max(0) as u64;
        let gcount = self.integer("GCOUNT").unwrap_or(1).max(0) as u64;

        let npix = axes
            .iter()
            .try_fold(1u64, |acc, &n| acc.checked_mul(n))
            .ok_or(FitsError::BadNaxes)?;
        let nbytes = pcount
            .checked_add(npix)
            .and_then(|n| n.checked_mul(gcount))
            .and_then(|n| n.checked_mul(bitpix.unsigned_abs() / 8))
            .ok_or(FitsError::BadNaxes)?;

        nbytes
            .div_ceil(BLOCK_LEN as u64)
            .checked_mul(BLOCK_LEN as u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(FitsError::BadNaxes)
    }
}

pub(crate) fn is_end_record(record: &[u8]) -> bool {
    record.starts_with(b"END") && record[3..].iter().all(|&b| b == b' ')
}

/// Compare a keyword name against a template that may hold wild cards.
fn matches_template(templt: &[u8], name: &[u8]) -> bool {
    match (templt.first(), name.first()) {
        (None, None) => true,
        (Some(b'*'), _) => {
            matches_template(&templt[1..], name)
                || (!name.is_empty() && matches_template(templt, &name[1..]))
        }
        (Some(b'#'), Some(c)) if c.is_ascii_digit() => {
            let digits = name.iter().take_while(|b| b.is_ascii_digit()).count();
            (1..=digits).any(|n| matches_template(&templt[1..], &name[n..]))
        }
        (Some(b'?'), Some(_)) => matches_template(&templt[1..], &name[1..]),
        (Some(t), Some(c)) if t == c => matches_template(&templt[1..], &name[1..]),
        _ => false,
    }
}
