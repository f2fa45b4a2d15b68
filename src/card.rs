use log::debug;
use memchr::memchr;

use crate::errmsg::ErrorStack;
use crate::error::{FitsError, Result};
use crate::fitsio::{CARD_LEN, FLEN_COMMENT, FLEN_VALUE};

/// The (value, comment) pair parsed from one header record.
///
/// `value` is the literal text of the value field; a string value keeps its
/// enclosing quotes.  Both are empty when the record has no value indicator
/// and no comment text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub value: String,
    pub comment: String,
}

/// Keyword classes, a subset of those reported by CFITSIO's `ffgkcl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// COMMENT, HISTORY, and the blank keyword
    Commentary,
    Continue,
    End,
    /// keywords that describe the structure of the HDU
    Structural,
    User,
}

impl KeyClass {
    /// Classify a keyword name.  The name is compared case-insensitively, as
    /// CFITSIO does after upper-casing the card.
    pub fn of(keyword: &str) -> KeyClass {
        let name = keyword.trim_end().to_ascii_uppercase();

        match name.as_str() {
            "" | "COMMENT" | "HISTORY" => KeyClass::Commentary,
            "CONTINUE" => KeyClass::Continue,
            "END" => KeyClass::End,
            "SIMPLE" | "XTENSION" | "BITPIX" | "NAXIS" | "EXTEND" | "PCOUNT" | "GCOUNT"
            | "TFIELDS" | "GROUPS" => KeyClass::Structural,
            _ if keyword.starts_with(' ') => KeyClass::Commentary,
            _ if name
                .strip_prefix("NAXIS")
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())) =>
            {
                KeyClass::Structural
            }
            _ => KeyClass::User,
        }
    }
}

/// One header record, stored with trailing blanks removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    text: String,
}

impl Card {
    /// Build a card from the text of one header record.  The text must be
    /// printable ASCII and no longer than 80 characters.
    pub fn new(text: &str) -> Result<Card> {
        if text.len() > CARD_LEN || !text.bytes().all(|b| (b' '..=b'~').contains(&b)) {
            let start: String = text.chars().take(20).collect();
            return Err(FitsError::BadKeyChar { card: start });
        }

        Ok(Card {
            text: text.trim_end_matches(' ').to_string(),
        })
    }

    pub(crate) fn from_record(record: &[u8]) -> Result<Card> {
        match std::str::from_utf8(record) {
            Ok(text) => Card::new(text),
            Err(_) => Err(FitsError::BadKeyChar {
                card: String::from_utf8_lossy(&record[..record.len().min(20)]).into_owned(),
            }),
        }
    }

    /// The record text without trailing blanks.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Name of the keyword in this card.  For ESO HIERARCH cards this is the
    /// text between `HIERARCH` and the `=`; otherwise the leading run of
    /// characters up to a blank or `=`.
    pub fn keyword(&self) -> &str {
        let text = self.text.as_str();

        if let Some(rest) = text.strip_prefix("HIERARCH ") {
            return match memchr(b'=', rest.as_bytes()) {
                Some(eq) => rest[..eq].trim_matches(' '),
                /* this probably indicates an error, so just return FITS name */
                None => "HIERARCH",
            };
        }

        let end = text
            .bytes()
            .position(|b| b == b' ' || b == b'=')
            .unwrap_or(text.len());
        &text[..end]
    }

    pub fn class(&self) -> KeyClass {
        if self.text.is_empty() || self.text.starts_with(' ') {
            return KeyClass::Commentary;
        }
        KeyClass::of(self.keyword())
    }

    /// ParSe the Value and Comment strings from the card.
    ///
    /// If the card contains a quoted string value, the returned value string
    /// includes the enclosing quote characters.  A string value that is
    /// missing its closing quote is closed and accepted; a message is left
    /// on `errors`.
    pub fn split_value_comment(&self, errors: &mut ErrorStack) -> Result<RawEntry> {
        let card = self.text.as_bytes();
        let cardlen = card.len();
        let mut entry = RawEntry::default();

        let valpos = if let Some(rest) = card.strip_prefix(b"HIERARCH ") {
            match memchr(b'=', rest) {
                Some(eq) => 9 + eq + 1,
                None => return Ok(self.no_value_entry()),
            }
        } else if cardlen < 9
            || card.starts_with(b"COMMENT ")
            || card.starts_with(b"HISTORY ")
            || card.starts_with(b"END     ")
            || card.starts_with(b"CONTINUE")
            || card.starts_with(b"        ")
        {
            /* keywords with no value */
            return Ok(self.no_value_entry());
        } else if &card[8..10.min(cardlen)] == b"= " {
            /* normal keyword with '= ' in cols 9-10 */
            10
        } else {
            match memchr(b'=', card) {
                Some(eq) => eq + 1, /* point to the position after the '=' */
                None => return Ok(self.no_value_entry()),
            }
        };

        let nblank = leading_blanks(&card[valpos..]);
        if valpos + nblank == cardlen {
            /* the absence of a value string is legal, and simply indicates
            that the keyword value is undefined. */
            return Ok(entry);
        }

        let mut ii = valpos + nblank;

        match card[ii] {
            b'/' => {
                /* slash indicates start of the comment */
                ii += 1;
            }
            b'\'' => {
                entry.value.push('\'');
                ii += 1;
                let mut closed = false;

                while ii < cardlen && entry.value.len() < FLEN_VALUE - 1 {
                    if card[ii] == b'\'' {
                        if card.get(ii + 1) == Some(&b'\'') {
                            /* 2 successive quotes */
                            entry.value.push_str("''");
                            ii += 2;
                            continue;
                        }
                        entry.value.push('\'');
                        ii += 1;
                        closed = true;
                        break;
                    }
                    entry.value.push(card[ii] as char);
                    ii += 1;
                }

                if !closed {
                    /* don't exceed 70 char string length */
                    entry.value.truncate(FLEN_VALUE - 2);
                    entry.value.push('\'');
                    debug!("string value of {} has no closing quote", self.keyword());
                    errors.push("This keyword string value has no closing quote:");
                    errors.push(&self.text);
                }
            }
            b'(' => {
                /* is this a complex value? */
                let close = memchr(b')', &card[ii..]);
                match close {
                    Some(n) if n < FLEN_VALUE - 1 => {
                        entry.value.push_str(&self.text[ii..=ii + n]);
                        ii += n + 1;
                    }
                    _ => {
                        errors.push("This complex keyword value has no closing ')' within range:");
                        errors.push(&self.text);
                        return Err(FitsError::NoClosingQuote {
                            card: self.text.clone(),
                        });
                    }
                }
            }
            _ => {
                /*  an integer, floating point, or logical FITS value string  */
                let token = card[ii..]
                    .iter()
                    .position(|&b| b == b' ' || b == b'/')
                    .unwrap_or(cardlen - ii)
                    .min(FLEN_VALUE - 1);
                entry.value.push_str(&self.text[ii..ii + token]);
                ii += token;
            }
        }

        /*  now find the comment string, if any  */
        ii += leading_blanks(&card[ii.min(cardlen)..]);

        if ii < cardlen {
            if card[ii] == b'/' {
                /*  ignore the slash separator and the following space  */
                ii += 1;
                if card.get(ii) == Some(&b' ') {
                    ii += 1;
                }
            }
            entry.comment = self.text[ii.min(cardlen)..]
                .chars()
                .take(FLEN_COMMENT - 1)
                .collect::<String>()
                .trim_end_matches(' ')
                .to_string();
        }

        Ok(entry)
    }

    /*  no value, so the comment extends from cols 9 - 80  */
    fn no_value_entry(&self) -> RawEntry {
        let comment = match self.text.get(8..) {
            Some(rest) => rest.trim_end_matches(' ').to_string(),
            None => String::new(),
        };
        RawEntry {
            value: String::new(),
            comment,
        }
    }
}

fn leading_blanks(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| b == b' ').count()
}
