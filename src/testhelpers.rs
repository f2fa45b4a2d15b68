use std::fs;

use tempfile::Builder;

use crate::fitsio::{BLOCK_LEN, CARD_LEN};

/// Function to allow access to a temporary file
pub fn with_temp_file<F>(callback: F)
where
    F: for<'a> Fn(&'a str),
{
    let tdir = Builder::new().prefix("tbhdr-").tempdir().unwrap();
    let tdir_path = tdir.path();
    let filename = tdir_path.join("test.fits");

    let filename_str = filename.to_str().expect("cannot create string filename");
    callback(filename_str);
}

/// Minimal primary header with no data unit.
pub fn primary_cards() -> Vec<String> {
    vec![
        "SIMPLE  =                    T / file does conform to FITS standard".to_string(),
        "BITPIX  =                    8 / number of bits per data pixel".to_string(),
        "NAXIS   =                    0 / number of data axes".to_string(),
        "EXTEND  =                    T / FITS dataset may contain extensions".to_string(),
    ]
}

/// Binary table extension header describing `nrows` rows of `rowlen` bytes.
pub fn bintable_cards(rowlen: usize, nrows: usize) -> Vec<String> {
    vec![
        "XTENSION= 'BINTABLE'           / binary table extension".to_string(),
        "BITPIX  =                    8 / 8-bit bytes".to_string(),
        "NAXIS   =                    2 / 2-dimensional binary table".to_string(),
        format!("NAXIS1  = {rowlen:>20} / width of table in bytes"),
        format!("NAXIS2  = {nrows:>20} / number of rows in table"),
        "PCOUNT  =                    0 / size of special data area".to_string(),
        "GCOUNT  =                    1 / one data group (required keyword)".to_string(),
        "TFIELDS =                    1 / number of fields in each row".to_string(),
    ]
}

/// Pad the records to 80 columns, append END, and fill out the last block.
pub fn header_bytes(cards: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for card in cards {
        let mut record = card.as_bytes().to_vec();
        record.resize(CARD_LEN, b' ');
        bytes.extend_from_slice(&record);
    }

    let mut end = b"END".to_vec();
    end.resize(CARD_LEN, b' ');
    bytes.extend_from_slice(&end);

    let padded = bytes.len().div_ceil(BLOCK_LEN) * BLOCK_LEN;
    bytes.resize(padded, b' ');
    bytes
}

/// Data unit of `len` bytes, zero filled to a whole block.
pub fn data_bytes(len: usize) -> Vec<u8> {
    vec![0; len.div_ceil(BLOCK_LEN) * BLOCK_LEN]
}

/// Write a primary header followed by a binary table extension whose
/// header holds the extra `cards`.
pub fn write_table_file(filename: &str, cards: &[String]) {
    let mut table = bintable_cards(4, 3);
    table.extend(cards.iter().cloned());

    let mut bytes = header_bytes(&primary_cards());
    bytes.extend(header_bytes(&table));
    bytes.extend(data_bytes(12));

    fs::write(filename, bytes).unwrap();
}
