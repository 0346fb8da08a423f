//! FITS header record parsing, lookup, and serialization.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::str;

use log::debug;

use crate::block::{
    blocks, records as block_records, BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE, HEADER_PAD_BYTE,
};
use crate::error::{Error, Result};
use crate::value::{parse_float, parse_integer, parse_logical, quote, split_comment, unquote};

// ── Types ──

/// One decoded 80-character header record.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRecord {
    /// Upper-cased keyword with padding removed. Empty for blank records.
    pub keyword: String,
    /// Value text with comment removed, surrounding quotes stripped and `''`
    /// unescaped. For commentary records this is the free text of columns 9-80.
    pub value: String,
    /// Text following the `/` delimiter, if any.
    pub comment: Option<String>,
    /// `true` when the value was written as a quoted string.
    pub quoted: bool,
}

/// Keywords whose records never carry a value indicator.
const COMMENTARY_KEYWORDS: [&str; 3] = ["COMMENT", "HISTORY", ""];

impl HeaderRecord {
    /// A numeric or logical record, written unquoted.
    pub fn new(keyword: &str, value: impl ToString) -> Self {
        Self {
            keyword: keyword.to_ascii_uppercase(),
            value: value.to_string(),
            comment: None,
            quoted: false,
        }
    }

    /// A string-valued record, written between single quotes.
    pub fn string(keyword: &str, value: &str) -> Self {
        Self {
            keyword: keyword.to_ascii_uppercase(),
            value: String::from(value),
            comment: None,
            quoted: true,
        }
    }

    /// A COMMENT, HISTORY, or blank record holding free text.
    pub fn commentary(keyword: &str, text: &str) -> Self {
        Self {
            keyword: keyword.to_ascii_uppercase(),
            value: String::from(text),
            comment: None,
            quoted: false,
        }
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(String::from(comment));
        self
    }

    /// Returns `true` for the END record.
    pub fn is_end(&self) -> bool {
        self.keyword == "END"
    }

    /// Returns `true` for COMMENT, HISTORY, and blank records.
    pub fn is_commentary(&self) -> bool {
        COMMENTARY_KEYWORDS.contains(&self.keyword.as_str())
    }

    /// The value text, or `None` when empty.
    pub fn as_str(&self) -> Option<&str> {
        (!self.value.is_empty()).then_some(self.value.as_str())
    }

    /// The value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        parse_integer(&self.value)
    }

    /// The value as a real number. Integers are promoted, and quoted numbers
    /// are accepted because several camera drivers write them that way.
    pub fn as_f64(&self) -> Option<f64> {
        parse_float(&self.value)
    }

    /// The value as a FITS logical.
    pub fn as_bool(&self) -> Option<bool> {
        if self.quoted {
            return None;
        }
        parse_logical(&self.value)
    }
}

/// The ordered header records of one HDU plus a keyword table.
///
/// Every record is retained in file order, duplicates included. Keyword lookup
/// resolves to the last record carrying that keyword.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    records: Vec<HeaderRecord>,
    index: BTreeMap<String, usize>,
}

impl Header {
    /// Build a header from records in file order. END records are dropped.
    pub fn from_records(records: Vec<HeaderRecord>) -> Self {
        let records: Vec<HeaderRecord> = records.into_iter().filter(|r| !r.is_end()).collect();
        let mut index = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            if let Some(previous) = index.insert(record.keyword.clone(), i) {
                if !record.is_commentary() {
                    debug!(
                        "duplicate keyword {} (records {} and {}); keeping the last",
                        record.keyword, previous, i
                    );
                }
            }
        }
        Self { records, index }
    }

    /// All records in file order.
    pub fn records(&self) -> &[HeaderRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the header holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct keywords.
    pub fn keyword_count(&self) -> usize {
        self.index.len()
    }

    /// Look up a keyword (case-insensitive). The last occurrence wins.
    pub fn get(&self, keyword: &str) -> Option<&HeaderRecord> {
        let key = keyword.to_ascii_uppercase();
        self.index.get(&key).map(|&i| &self.records[i])
    }

    /// Returns `true` if the keyword is present.
    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Non-empty string value of a keyword.
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderRecord::as_str)
    }

    /// Integer value of a keyword.
    pub fn get_i64(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(HeaderRecord::as_i64)
    }

    /// Real value of a keyword.
    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(HeaderRecord::as_f64)
    }

    /// Logical value of a keyword.
    pub fn get_bool(&self, keyword: &str) -> Option<bool> {
        self.get(keyword).and_then(HeaderRecord::as_bool)
    }

    /// First keyword among `keywords` that carries a real value.
    pub fn get_f64_any(&self, keywords: &[&str]) -> Option<f64> {
        keywords.iter().find_map(|k| self.get_f64(k))
    }

    /// First keyword among `keywords` that carries a non-empty string value.
    pub fn get_str_any(&self, keywords: &[&str]) -> Option<&str> {
        keywords.iter().find_map(|k| self.get_str(k))
    }

    /// Text of every COMMENT/HISTORY/blank record with the given keyword.
    pub fn commentary<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.records
            .iter()
            .filter(move |r| r.is_commentary() && r.keyword.eq_ignore_ascii_case(keyword))
            .map(|r| r.value.as_str())
    }
}

/// A parsed header and the cursor just past its final block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    pub header: Header,
    /// Absolute byte offset of the first data byte (block aligned).
    pub data_offset: usize,
}

// ── Parsing ──

/// Parse a single 80-byte header record.
pub fn parse_record(bytes: &[u8; CARD_SIZE]) -> Result<HeaderRecord> {
    if !bytes.is_ascii() {
        return Err(Error::MalformedHeader(String::from(
            "header record contains non-ASCII bytes",
        )));
    }
    let text = str::from_utf8(bytes)
        .map_err(|_| Error::MalformedHeader(String::from("header record is not text")))?;

    let keyword = text[..8].trim().to_ascii_uppercase();
    let rest = &text[8..];

    if keyword == "END" {
        return Ok(HeaderRecord::commentary("END", ""));
    }

    if COMMENTARY_KEYWORDS.contains(&keyword.as_str()) {
        return Ok(HeaderRecord::commentary(&keyword, rest.trim_end()));
    }

    if rest.starts_with('=') {
        return Ok(valued_record(keyword, &rest[1..]));
    }

    // Non-standard layouts such as HIERARCH put the indicator further right.
    if let Some(eq) = text.find('=') {
        let long_keyword = text[..eq].trim().to_ascii_uppercase();
        return Ok(valued_record(long_keyword, &text[eq + 1..]));
    }

    Ok(HeaderRecord::commentary(&keyword, rest.trim()))
}

fn valued_record(keyword: String, field: &str) -> HeaderRecord {
    let (value_part, comment) = split_comment(field);
    let (value, quoted) = unquote(value_part);
    HeaderRecord {
        keyword,
        value,
        comment: comment.map(String::from),
        quoted,
    }
}

/// Parse the header that starts at byte 0 of `data`.
pub fn parse_header(data: &[u8]) -> Result<ParsedHeader> {
    parse_header_at(data, 0)
}

/// Parse consecutive 2880-byte header blocks starting at `offset` until the
/// END record is found.
///
/// Only complete blocks are scanned. The returned `data_offset` is the end of
/// the block containing END, regardless of where END sits inside it.
pub fn parse_header_at(data: &[u8], offset: usize) -> Result<ParsedHeader> {
    let available = data.len().saturating_sub(offset);
    if available < BLOCK_SIZE {
        return Err(Error::MalformedHeader(format!(
            "need at least {BLOCK_SIZE} bytes for a header block, found {available}"
        )));
    }

    let mut records = Vec::new();
    for (block_idx, block) in blocks(&data[offset..]).enumerate() {
        for (card_idx, card) in block_records(block) {
            let record = parse_record(card).map_err(|e| match e {
                Error::MalformedHeader(detail) => Error::MalformedHeader(format!(
                    "{detail} (record {})",
                    block_idx * CARDS_PER_BLOCK + card_idx + 1
                )),
                other => other,
            })?;

            if record.is_end() {
                let data_offset = offset + (block_idx + 1) * BLOCK_SIZE;
                debug!(
                    "parsed {} header records in {} block(s); data starts at {}",
                    records.len(),
                    block_idx + 1,
                    data_offset
                );
                return Ok(ParsedHeader {
                    header: Header::from_records(records),
                    data_offset,
                });
            }
            records.push(record);
        }
    }

    Err(Error::MalformedHeader(String::from(
        "END record not found before end of buffer",
    )))
}

// ── Writing ──

/// Serialize a record into an 80-byte header record image.
///
/// Text beyond column 80 is truncated.
pub fn format_record(record: &HeaderRecord) -> [u8; CARD_SIZE] {
    let mut line = String::with_capacity(CARD_SIZE);

    if record.is_commentary() || record.is_end() {
        line.push_str(&format!("{:<8}{}", record.keyword, record.value));
    } else {
        if record.keyword.len() <= 8 {
            line.push_str(&format!("{:<8}= ", record.keyword));
        } else {
            line.push_str(&format!("{} = ", record.keyword));
        }
        if record.quoted {
            line.push_str(&quote(&record.value));
        } else {
            line.push_str(&format!("{:>20}", record.value));
        }
        if let Some(comment) = &record.comment {
            line.push_str(" / ");
            line.push_str(comment);
        }
    }

    let mut buf = [HEADER_PAD_BYTE; CARD_SIZE];
    let bytes = line.as_bytes();
    let len = bytes.len().min(CARD_SIZE);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Serialize records into complete header blocks.
///
/// Appends the END record and pads the final block with spaces. The returned
/// length is always a multiple of [`BLOCK_SIZE`].
pub fn serialize_header(records: &[HeaderRecord]) -> Vec<u8> {
    let total_cards = records.len() + 1;
    let total_blocks = total_cards.div_ceil(CARDS_PER_BLOCK);
    let mut buf = vec![HEADER_PAD_BYTE; total_blocks * BLOCK_SIZE];

    for (i, record) in records.iter().enumerate() {
        let offset = i * CARD_SIZE;
        buf[offset..offset + CARD_SIZE].copy_from_slice(&format_record(record));
    }

    let end_offset = records.len() * CARD_SIZE;
    buf[end_offset..end_offset + 3].copy_from_slice(b"END");
    buf
}

// ── Tests ──
