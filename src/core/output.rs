use crate::domain::model::MemoryQueryResult;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// Compact JSON with a space after each separator: `["Paris", "Lyon"]`.
/// Non-ASCII characters are written as `\uXXXX` escapes (UTF-16 code units).
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut ascii_start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[ascii_start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            ascii_start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[ascii_start..])
    }
}

pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    let json = String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(json)
}

/// Renders a non-empty recall result.
///
/// A limit of one yields the top text as-is; anything else yields a JSON array
/// of every text in store order, with `null` for records that carry no text.
pub fn render_recall(results: &[MemoryQueryResult], limit: usize) -> Result<String> {
    if limit == 1 {
        let top = results
            .first()
            .and_then(|r| r.text.clone())
            .unwrap_or_default();
        return Ok(top);
    }

    let texts: Vec<Option<&str>> = results.iter().map(|r| r.text.as_deref()).collect();
    to_spaced_json(&texts)
}
