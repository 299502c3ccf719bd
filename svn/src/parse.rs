//! Parsers for the tool's two output shapes: the line-oriented status
//! listing and the XML log export.

use crate::types::{FileStatus, FileStatusEntry, LogEntry};
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    /// The tool's output could not be interpreted. Callers can distinguish
    /// this from legitimately empty output (which parses to zero entries).
    #[error("malformed tool output: {detail}")]
    Malformed { detail: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a `status` listing into entries.
///
/// Each non-blank line carries a seven-column flag field followed by the
/// path, which starts at column nine and is trimmed. Only the first flag
/// column is classified. Lines whose flag is unrecognized produce no entry:
/// conflict and external markers are deliberately dropped rather than
/// surfaced, since consumers only act on the statuses the engine tracks.
pub fn parse_status(raw: &str) -> Vec<FileStatusEntry> {
    let mut entries = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let flag = match line.chars().next() {
            Some(c) => c,
            None => continue,
        };

        let status = FileStatus::from_flag(flag);
        if status == FileStatus::Unknown {
            continue;
        }

        let path = match line.get(8..) {
            Some(rest) => rest.trim(),
            None => continue,
        };
        if path.is_empty() {
            continue;
        }

        entries.push(FileStatusEntry::new(path, status));
    }

    entries
}

#[derive(Default)]
struct PendingEntry {
    revision: u64,
    author: String,
    message: String,
    date: Option<DateTime<Utc>>,
}

enum TextField {
    None,
    Author,
    Date,
    Message,
}

/// Parse a `log --xml` export into entries for `path`.
///
/// The export is a `<log>` root holding `<logentry revision="...">` nodes
/// with `<author>`, `<date>` and `<msg>` children. Entry ordering (newest
/// first) is preserved exactly as emitted. A log with zero entries is valid
/// and parses to an empty sequence; anything that is not a well-formed log
/// document fails with [`ParseError::Malformed`] instead of silently
/// yielding a partial result.
pub fn parse_log(raw: &str, path: &str) -> ParseResult<Vec<LogEntry>> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut saw_root = false;
    let mut pending: Option<PendingEntry> = None;
    let mut field = TextField::None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => match element.name().as_ref() {
                b"log" => saw_root = true,
                b"logentry" => {
                    if !saw_root {
                        return Err(malformed("logentry outside <log> root"));
                    }
                    let revision = element
                        .try_get_attribute("revision")
                        .map_err(|e| malformed(&format!("bad logentry attributes: {}", e)))?
                        .ok_or_else(|| malformed("logentry missing revision attribute"))?;
                    let revision = revision
                        .unescape_value()
                        .map_err(|e| malformed(&format!("bad revision attribute: {}", e)))?
                        .parse::<u64>()
                        .map_err(|_| malformed("revision attribute is not a number"))?;
                    pending = Some(PendingEntry {
                        revision,
                        ..PendingEntry::default()
                    });
                }
                b"author" => field = TextField::Author,
                b"date" => field = TextField::Date,
                b"msg" => field = TextField::Message,
                _ => {}
            },
            Ok(Event::Empty(element)) => {
                if element.name().as_ref() == b"log" {
                    saw_root = true;
                }
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| malformed(&format!("bad text content: {}", e)))?;
                if let Some(entry) = pending.as_mut() {
                    match field {
                        TextField::Author => entry.author.push_str(&value),
                        TextField::Message => entry.message.push_str(&value),
                        TextField::Date => {
                            let parsed = DateTime::parse_from_rfc3339(value.trim())
                                .map_err(|_| malformed("unparseable date"))?;
                            entry.date = Some(parsed.with_timezone(&Utc));
                        }
                        TextField::None => {}
                    }
                }
            }
            Ok(Event::End(element)) => match element.name().as_ref() {
                b"logentry" => {
                    let entry =
                        pending.take().ok_or_else(|| malformed("unmatched </logentry>"))?;
                    let timestamp = entry.date.ok_or_else(|| malformed("logentry missing date"))?;
                    entries.push(LogEntry {
                        revision: entry.revision,
                        author: entry.author,
                        message: entry.message,
                        timestamp,
                        path: path.to_string(),
                    });
                }
                b"author" | b"date" | b"msg" => field = TextField::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(&e.to_string())),
        }
    }

    if !saw_root {
        return Err(malformed("missing <log> root element"));
    }
    if pending.is_some() {
        return Err(malformed("unterminated logentry"));
    }

    Ok(entries)
}

fn malformed(detail: &str) -> ParseError {
    ParseError::Malformed {
        detail: detail.to_string(),
    }
}
