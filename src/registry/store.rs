//! Append-only member log.
//!
//! One record per line, `identity,displayName`. Records are split on the
//! first comma, so display names may contain commas.

use crate::models::{Member, MemberId};
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed member log.
#[derive(Debug, Clone)]
pub struct MemberLog {
    path: PathBuf,
}

impl MemberLog {
    /// Create a log handle. The file is created on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every well-formed record. A missing file yields no records.
    pub fn load(&self) -> Result<Vec<Member>> {
        if !self.path.exists() {
            debug!("Member log {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read(&self.path)
            .with_context(|| format!("Failed to read member log: {}", self.path.display()))?;

        let mut members = Vec::new();
        for (number, raw) in content.split(|b| *b == b'\n').enumerate() {
            let record = std::str::from_utf8(raw).ok().map(|line| line.trim_end_matches('\r'));
            if record.is_some_and(|line| line.trim().is_empty()) {
                continue;
            }
            match record.and_then(parse_record) {
                Some(member) => members.push(member),
                None => warn!(
                    "Skipping malformed record on line {} of {}",
                    number + 1,
                    self.path.display()
                ),
            }
        }

        Ok(members)
    }

    /// Append one record and flush it to disk.
    pub fn append(&self, member: &Member) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open member log: {}", self.path.display()))?;

        // A torn previous write must not swallow this record.
        let separator = if ends_with_newline(&mut file)? { "" } else { "\n" };

        writeln!(file, "{}{}", separator, format_record(member))
            .and_then(|_| file.sync_data())
            .with_context(|| format!("Failed to append to member log: {}", self.path.display()))
    }
}

/// True for an empty file or one whose last byte is a newline.
fn ends_with_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata().context("Failed to stat member log")?.len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .context("Failed to read member log tail")?;
    Ok(last[0] == b'\n')
}

/// Format a member as a log line (without the trailing newline).
pub fn format_record(member: &Member) -> String {
    let name: String = member
        .display_name
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{},{}", member.id, name)
}

/// Parse a log line. Returns `None` for malformed lines.
pub fn parse_record(line: &str) -> Option<Member> {
    let (id, name) = line.split_once(',')?;
    let id = id.trim().parse::<i64>().ok()?;
    Some(Member::new(MemberId(id), name))
}
