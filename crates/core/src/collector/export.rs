//! Block list export to a timestamped JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::blocklist::BlocklistEntry;

use super::{CollectError, ProfileCollector};

#[derive(Serialize)]
struct ExportedEntry<'a> {
    id: String,
    screen_name: &'a str,
    name: &'a str,
    description: &'a str,
    location: &'a str,
}

impl<'a> From<&'a BlocklistEntry> for ExportedEntry<'a> {
    fn from(entry: &'a BlocklistEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            screen_name: &entry.screen_name,
            name: &entry.name,
            description: &entry.description,
            location: &entry.location,
        }
    }
}

pub fn export_file_name(at: DateTime<Local>) -> String {
    at.format("blocklist-%Y.%m.%d-%H.%M.%S.json").to_string()
}

/// Write `entries` into `dir` as a tab-indented JSON array. Ids are strings.
pub fn write_export(
    entries: &[BlocklistEntry],
    dir: &Path,
    at: DateTime<Local>,
) -> Result<PathBuf, CollectError> {
    let exported: Vec<ExportedEntry<'_>> = entries.iter().map(ExportedEntry::from).collect();

    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    exported
        .serialize(&mut serializer)
        .map_err(|e| CollectError::Json(e.to_string()))?;

    let path = dir.join(export_file_name(at));
    std::fs::write(&path, buf).map_err(|e| CollectError::Io(format!("{}: {}", path.display(), e)))?;

    Ok(path)
}

impl ProfileCollector {
    /// Export the block list joined with stored profiles into `dir`.
    pub fn export_blocklist(&self, dir: &Path) -> Result<PathBuf, CollectError> {
        if !dir.is_dir() {
            return Err(CollectError::InvalidTarget(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let entries = self.blocklist.entries()?;
        let at = Utc
            .timestamp_opt(self.ctx.clock.now_unix(), 0)
            .single()
            .unwrap_or_else(Utc::now)
            .with_timezone(&Local);

        let path = write_export(&entries, dir, at)?;
        info!(path = %path.display(), count = entries.len(), "Block list exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    #[test]
    fn test_export_file_name() {
        let at = local(2024, 3, 7, 9, 5, 2);
        assert_eq!(export_file_name(at), "blocklist-2024.03.07-09.05.02.json");
    }

    #[test]
    fn test_write_export_uses_tabs_and_string_ids() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![BlocklistEntry {
            id: 18446744073709551615,
            screen_name: "someone".to_string(),
            name: "Some One".to_string(),
            description: "bio".to_string(),
            location: "".to_string(),
        }];

        let path = write_export(&entries, dir.path(), local(2024, 1, 2, 3, 4, 5)).unwrap();
        assert!(path.ends_with("blocklist-2024.01.02-03.04.05.json"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n\t{"));
        assert!(content.contains("\"id\": \"18446744073709551615\""));

        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0]["screen_name"], "someone");
    }

    #[test]
    fn test_write_export_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(&[], dir.path(), local(2024, 1, 2, 3, 4, 5)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }
}
