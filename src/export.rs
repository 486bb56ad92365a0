use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use logwire_logs::ArcLogEvent;

/// File name for an export taken now, e.g. `logwire_20240115_103000.log`
pub fn default_filename() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("logwire_{}.log", timestamp))
}

/// Write events newest first, one `timestamp [LEVEL]: message` record each.
/// Multi-line messages are written verbatim.
pub fn export_events(path: &Path, events: &[ArcLogEvent]) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    for event in events {
        writeln!(
            out,
            "{} [{}]: {}",
            event.timestamp,
            event.level.label(),
            event.message
        )?;
    }
    out.flush()?;

    Ok(events.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use logwire_types::{Level, LogEvent};

    use super::*;

    #[test]
    fn test_export_writes_verbatim_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        let events = vec![
            Arc::new(LogEvent::new(Level::Query, "SELECT 1\nFROM dual", "10:00:02")),
            Arc::new(LogEvent::new(Level::Info, "started", "10:00:01")),
        ];

        let count = export_events(&path, &events).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "10:00:02 [QUERY]: SELECT 1\nFROM dual\n10:00:01 [INFO]: started\n"
        );
    }

    #[test]
    fn test_default_filename_shape() {
        let name = default_filename();
        let name = name.to_string_lossy();
        assert!(name.starts_with("logwire_"));
        assert!(name.ends_with(".log"));
    }
}
