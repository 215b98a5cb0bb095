//! Aggregation and the plain-text report written to stdout.

use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::time::SystemTime;

use crate::{FileRecord, ScanRequest};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f %z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub count: usize,
    pub total_bytes: u64,
}

impl Summary {
    pub fn from_records(records: &[FileRecord]) -> Self {
        Self {
            count: records.len(),
            total_bytes: records.iter().map(|record| record.size_bytes).sum(),
        }
    }

    pub fn kilobytes(&self) -> u64 {
        self.total_bytes / 1024
    }

    /// Truncates twice, once per division.
    pub fn megabytes(&self) -> u64 {
        self.total_bytes / 1024 / 1024
    }
}

/// Local time in [`TIMESTAMP_FORMAT`], or the raw `SystemTime` when chrono cannot represent it.
pub fn format_time(time: SystemTime) -> String {
    let since_epoch = match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => chrono::Duration::from_std(after).ok(),
        Err(before) => chrono::Duration::from_std(before.duration()).ok().map(|d| -d),
    };
    since_epoch
        .and_then(|offset| DateTime::from_timestamp(0, 0)?.checked_add_signed(offset))
        .map(|utc| utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| format!("{:?}", time))
}

pub fn write_request<W: Write>(out: &mut W, request: &ScanRequest) -> io::Result<()> {
    writeln!(out, "targetPath = '{}'", request.root().display())?;
    writeln!(
        out,
        "earliestAccessTime = '{}'",
        format_time(request.cutoff())
    )
}

/// The count line, then the size lines unless nothing matched.
pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "found {} entries!", summary.count)?;
    if summary.count == 0 {
        return Ok(());
    }

    writeln!(out, "Total size = {}B", summary.total_bytes)?;
    writeln!(out, "Total size = {}KB", summary.kilobytes())?;
    writeln!(out, "Total size = {}MB", summary.megabytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::prelude::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn record(name: &str, size_bytes: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(name),
            size_bytes,
        }
    }

    fn render(summary: &Summary) -> String {
        let mut out = Vec::new();
        write_summary(&mut out, summary).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_of_example_scan() {
        let summary = Summary::from_records(&[record("a", 100)]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_bytes, 100);
        assert_eq!(summary.kilobytes(), 0);
        assert_eq!(summary.megabytes(), 0);
        assert_eq!(
            render(&summary),
            "found 1 entries!\nTotal size = 100B\nTotal size = 0KB\nTotal size = 0MB\n"
        );
    }

    #[test]
    fn test_zero_matches_print_only_count() {
        let summary = Summary::from_records(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(render(&summary), "found 0 entries!\n");
    }

    #[test]
    fn test_empty_files_still_print_sizes() {
        let summary = Summary::from_records(&[record("a", 0), record("b", 0)]);
        assert_eq!(
            render(&summary),
            "found 2 entries!\nTotal size = 0B\nTotal size = 0KB\nTotal size = 0MB\n"
        );
    }

    #[test]
    fn test_megabytes_truncate_per_division() {
        let summary = Summary {
            count: 1,
            total_bytes: 3 * 1024 * 1024 - 1,
        };
        assert_eq!(summary.kilobytes(), 3071);
        assert_eq!(summary.megabytes(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_format_time_out_of_calendar_range() {
        let far = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000_000_000_000);
        let text = format_time(far);
        assert!(text.contains("tv_sec"), "{}", text);
    }

    #[test]
    fn test_format_time_before_epoch() {
        let before = Local.with_ymd_and_hms(1965, 6, 15, 8, 0, 0).unwrap();
        assert_eq!(
            format_time(before.into()),
            before.format(TIMESTAMP_FORMAT).to_string()
        );
    }

    #[test]
    fn test_write_request_echoes_root_and_cutoff() {
        let cutoff = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let request = ScanRequest::with_cutoff("/var/log", cutoff);

        let mut out = Vec::new();
        write_request(&mut out, &request).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("targetPath = '/var/log'"));
        let cutoff_line = lines.next().unwrap();
        assert!(
            cutoff_line.starts_with("earliestAccessTime = '2024-03-01 12:30:05.000000000 "),
            "{}",
            cutoff_line
        );
        assert_eq!(lines.next(), None);
    }

    proptest! {
        #[test]
        fn proptest_summary_sums_sizes(sizes in proptest::collection::vec(0u64..(1 << 40), 0..50)) {
            let records: Vec<FileRecord> = sizes
                .iter()
                .enumerate()
                .map(|(i, size)| record(&format!("file_{}", i), *size))
                .collect();
            let summary = Summary::from_records(&records);

            let total: u64 = sizes.iter().sum();
            prop_assert_eq!(summary.count, sizes.len());
            prop_assert_eq!(summary.total_bytes, total);
            prop_assert_eq!(summary.kilobytes(), total / 1024);
            prop_assert_eq!(summary.megabytes(), (total / 1024) / 1024);
        }
    }
}
