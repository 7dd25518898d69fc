//! Loading and saving the schedule files.
//!
//! Loading never fails: a missing file means "nothing saved yet" and broken
//! lines are skipped with a warning. Saving reports I/O errors to the caller
//! but leaves the in-memory collection untouched either way.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec::{self, PATTERN_HEADER, SCHEDULE_HEADER};
use crate::config::{AgendaConfig, DEFAULT_PATTERNS_FILE, DEFAULT_SCHEDULES_FILE};
use crate::error::AgendaResult;
use crate::manager::ScheduleManager;

/// The pair of files one agenda lives in.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    schedules_path: PathBuf,
    patterns_path: PathBuf,
}

/// Outcome of [`ScheduleStore::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub patterns: usize,
    pub schedules: usize,
    /// Schedules whose origin pattern was not found; their lineage was cleared
    pub orphaned: usize,
    pub warnings: Vec<LineWarning>,
}

/// A persisted line that was skipped.
#[derive(Debug, Clone)]
pub struct LineWarning {
    pub path: PathBuf,
    /// 1-based
    pub line_number: usize,
    pub reason: String,
}

impl fmt::Display for LineWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.path.display(),
            self.line_number,
            self.reason
        )
    }
}

/// Outcome of [`ScheduleStore::save`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub patterns: usize,
    pub schedules: usize,
}

impl ScheduleStore {
    /// Store using the default file names inside `dir`.
    pub fn new(dir: &Path) -> Self {
        ScheduleStore {
            schedules_path: dir.join(DEFAULT_SCHEDULES_FILE),
            patterns_path: dir.join(DEFAULT_PATTERNS_FILE),
        }
    }

    pub fn from_config(config: &AgendaConfig) -> Self {
        ScheduleStore {
            schedules_path: config.schedules_path(),
            patterns_path: config.patterns_path(),
        }
    }

    pub fn schedules_path(&self) -> &Path {
        &self.schedules_path
    }

    pub fn patterns_path(&self) -> &Path {
        &self.patterns_path
    }

    /// Reads patterns first, then schedules, then clears any lineage pointer
    /// that names a pattern which was not loaded.
    pub fn load(&self) -> (ScheduleManager, LoadReport) {
        let mut manager = ScheduleManager::new();
        let mut report = LoadReport::default();

        for (line_number, line) in read_records(&self.patterns_path, &mut report) {
            match codec::decode_pattern(&line) {
                Ok(pattern) => {
                    manager.add(pattern);
                    report.patterns += 1;
                }
                Err(e) => skip(&mut report, &self.patterns_path, line_number, e),
            }
        }

        for (line_number, line) in read_records(&self.schedules_path, &mut report) {
            match codec::decode_schedule(&line) {
                Ok(schedule) => {
                    manager.add(schedule);
                    report.schedules += 1;
                }
                Err(e) => skip(&mut report, &self.schedules_path, line_number, e),
            }
        }

        let detached = manager.detach_orphans();
        if !detached.is_empty() {
            warn!(
                count = detached.len(),
                "schedules referenced unknown recurring patterns and were detached"
            );
        }
        report.orphaned = detached.len();

        info!(
            patterns = report.patterns,
            schedules = report.schedules,
            skipped = report.warnings.len(),
            "loaded agenda"
        );

        (manager, report)
    }

    /// Writes both files, replacing whatever was there.
    ///
    /// Both files are written to temporary siblings first and only renamed
    /// into place once both writes succeeded, so a failed save leaves the
    /// previous pair on disk.
    pub fn save(&self, manager: &ScheduleManager) -> AgendaResult<SaveReport> {
        let schedules = manager.regular_schedules();
        let patterns = manager.recurrence_patterns();

        let schedule_lines: Vec<String> =
            schedules.iter().map(|s| codec::encode_schedule(s)).collect();
        let pattern_lines: Vec<String> =
            patterns.iter().map(|p| codec::encode_pattern(p)).collect();

        let schedules_temp = write_temp(&self.schedules_path, SCHEDULE_HEADER, &schedule_lines)?;
        let patterns_temp = match write_temp(&self.patterns_path, PATTERN_HEADER, &pattern_lines) {
            Ok(temp) => temp,
            Err(e) => {
                discard(&schedules_temp);
                return Err(e);
            }
        };

        // Patterns before the schedules that point at them
        if let Err(e) = std::fs::rename(&patterns_temp, &self.patterns_path) {
            discard(&patterns_temp);
            discard(&schedules_temp);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&schedules_temp, &self.schedules_path) {
            discard(&schedules_temp);
            return Err(e.into());
        }

        let report = SaveReport {
            patterns: patterns.len(),
            schedules: schedules.len(),
        };
        info!(
            patterns = report.patterns,
            schedules = report.schedules,
            "saved agenda"
        );
        Ok(report)
    }
}

/// Record lines of `path` with their 1-based line numbers.
/// An unreadable file yields whatever was read before the failure.
fn read_records(path: &Path, report: &mut LoadReport) -> Vec<(usize, String)> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no saved file, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open file");
            report.warnings.push(LineWarning {
                path: path.to_path_buf(),
                line_number: 0,
                reason: format!("could not open file: {}", e),
            });
            return Vec::new();
        }
    };

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                line_number += 1;
                let line = decode_line(&buf, path, line_number, report);
                if codec::is_record(&line) {
                    records.push((line_number, line));
                }
            }
            Err(e) => {
                skip(report, path, line_number + 1, e);
                break;
            }
        }
    }
    records
}

/// UTF-8 when possible. Anything else is read as Latin-1, which older
/// files written with a platform charset usually are.
fn decode_line(bytes: &[u8], path: &Path, line_number: usize, report: &mut LoadReport) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(line) => line.to_string(),
        Err(_) => {
            let warning = LineWarning {
                path: path.to_path_buf(),
                line_number,
                reason: "not valid UTF-8, read as Latin-1".to_string(),
            };
            warn!("{}", warning);
            report.warnings.push(warning);
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

fn skip(report: &mut LoadReport, path: &Path, line_number: usize, reason: impl fmt::Display) {
    let warning = LineWarning {
        path: path.to_path_buf(),
        line_number,
        reason: reason.to_string(),
    };
    warn!("skipping {}", warning);
    report.warnings.push(warning);
}

/// Writes `<path>.tmp` and returns its path. Nothing is left behind on failure.
fn write_temp(path: &Path, header: &str, lines: &[String]) -> AgendaResult<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut content = String::with_capacity(header.len() + lines.len() * 48);
    content.push_str(header);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }

    let temp = temp_path(path);
    if let Err(e) = std::fs::write(&temp, content) {
        discard(&temp);
        return Err(e.into());
    }
    Ok(temp)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

fn discard(temp: &Path) {
    if let Err(e) = std::fs::remove_file(temp) {
        if e.kind() != ErrorKind::NotFound {
            debug!(path = %temp.display(), error = %e, "could not remove temp file");
        }
    }
}
