//! Test utilities for the admission queue crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`; compiled
//! for tests and with the `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! Service code reads files only through `cap_std`; tests writing fixture
    //! files follow the same rule.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use admission_queue::test_support::cap_fs::write_file;
    ///
    /// let path = std::env::temp_dir().join("cap-fs-write-example.json");
    /// write_file(&path, b"{}")?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

mod doubles;
mod spreadsheet;

pub use doubles::{MutableClock, NoJitter, RecordingSleeper};
pub use spreadsheet::InMemorySpreadsheet;

pub use crate::outbound::memory::InMemoryStore;

use chrono::{DateTime, Utc};

use crate::domain::{Employee, EmployeeId, EmployeeStatus};

/// Employee fixture with a fresh id.
pub fn employee(full_name: &str, desk: Option<&str>, status: EmployeeStatus, now: DateTime<Utc>) -> Employee {
    Employee {
        id: EmployeeId::random(),
        full_name: full_name.to_owned(),
        desk: desk.map(str::to_owned),
        status,
        created_at: now,
    }
}
