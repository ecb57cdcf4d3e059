use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::models::quotation::Quotation;

pub fn record_line(quotation: &Quotation) -> String {
    format!("Dollar: {}\n", quotation.bid)
}

/// Appends one `Dollar: <bid>` line, creating the file if needed. Existing
/// lines are never touched.
pub fn append_record<P: AsRef<Path>>(path: P, quotation: &Quotation) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(record_line(quotation).as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn quotation(bid: &str) -> Quotation {
        Quotation {
            bid: bid.to_string(),
        }
    }

    #[test]
    fn creates_file_with_one_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotation.txt");

        append_record(&path, &quotation("5.43")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Dollar: 5.43\n");
    }

    #[test]
    fn appends_without_truncating() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotation.txt");
        fs::write(&path, "Dollar: 5.01\n").unwrap();

        append_record(&path, &quotation("5.4300")).unwrap();
        append_record(&path, &quotation("5.10")).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Dollar: 5.01\nDollar: 5.4300\nDollar: 5.10\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn new_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("quotation.txt");

        append_record(&path, &quotation("5.43")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }
}
