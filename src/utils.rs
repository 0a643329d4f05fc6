// src/utils.rs
use crate::types::GuesserError;
use log::warn;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};

/// Streams wordlist labels one line at a time.
///
/// Lines are raw bytes; anything that is not UTF-8 is decoded lossily
/// instead of aborting the scan halfway through.
pub struct Wordlist {
    path: PathBuf,
    reader: Box<dyn AsyncBufRead + Send + Unpin>,
    line: Vec<u8>,
}

impl Wordlist {
    /// Open `path` for reading; `-` means standard input.
    pub async fn open(path: &Path) -> Result<Self, GuesserError> {
        if path == Path::new("-") {
            return Ok(Self::from_reader(path, BufReader::new(io::stdin())));
        }

        let file = File::open(path)
            .await
            .map_err(|source| GuesserError::WordlistError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_reader(path, BufReader::new(file)))
    }

    pub fn from_reader<R>(path: &Path, reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self {
            path: path.to_path_buf(),
            reader: Box::new(reader),
            line: Vec::new(),
        }
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for label in labels {
            text.push_str(label.as_ref());
            text.push('\n');
        }
        Self::from_reader(Path::new("<memory>"), Cursor::new(text.into_bytes()))
    }

    /// Next non-blank label, trimmed. `None` once the input is exhausted.
    pub async fn next_label(&mut self) -> Result<Option<String>, GuesserError> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.line)
                .await
                .map_err(|source| GuesserError::WordlistError {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }

            let label = String::from_utf8_lossy(&self.line);
            if let Cow::Owned(_) = label {
                warn!("{}: line is not valid UTF-8, using {:?}", self.path.display(), label.trim());
            }

            let label = label.trim();
            if !label.is_empty() {
                return Ok(Some(label.to_string()));
            }
        }
    }
}

/// Join a wordlist label with the target domain.
pub fn candidate_name(label: &str, domain: &str) -> String {
    format!("{}.{}", label, domain)
}

/// Lowercase and strip surrounding whitespace and the root label.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}

/// Check if a string is a valid domain
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}
