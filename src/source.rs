/// Line-oriented input consumed by [`Record::parse`](crate::record::Record::parse)
use std::io::{self, BufRead};
use tracing::warn;

/// A readable source delivering one line at a time.
///
/// Lines keep their terminator when they had one. The end of the data is
/// reported as `Ok(None)`, never as an error.
pub trait LineSource {
    /// Reads the next line, keeping at most `max_len` characters before the
    /// terminator.
    fn next_line(&mut self, max_len: usize) -> io::Result<Option<String>>;
}

/// Reads through `fill_buf`/`consume`, so a line far past the bound is
/// skipped without being buffered whole.
impl<R: BufRead> LineSource for R {
    fn next_line(&mut self, max_len: usize) -> io::Result<Option<String>> {
        // Enough bytes for `max_len` characters of any width
        let keep = max_len.saturating_mul(4);
        let mut bytes = Vec::new();
        let mut seen = false;
        let mut terminated = false;
        let mut dropped = 0;

        while !terminated {
            let available = match self.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if available.is_empty() {
                break;
            }
            seen = true;

            let (chunk, used) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    terminated = true;
                    (&available[..end], end + 1)
                }
                None => (available, available.len()),
            };
            let room = keep.saturating_sub(bytes.len()).min(chunk.len());
            bytes.extend_from_slice(&chunk[..room]);
            dropped += chunk.len() - room;
            self.consume(used);
        }

        if !seen {
            return Ok(None);
        }
        if dropped > 0 {
            // The byte cut may split the last character
            if let Err(err) = std::str::from_utf8(&bytes) {
                if err.error_len().is_none() {
                    bytes.truncate(err.valid_up_to());
                }
            }
        }

        let mut line = String::from_utf8(bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        if terminated {
            line.push('\n');
        }
        Ok(Some(bound_with(line, max_len, dropped)))
    }
}

/// Cuts a physical line down to `max_len` characters.
///
/// The remainder of the line is discarded rather than handed out as the next
/// line, so an over-long line never shifts the following address blocks.
pub fn bound_line(line: String, max_len: usize) -> String {
    bound_with(line, max_len, 0)
}

fn bound_with(mut line: String, max_len: usize, dropped: usize) -> String {
    let terminated = line.ends_with('\n');
    let body_len = line.len() - usize::from(terminated);

    let cut = match line[..body_len].char_indices().nth(max_len) {
        Some((cut, _)) => cut,
        None if dropped == 0 => return line,
        None => body_len,
    };

    warn!(
        "input line longer than {} characters, dropping {} bytes",
        max_len,
        dropped + body_len - cut
    );
    line.truncate(cut);
    if terminated {
        line.push('\n');
    }
    line
}
