use super::FileSource;

pub const LINE_BUFFER_LEN: usize = 128;

/// Assembles text lines out of a byte-oriented file with one fixed buffer.
///
/// Lines end at `\n` (a preceding `\r` is dropped); the final line needs no
/// terminator. A line that outgrows the buffer is discarded up to its end,
/// as is any line that is not UTF-8 — the parsers treat unreadable input as
/// absent rather than fatal. Read errors end the stream.
pub struct LineReader<F: FileSource> {
    file: F,
    buf: [u8; LINE_BUFFER_LEN],
    len: usize,
    consumed: usize,
    eof: bool,
    discarding: bool,
}

impl<F: FileSource> LineReader<F> {
    pub fn new(file: F) -> Self {
        LineReader {
            file,
            buf: [0; LINE_BUFFER_LEN],
            len: 0,
            consumed: 0,
            eof: false,
            discarding: false,
        }
    }

    pub fn next_line(&mut self) -> Option<&str> {
        let end = loop {
            if self.consumed > 0 {
                self.buf.copy_within(self.consumed..self.len, 0);
                self.len -= self.consumed;
                self.consumed = 0;
            }

            if let Some(pos) = self.buf[..self.len].iter().position(|&b| b == b'\n') {
                self.consumed = pos + 1;
                let end = if pos > 0 && self.buf[pos - 1] == b'\r' {
                    pos - 1
                } else {
                    pos
                };
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                if core::str::from_utf8(&self.buf[..end]).is_err() {
                    debug!("skipping non-utf8 line");
                    continue;
                }
                break end;
            }

            if self.eof {
                if self.len == 0 || self.discarding {
                    return None;
                }
                let end = self.len;
                self.consumed = self.len;
                if core::str::from_utf8(&self.buf[..end]).is_err() {
                    return None;
                }
                break end;
            }

            if self.len == self.buf.len() {
                // No newline fits: drop this line wholesale.
                debug!("skipping overlong line");
                self.discarding = true;
                self.len = 0;
                continue;
            }

            match self.file.read(&mut self.buf[self.len..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.len += n,
                Err(_) => {
                    warn!("read failed, treating as end of file");
                    self.eof = true;
                }
            }
        };

        core::str::from_utf8(&self.buf[..end]).ok()
    }
}
