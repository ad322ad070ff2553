use core::fmt;

/// Collects text until a newline or until `N` bytes are pending, then emits it.
#[derive(Debug)]
pub struct LineBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    const NOT_EMPTY: () = assert!(N > 0, "line buffer needs room for one byte");

    #[must_use]
    pub const fn new() -> Self {
        let () = Self::NOT_EMPTY;
        Self { buf: [0; N], len: 0 }
    }

    /// Bytes waiting for the end of their line.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Append `bytes`, handing every completed chunk to `emit`.
    ///
    /// A chunk ends after a newline or when the buffer is full.
    pub fn push(&mut self, bytes: &[u8], mut emit: impl FnMut(&[u8])) {
        for &b in bytes {
            self.buf[self.len] = b;
            self.len += 1;
            if b == b'\n' || self.len == N {
                emit(&self.buf[..self.len]);
                self.len = 0;
            }
        }
    }

    /// Emit whatever is pending, even without a trailing newline.
    pub fn flush(&mut self, mut emit: impl FnMut(&[u8])) {
        if self.len > 0 {
            emit(&self.buf[..self.len]);
            self.len = 0;
        }
    }

    /// Format `args` into the buffer.
    ///
    /// # Errors
    /// Only if a `Display` impl inside `args` fails.
    pub fn write_fmt_with(
        &mut self,
        args: fmt::Arguments<'_>,
        emit: impl FnMut(&[u8]),
    ) -> fmt::Result {
        struct Writer<'a, const N: usize, F> {
            buffer: &'a mut LineBuffer<N>,
            emit: F,
        }

        impl<const N: usize, F: FnMut(&[u8])> fmt::Write for Writer<'_, N, F> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.buffer.push(s.as_bytes(), &mut self.emit);
                Ok(())
            }
        }

        fmt::write(&mut Writer { buffer: self, emit }, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<const N: usize>(buffer: &mut LineBuffer<N>, text: &str) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        buffer.push(text.as_bytes(), |chunk| lines.push(chunk.to_vec()));
        lines
    }

    #[test]
    fn emits_complete_lines_only() {
        let mut buffer = LineBuffer::<64>::new();
        let lines = collect(&mut buffer, "PASS: a\nPASS: b\nSUMM");
        assert_eq!(lines, [b"PASS: a\n".to_vec(), b"PASS: b\n".to_vec()]);
        assert_eq!(buffer.pending(), b"SUMM");
    }

    #[test]
    fn splits_overlong_lines() {
        let mut buffer = LineBuffer::<4>::new();
        let lines = collect(&mut buffer, "abcdefg\n");
        assert_eq!(lines, [b"abcd".to_vec(), b"efg\n".to_vec()]);
        assert!(buffer.pending().is_empty());
    }

    #[test]
    fn flush_sends_partial_line() {
        let mut buffer = LineBuffer::<16>::new();
        assert!(collect(&mut buffer, "EXIT").is_empty());
        let mut flushed = Vec::new();
        buffer.flush(|chunk| flushed.extend_from_slice(chunk));
        assert_eq!(flushed, b"EXIT");
        buffer.flush(|_| panic!("nothing pending"));
    }

    #[test]
    fn formats_arguments() {
        let mut buffer = LineBuffer::<32>::new();
        let mut out = Vec::new();
        buffer
            .write_fmt_with(format_args!("EXIT: STATUS={}\n", (1 << 1) | 1), |chunk| {
                out.extend_from_slice(chunk);
            })
            .unwrap();
        assert_eq!(out, b"EXIT: STATUS=3\n");
    }
}
