use std::collections::VecDeque;
use std::io::{self, Read};

/// Size of a single read from the underlying stream.
const CHUNK_SIZE: usize = 4096;

/// Buffered reader with explicit push-back.
///
/// Bytes are pulled from the underlying stream in chunks and held in a
/// pending queue. [`unread`](Self::unread) puts consumed-but-unprocessed
/// bytes back at the front of that queue, so the next read replays them
/// before anything else. Nothing read ahead is ever dropped while the
/// reader is alive; [`into_parts`](Self::into_parts) hands the leftovers
/// back to the caller.
pub struct PushbackReader<R> {
    inner: R,
    pending: VecDeque<u8>,
}

impl<R> PushbackReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
        }
    }

    /// Push `bytes` back so they are returned, in order, by the next reads.
    pub fn unread(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.pending.push_front(byte);
        }
    }

    /// Number of bytes waiting to be replayed.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Release the underlying stream together with any unconsumed bytes.
    pub fn into_parts(self) -> (R, Vec<u8>) {
        (self.inner, self.pending.into())
    }
}

impl<R: Read> PushbackReader<R> {
    /// Pull one chunk from the underlying stream. Returns 0 on EOF.
    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.pending.extend(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read a single byte, or `None` once the stream is exhausted.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pending.is_empty() && self.fill()? == 0 {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }

    /// Read one line terminated by `\n`, without the `\r\n` / `\n` ending.
    ///
    /// EOF before the terminator is [`io::ErrorKind::UnexpectedEof`]. With
    /// `max_len` set, a line longer than that (terminator excluded) is
    /// [`io::ErrorKind::InvalidData`]; the bytes already taken are dropped.
    pub fn read_line(&mut self, max_len: Option<usize>) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            match self.read_byte()? {
                Some(b'\n') => {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    return Ok(line);
                }
                Some(byte) => {
                    // One extra byte of slack for the `\r` of a CRLF ending.
                    if let Some(max) = max_len
                        && line.len() > max
                    {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("line exceeds {max} bytes"),
                        ));
                    }
                    line.push(byte);
                }
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream closed mid-line",
                    ));
                }
            }
        }
    }

    /// Lazy byte-by-byte view of the stream.
    ///
    /// Ends (`None`) when the stream is exhausted; a read failure is yielded
    /// once as `Some(Err(_))` and then the scan ends too. Dropping the scan
    /// part-way leaves the remaining bytes in place, so a new scan resumes
    /// exactly where the previous one stopped.
    pub fn scan(&mut self) -> Scan<'_, R> {
        Scan {
            reader: self,
            done: false,
        }
    }
}

impl<R: Read> Read for PushbackReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pending.is_empty() {
            if buf.len() >= CHUNK_SIZE {
                return self.inner.read(buf);
            }
            if self.fill()? == 0 {
                return Ok(0);
            }
        }
        let n = buf.len().min(self.pending.len());
        for (dst, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *dst = byte;
        }
        Ok(n)
    }
}

/// Iterator returned by [`PushbackReader::scan`].
pub struct Scan<'a, R> {
    reader: &'a mut PushbackReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Scan<'_, R> {
    type Item = io::Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_byte() {
            Ok(Some(byte)) => Some(Ok(byte)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_bytes_are_replayed_first() {
        let mut reader = PushbackReader::new(&b"cdef"[..]);
        let mut head = [0u8; 2];
        reader.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"cd");

        reader.unread(b"ab");
        reader.unread(b"cd");
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"cdabef");
    }

    #[test]
    fn read_line_strips_crlf() {
        let mut reader = PushbackReader::new(&b"RTSP/1.0 200 OK\r\nCSeq: 1\n\r\n"[..]);
        assert_eq!(reader.read_line(None).unwrap(), b"RTSP/1.0 200 OK");
        assert_eq!(reader.read_line(None).unwrap(), b"CSeq: 1");
        assert_eq!(reader.read_line(None).unwrap(), b"");
    }

    #[test]
    fn read_line_length_bound() {
        let mut reader = PushbackReader::new(&b"CSeq: 1\r\nCSeq: 12\r\n"[..]);
        assert_eq!(reader.read_line(Some(7)).unwrap(), b"CSeq: 1");
        let err = reader.read_line(Some(7)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn read_line_bound_stops_endless_line() {
        let endless = vec![b'A'; 64 * 1024];
        let mut reader = PushbackReader::new(&endless[..]);
        let err = reader.read_line(Some(1024)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(reader.buffered() < endless.len());
    }

    #[test]
    fn read_line_eof_mid_line() {
        let mut reader = PushbackReader::new(&b"RTSP/1.0 200"[..]);
        let err = reader.read_line(None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn scan_resumes_after_drop() {
        let mut reader = PushbackReader::new(&b"xx$yy"[..]);
        let pos = reader.scan().position(|b| matches!(b, Ok(b'$')));
        assert_eq!(pos, Some(2));
        let rest: Vec<u8> = reader.scan().map(|b| b.unwrap()).collect();
        assert_eq!(rest, b"yy");
        assert!(reader.scan().next().is_none());
    }

    #[test]
    fn into_parts_returns_leftovers() {
        let mut reader = PushbackReader::new(&b"abc"[..]);
        assert_eq!(reader.read_byte().unwrap(), Some(b'a'));
        let (_, leftovers) = reader.into_parts();
        assert_eq!(leftovers, b"bc");
    }
}
