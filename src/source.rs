//! Leaf producers: where the bytes of a run come from.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{ConvertError, reserve_total};
use crate::stage::Producer;

/// Hands out one command argument per pull, whatever size was asked for.
pub struct ArgumentSource {
    args: std::vec::IntoIter<String>,
    current: String,
}

impl ArgumentSource {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        Self {
            args: args.into_iter(),
            current: String::new(),
        }
    }
}

impl Producer for ArgumentSource {
    fn pull(&mut self, _size: usize) -> Result<Option<&[u8]>, ConvertError> {
        match self.args.next() {
            Some(arg) => {
                self.current = arg;
                Ok(Some(self.current.as_bytes()))
            }
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "ARGS"
    }
}

/// Reads one line per pull, terminator included, at most `size` bytes.
///
/// A line longer than `size` comes out in several pieces.
pub struct LineSource<R> {
    reader: R,
    line: Vec<u8>,
    eof: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            eof: false,
        }
    }
}

impl<R: BufRead> Producer for LineSource<R> {
    fn pull(&mut self, size: usize) -> Result<Option<&[u8]>, ConvertError> {
        if self.eof {
            return Ok(None);
        }
        let size = size.max(1);
        self.line.clear();
        reserve_total(&mut self.line, size)?;

        while self.line.len() < size {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                break;
            }
            let room = &available[..available.len().min(size - self.line.len())];
            let (take, complete) = match room.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (room.len(), false),
            };
            self.line.extend_from_slice(&room[..take]);
            self.reader.consume(take);
            if complete {
                break;
            }
        }

        if self.line.is_empty() {
            self.eof = true;
            return Ok(None);
        }
        Ok(Some(&self.line))
    }

    fn name(&self) -> &str {
        "LINES"
    }
}

/// Reads raw bytes, at most `size` per pull.
pub struct RawFileSource<R> {
    reader: R,
    buffer: Vec<u8>,
    eof: bool,
}

impl<R: Read> RawFileSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            eof: false,
        }
    }
}

impl<R: Read> Producer for RawFileSource<R> {
    fn pull(&mut self, size: usize) -> Result<Option<&[u8]>, ConvertError> {
        if self.eof {
            return Ok(None);
        }
        reserve_total(&mut self.buffer, size)?;
        self.buffer.resize(size, 0);

        // Fill as far as the reader allows, as fread does.
        let mut filled = 0;
        while filled < size {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            self.eof = true;
            return Ok(None);
        }
        Ok(Some(&self.buffer[..filled]))
    }

    fn name(&self) -> &str {
        "RAW"
    }
}

/// Open a named input for reading; `-` is standard input.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, ConvertError> {
    if path.as_os_str() == "-" {
        debug!("reading standard input");
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading file");
    Ok(Box::new(BufReader::new(file)))
}
