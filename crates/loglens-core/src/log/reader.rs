use crate::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Whether a log file has to be decompressed while reading
pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "gz")
}

/// Line-oriented reader over a plain or gzip-compressed log file
pub struct LogReader {
    inner: Box<dyn BufRead>,
}

impl LogReader {
    /// Open a log file, decompressing on the fly when the name ends in `.gz`
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening log file: {}", path.display());

        let file = File::open(path)?;
        let inner: Box<dyn BufRead> = if is_gzip(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self { inner })
    }

    /// Wrap an already opened source
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Self {
            inner: Box::new(BufReader::new(reader)),
        }
    }

    /// Raw lines without their terminator, in file order
    ///
    /// Lines are yielded as bytes so a single invalid UTF-8 line does not
    /// abort the pass.
    pub fn lines(self) -> impl Iterator<Item = io::Result<Vec<u8>>> {
        self.inner.split(b'\n').map(|line| {
            line.map(|mut bytes| {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                bytes
            })
        })
    }
}
