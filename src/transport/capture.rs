use std::{
    fmt::Display,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    time::Instant,
};

/// Direction of a captured report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Report received from the host
    Received,
    /// Report sent to the host
    Sent,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Received => write!(f, "rx"),
            Direction::Sent => write!(f, "tx"),
        }
    }
}

/// Appends every raw report to a writer, one line per report:
/// `<elapsed seconds> <direction> <hex bytes>`
pub struct CaptureLog<W: Write = BufWriter<File>> {
    writer: W,
    start: Instant,
}

impl CaptureLog {
    /// Create or truncate the capture file at the given path
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        log::info!("Capturing reports to {}", path.display());
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CaptureLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            start: Instant::now(),
        }
    }

    pub fn record(&mut self, direction: Direction, data: &[u8]) -> io::Result<()> {
        let elapsed = self.start.elapsed().as_secs_f64();
        writeln!(
            self.writer,
            "{elapsed:.6} {direction} {}",
            format_hex(data)
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Format bytes as lowercase hex pairs separated by spaces
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<String>>()
        .join(" ")
}
