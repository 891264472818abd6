use crate::config::{IndexConfig, ReadConfig};
use crate::error::RunError;
use crate::execute::{self, Report};
use crate::source::{bound_line, LineSource};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

use tokio::{
    fs::File,
    io::{stdin, AsyncBufReadExt, AsyncRead, BufReader},
    sync::{mpsc, oneshot},
};

const LINE_CHANNEL_CAPACITY: usize = 100;

/// What to do with the address blocks read from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Unique,
    Duplicates,
    Lookup { probe: PathBuf },
}

/// Line source fed by the reader task.
///
/// Blocks the calling thread while waiting, so it must be driven from a
/// blocking task. Once the interrupt fires, lines still queued are ignored.
pub struct ChannelLines {
    receiver: mpsc::Receiver<io::Result<String>>,
    interrupt: oneshot::Receiver<()>,
    interrupted: bool,
}

impl ChannelLines {
    fn new(
        receiver: mpsc::Receiver<io::Result<String>>,
        interrupt: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            receiver,
            interrupt,
            interrupted: false,
        }
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    fn check_interrupt(&mut self) -> bool {
        if !self.interrupted && self.interrupt.try_recv().is_ok() {
            debug!("interrupt received, ending input");
            self.interrupted = true;
        }
        self.interrupted
    }
}

impl LineSource for ChannelLines {
    fn next_line(&mut self, max_len: usize) -> io::Result<Option<String>> {
        if self.check_interrupt() {
            return Ok(None);
        }
        match self.receiver.blocking_recv() {
            Some(line) => line.map(|line| Some(bound_line(line, max_len))),
            None => {
                // The reader also stops on interrupt
                self.check_interrupt();
                Ok(None)
            }
        }
    }
}

/// Outcome of [`process_input`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Processed {
    pub report: Report,

    /// Reading stopped early on ctrl-c
    pub interrupted: bool,
}

/// Streams `input` (stdin when `None`) through `mode`, writing to `sink`.
///
/// One task reads lines and forwards them over a channel, a blocking task
/// parses and indexes them. Ctrl-c stops both through oneshot signals; blocks
/// read so far are still reported.
pub async fn process_input<W>(
    input: Option<PathBuf>,
    mode: Mode,
    read: ReadConfig,
    config: IndexConfig,
    mut sink: W,
) -> Result<Processed, RunError>
where
    W: Write + Send + 'static,
{
    let (send, recv) = mpsc::channel::<io::Result<String>>(LINE_CHANNEL_CAPACITY);
    let (interrupt_tx, interrupt_rx) = oneshot::channel::<()>();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let ctrl_c_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = interrupt_tx.send(());
                let _ = stop_tx.send(());
            }
            Err(err) => warn!("cannot listen for ctrl-c: {}", err),
        }
    });

    let read_task = tokio::spawn(async move {
        match input {
            Some(path) => match File::open(&path).await {
                Ok(file) => read_lines(BufReader::new(file), &send, stop_rx).await,
                Err(err) => {
                    warn!("cannot open {}: {}", path.display(), err);
                    let _ = send.send(Err(err)).await;
                }
            },
            None => read_lines(BufReader::new(stdin()), &send, stop_rx).await,
        }
    });

    let process_task = tokio::task::spawn_blocking(move || {
        let mut source = ChannelLines::new(recv, interrupt_rx);
        let report = process_lines(&mut source, &mode, &read, config, &mut sink)?;
        sink.flush().map_err(RunError::Output)?;
        Ok::<_, RunError>(Processed {
            report,
            interrupted: source.interrupted(),
        })
    });

    let processed = process_task.await?;
    match &processed {
        Ok(done) if !done.interrupted => read_task.await?,
        _ => {
            debug!("input abandoned, stopping reader");
            read_task.abort();
        }
    }
    ctrl_c_task.abort();
    processed
}

fn process_lines<W: Write>(
    source: &mut ChannelLines,
    mode: &Mode,
    read: &ReadConfig,
    config: IndexConfig,
    sink: &mut W,
) -> Result<Report, RunError> {
    match mode {
        Mode::Unique => execute::unique(source, sink, read, config),
        Mode::Duplicates => execute::duplicates(source, sink, read, config),
        Mode::Lookup { probe } => {
            let file = std::fs::File::open(probe).map_err(|source| RunError::Open {
                path: probe.clone(),
                source,
            })?;
            let mut probes = io::BufReader::new(file);
            execute::lookup(source, &mut probes, sink, read, config)
        }
    }
}

/// Forwards lines until end of input, a read error, a closed channel or a
/// stop signal. A dropped stop sender does not count as a stop.
async fn read_lines<R: AsyncRead + Unpin>(
    mut reader: BufReader<R>,
    send: &mpsc::Sender<io::Result<String>>,
    stop: oneshot::Receiver<()>,
) {
    let stopped = async move {
        if stop.await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(stopped);

    loop {
        let mut line = String::new();
        let read = tokio::select! {
            () = &mut stopped => {
                debug!("reader stopped");
                break;
            }
            read = reader.read_line(&mut line) => read,
        };
        let (input, failed) = match read {
            Ok(0) => break,
            Ok(_) => (Ok(line), false),
            Err(err) => (Err(err), true),
        };
        if send.send(input).await.is_err() || failed {
            break;
        }
    }
}
