use std::fmt;

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// A log record forwarded over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<5} [{}] {}", self.level, self.target, self.message)
    }
}

/// A [`log::Log`] implementation that forwards records to whoever holds the receiver, typically
/// the main loop, which prints them between frames.
pub struct ChannelLogger {
    sender: Sender<LogMessage>,
    level: Level,
}

impl ChannelLogger {
    pub fn new(sender: Sender<LogMessage>, level: Level) -> Self {
        Self { sender, level }
    }

    /// A logger at `level` and the receiving end of its channel.
    pub fn with_receiver(level: Level) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, level), receiver)
    }

    /// Install this logger as the global logger.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let filter = self.level.to_level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }

    /// The most verbose level this logger forwards.
    pub fn level(&self) -> LevelFilter {
        self.level.to_level_filter()
    }
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A dropped receiver means nobody is listening any more.
            let _ = self.sender.try_send(LogMessage {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}
