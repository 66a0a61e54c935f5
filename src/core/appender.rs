//! Appender trait for log output destinations

use super::{error::Result, log_event::LogEvent};

pub trait Appender: Send {
    fn append(&mut self, event: &LogEvent) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;

    /// Release resources at shutdown; the appender receives no further events
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}
