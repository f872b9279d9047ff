//! Output sinks for `print`, `println`, `printf` and debug lines.
//!
//! A runtime holds two handlers: one standing in for stdout and one for
//! stderr (postfix `?` debug output, uncaught-error reports). Tests swap
//! both for buffers and assert on what was written.
//!
//! Generator workers print through the same handler as the main thread, so
//! every write is a single call on the underlying stream or buffer and a
//! line is never split between threads.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Which process stream a terminal handler writes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
}

impl Stream {
    fn write(self, text: &str) {
        // A closed pipe is not something a goose program can recover from
        // or report, so write failures are dropped.
        let _ = match self {
            Stream::Out => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes()).and_then(|()| out.flush())
            }
            Stream::Err => io::stderr().lock().write_all(text.as_bytes()),
        };
    }
}

pub enum PrintHandlerImpl {
    Terminal(Stream),
    /// Captures to a buffer (tests, embedding).
    Buffer(Mutex<String>),
    /// Discards everything.
    Silent,
}

impl PrintHandlerImpl {
    /// Write `msg` followed by a newline.
    pub fn println(&self, msg: &str) {
        match self {
            Self::Terminal(stream) => {
                let mut line = String::with_capacity(msg.len() + 1);
                line.push_str(msg);
                line.push('\n');
                stream.write(&line);
            }
            Self::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(msg);
                buffer.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Write `msg` as is. Stdout is flushed so a prompt shows up before
    /// the program reads a line.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Terminal(stream) => stream.write(msg),
            Self::Buffer(buffer) => buffer.lock().push_str(msg),
            Self::Silent => {}
        }
    }

    /// Everything captured so far; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.lock().clone(),
            Self::Terminal(_) | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Terminal(Stream::Out))
}

pub fn stderr_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Terminal(Stream::Err))
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests;
