use chrono::Utc;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum LogLevel {
    Info(Color),
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl Color {
    fn to_ansi_code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Blue => "\x1b[34m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::Magenta => "\x1b[35m",
            Color::White => "\x1b[37m",
        }
    }
}

/// Where the formatted lines end up.
#[derive(Debug, Clone)]
enum LogSink {
    File(PathBuf),
    Memory(Arc<Mutex<Vec<String>>>),
}

#[derive(Debug, Clone)]
pub struct Logger {
    sink: LogSink,
    to_console: bool,
}

impl Logger {
    /// Creates a new `Logger` writing to `<log_dir>/<name>.log`.
    ///
    /// # Parameters
    /// - `log_dir`: Path to an existing directory where the log file should be created.
    /// - `name`: Name of the component, used as the log file name.
    /// - `to_console`: Whether every line is also echoed to stdout.
    ///
    /// # Returns
    /// A new `Logger` instance, or an error if the directory is invalid.
    pub fn new(log_dir: &Path, name: &str, to_console: bool) -> Result<Self, LoggerError> {
        if !log_dir.is_dir() {
            return Err(LoggerError::InvalidPath(format!(
                "{} is not a directory.",
                log_dir.display()
            )));
        }

        let sanitized_name = name.replace([':', '/', ' '], "_");
        let log_file = log_dir.join(format!("{}.log", sanitized_name));

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_file)?;

        Ok(Logger {
            sink: LogSink::File(log_file),
            to_console,
        })
    }

    /// Creates a `Logger` that keeps every line in memory.
    ///
    /// Lines can be read back with [`Logger::lines`].
    pub fn in_memory(to_console: bool) -> Self {
        Logger {
            sink: LogSink::Memory(Arc::new(Mutex::new(Vec::new()))),
            to_console,
        }
    }

    /// Returns the lines logged so far. File loggers read their file back.
    pub fn lines(&self) -> Result<Vec<String>, LoggerError> {
        match &self.sink {
            LogSink::File(path) => Ok(std::fs::read_to_string(path)?
                .lines()
                .map(str::to_string)
                .collect()),
            LogSink::Memory(buffer) => buffer
                .lock()
                .map(|lines| lines.clone())
                .map_err(|_| LoggerError::Poisoned),
        }
    }

    // Generic method for writing log messages
    fn log(&self, level: LogLevel, message: &str) -> Result<(), LoggerError> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let log_message = match &level {
            LogLevel::Info(_) => format!("[INFO] [{}]: {}", timestamp, message),
            LogLevel::Warn => format!("[WARN] [{}]: {}", timestamp, message),
            LogLevel::Error => format!("[ERROR] [{}]: {}", timestamp, message),
        };

        if self.to_console {
            let colored_message = match &level {
                LogLevel::Info(color) => format!("{}{}\x1b[0m", color.to_ansi_code(), log_message),
                LogLevel::Warn => format!("\x1b[93m{}\x1b[0m", log_message), // Bright Yellow
                LogLevel::Error => format!("\x1b[91m{}\x1b[0m", log_message), // Bright Red
            };
            println!("{}", colored_message);
            io::stdout().flush()?;
        }

        match &self.sink {
            LogSink::File(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{}", log_message)?;
                file.flush()?;
            }
            LogSink::Memory(buffer) => {
                buffer
                    .lock()
                    .map_err(|_| LoggerError::Poisoned)?
                    .push(log_message);
            }
        }

        Ok(())
    }

    /// Logs an informational message.
    ///
    /// # Parameters
    /// - `message`: The informational message to log.
    /// - `color`: The color to use for the console output.
    pub fn info(&self, message: &str, color: Color) -> Result<(), LoggerError> {
        self.log(LogLevel::Info(color), message)
    }

    /// Logs a warning message.
    pub fn warn(&self, message: &str) -> Result<(), LoggerError> {
        self.log(LogLevel::Warn, message)
    }

    /// Logs an error message.
    pub fn error(&self, message: &str) -> Result<(), LoggerError> {
        self.log(LogLevel::Error, message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid Path: {0}")]
    InvalidPath(String),
    #[error("Log buffer lock poisoned")]
    Poisoned,
}
