use std::fmt::Display;

use nix::errno::Errno;
use rustyline::error::ReadlineError;

pub type ShResult<T> = Result<T, ShError>;

/// Crate-wide error type.
///
/// `Syntax` carries the pipeline parser's descriptive message; the message may
/// be empty when there is nothing more specific to say than "Invalid Syntax!",
/// which the sequencer prints either way.
#[derive(Debug)]
pub enum ShError {
	Io(std::io::Error),
	ErrNo(Errno),
	Syntax(String),
	InternalErr(String),
	Readline(ReadlineError),
}

impl ShError {
	pub fn syntax(msg: impl Into<String>) -> Self {
		Self::Syntax(msg.into())
	}

	pub fn internal(msg: impl Into<String>) -> Self {
		Self::InternalErr(msg.into())
	}

	pub fn from_io() -> Self {
		Self::Io(std::io::Error::last_os_error())
	}
}

impl Display for ShError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ShError::Io(error) => write!(f, "I/O Error: {}", error),
			ShError::ErrNo(no) => write!(f, "ERRNO: {}", no),
			ShError::Syntax(msg) => write!(f, "{}", msg),
			ShError::InternalErr(msg) => write!(f, "Internal Error: {}", msg),
			ShError::Readline(error) => write!(f, "{}", error),
		}
	}
}

impl From<std::io::Error> for ShError {
	fn from(value: std::io::Error) -> Self {
		Self::Io(value)
	}
}

impl From<Errno> for ShError {
	fn from(value: Errno) -> Self {
		Self::ErrNo(value)
	}
}

impl From<ReadlineError> for ShError {
	fn from(value: ReadlineError) -> Self {
		Self::Readline(value)
	}
}
