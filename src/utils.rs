use crate::prelude::*;

bitflags::bitflags! {
	#[derive(Debug,Clone,Copy,PartialEq,Eq)]
	pub struct ExecFlags: u32 {
		const BACKGROUND = 0b00000001;
	}
}

/// Thin owning wrapper around a raw file descriptor.
///
/// All pipe and redirection plumbing in the orchestrator goes through this so
/// every descriptor has exactly one owner and an explicit `close()` point.
/// Standard descriptors (0/1/2) are never actually closed, only forgotten.
#[derive(Debug, PartialEq, Eq)]
pub struct SmartFd {
	fd: RawFd,
}

impl SmartFd {
	pub fn new(fd: RawFd) -> ShResult<Self> {
		if fd < 0 {
			return Err(ShError::internal(format!("Attempted to wrap an invalid fd: {}", fd)));
		}
		Ok(Self { fd })
	}

	/// A connected (read, write) pipe pair.
	pub fn pipe() -> ShResult<(Self, Self)> {
		let mut fds = [0; 2];
		let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
		if result < 0 {
			return Err(ShError::from_io());
		}
		Ok((Self { fd: fds[0] }, Self { fd: fds[1] }))
	}

	pub fn open(path: &CStr, flags: i32, mode: mode_t) -> ShResult<Self> {
		let fd = unsafe { libc::open(path.as_ptr(), flags, mode as libc::c_uint) };
		if fd < 0 {
			return Err(ShError::from_io());
		}
		Ok(Self { fd })
	}

	/// Read side of /dev/null, used to detach background stdin from the tty.
	pub fn devnull() -> ShResult<Self> {
		Self::open(c"/dev/null", O_RDONLY, 0)
	}

	/// Duplicate this descriptor onto `target`.
	pub fn dup2_to(&self, target: RawFd) -> ShResult<()> {
		if self.fd == target {
			return Ok(());
		}
		if !self.is_valid() || target < 0 {
			return Err(ShError::internal("dup2 on an invalid fd"));
		}
		if unsafe { libc::dup2(self.fd, target) } < 0 {
			return Err(ShError::from_io());
		}
		Ok(())
	}

	pub fn close(&mut self) -> ShResult<()> {
		if !self.is_valid() {
			return Ok(());
		}
		if matches!(self.fd, 0 | 1 | 2) {
			self.fd = -1;
			return Ok(());
		}
		let result = unsafe { libc::close(self.fd) };
		self.fd = -1;
		if result < 0 {
			return Err(ShError::from_io());
		}
		Ok(())
	}

	pub fn as_raw_fd(&self) -> RawFd {
		self.fd
	}

	pub fn is_valid(&self) -> bool {
		self.fd >= 0
	}
}

impl Display for SmartFd {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.fd)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pipe_ends_are_valid_and_close_invalidates() {
		let (mut r, mut w) = SmartFd::pipe().unwrap();
		assert!(r.is_valid());
		assert!(w.is_valid());
		assert_ne!(r.as_raw_fd(), w.as_raw_fd());
		w.close().unwrap();
		assert!(!w.is_valid());
		// Closing twice is fine.
		w.close().unwrap();
		r.close().unwrap();
	}

	#[test]
	fn devnull_opens_readable() {
		let mut fd = SmartFd::devnull().unwrap();
		assert!(fd.is_valid());
		let mut buf = [0u8; 8];
		let n = unsafe { libc::read(fd.as_raw_fd(), buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
		assert_eq!(n, 0);
		fd.close().unwrap();
	}

	#[test]
	fn standard_descriptors_are_never_closed() {
		let mut fd = SmartFd::new(1).unwrap();
		fd.close().unwrap();
		assert!(!fd.is_valid());
		// stdout must still work after "closing" the wrapper.
		assert!(unsafe { libc::fcntl(1, libc::F_GETFD) } >= 0);
	}
}
