use crate::history::History;
use crate::jobs::JobTable;
use crate::prelude::*;
use nix::unistd::{gethostname, getuid, User};

/// Identity bits gathered once at startup, plus the `cd -` memory.
#[derive(Debug, Clone)]
pub struct ShellMeta {
	home: PathBuf,
	user: String,
	host: String,
	prev_dir: Option<PathBuf>,
}

impl ShellMeta {
	pub fn home(&self) -> &Path {
		&self.home
	}

	pub fn user(&self) -> &str {
		&self.user
	}

	pub fn host(&self) -> &str {
		&self.host
	}
}

/// All mutable shell state: identity, the job table and command history.
/// One instance lives for the whole session and is threaded through every
/// builtin and the executor.
pub struct Shell {
	meta: ShellMeta,
	jobs: JobTable,
	history: History,
}

impl Shell {
	/// The directory the shell starts in is "home" for prompt collapsing
	/// and for bare `hop`, matching a shell whose anchor is its launch
	/// directory rather than $HOME.
	pub fn new(hist_path: PathBuf) -> ShResult<Self> {
		let home = env::current_dir()?;
		let user = User::from_uid(getuid())
			.ok()
			.flatten()
			.map(|u| u.name)
			.unwrap_or_else(|| "?".into());
		let host = gethostname()
			.ok()
			.and_then(|h| h.into_string().ok())
			.unwrap_or_else(|| "?".into());
		Ok(Self {
			meta: ShellMeta { home, user, host, prev_dir: None },
			jobs: JobTable::new(),
			history: History::load(hist_path),
		})
	}

	pub fn meta(&self) -> &ShellMeta {
		&self.meta
	}

	pub fn jobs(&self) -> &JobTable {
		&self.jobs
	}

	pub fn jobs_mut(&mut self) -> &mut JobTable {
		&mut self.jobs
	}

	pub fn history(&self) -> &History {
		&self.history
	}

	pub fn history_mut(&mut self) -> &mut History {
		&mut self.history
	}

	pub fn prev_dir(&self) -> Option<&Path> {
		self.meta.prev_dir.as_deref()
	}

	/// Change directory, remembering where we came from for `hop -`.
	pub fn change_dir(&mut self, target: &Path) -> ShResult<()> {
		let from = env::current_dir()?;
		env::set_current_dir(target)?;
		self.meta.prev_dir = Some(from);
		Ok(())
	}
}

/// Give the terminal to a process group. No-op when stdin is not a tty
/// (tests, pipes), since tcsetpgrp would fail with ENOTTY there.
pub fn attach_tty(pgid: Pid) {
	unsafe {
		if libc::isatty(STDIN_FILENO) == 1 {
			let _ = libc::tcsetpgrp(STDIN_FILENO, pgid.as_raw());
		}
	}
}
