pub use std::{
	collections::HashMap,
	env,
	ffi::{CStr, CString},
	fmt::{self, Display},
	io::{self, Write},
	os::fd::RawFd,
	path::{Path, PathBuf},
	time::Duration
};

pub use libc::{
	mode_t,
	STDIN_FILENO,
	STDOUT_FILENO,
	O_APPEND,
	O_CREAT,
	O_RDONLY,
	O_TRUNC,
	O_WRONLY
};
pub use nix::{
	errno::Errno,
	sys::{
		signal::{
			kill,
			killpg,
			Signal
		},
		wait::{
			waitpid,
			WaitPidFlag,
			WaitStatus
		}
	}, unistd::{
		execvp,
		fork,
		getpgrp,
		getpid,
		setpgid,
		ForkResult,
		Pid
	}
};

pub use crate::error::{ShError, ShResult};
