use crate::builtin;
use crate::jobs::STOPPED_STATUS;
use crate::parse::{Pipeline, Redir, RedirKind, Stage};
use crate::prelude::*;
use crate::shellenv::{self, Shell};
use crate::signal;
use crate::utils::{ExecFlags, SmartFd};

/// Outcome of a foreground wait. A stop is its own variant so callers can
/// react to it; `code()` projects it onto the 128+SIGTSTP convention when
/// only an integer status fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
	Exited(i32),
	Stopped,
}

impl CommandStatus {
	pub fn code(self) -> i32 {
		match self {
			CommandStatus::Exited(code) => code,
			CommandStatus::Stopped => STOPPED_STATUS,
		}
	}
}

/// Everything a child needs, allocated before fork. The post-fork child in
/// a multi-threaded test harness may only call async-signal-safe functions,
/// so all CString building happens here in the parent.
struct StagePrep {
	program: CString,
	argv: Vec<CString>,
	redirs: Vec<Redir>,
	is_builtin: bool,
	plain_argv: Vec<String>,
}

fn prep_stage(stage: &Stage) -> ShResult<StagePrep> {
	let mut argv = vec![];
	for arg in &stage.argv {
		argv.push(CString::new(arg.as_str()).map_err(|_| ShError::syntax(""))?);
	}
	Ok(StagePrep {
		program: argv[0].clone(),
		argv,
		redirs: stage.redirs.clone(),
		is_builtin: builtin::lookup(&stage.argv[0]).is_some(),
		plain_argv: stage.argv.clone(),
	})
}

/// Apply a stage's redirections in declaration order. Returns false after
/// printing the diagnostic if a file cannot be opened.
fn apply_redirs(redirs: &[Redir]) -> bool {
	for redir in redirs {
		let Ok(path) = CString::new(redir.path.as_str()) else {
			eprintln!("No such file or directory");
			return false;
		};
		let opened = match redir.kind {
			RedirKind::Input => SmartFd::open(&path, libc::O_RDONLY, 0),
			RedirKind::OutputTrunc => {
				SmartFd::open(&path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC, 0o644)
			}
			RedirKind::OutputAppend => {
				SmartFd::open(&path, libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND, 0o644)
			}
		};
		let target = if redir.kind == RedirKind::Input { STDIN_FILENO } else { STDOUT_FILENO };
		match opened {
			Ok(mut fd) => {
				if fd.dup2_to(target).is_err() {
					eprintln!("No such file or directory");
					return false;
				}
				let _ = fd.close();
			}
			Err(_) => {
				if redir.kind == RedirKind::Input {
					eprintln!("No such file or directory");
				} else {
					eprintln!("Unable to create file for writing");
				}
				return false;
			}
		}
	}
	true
}

fn child_exit(code: i32) -> ! {
	let _ = std::io::stdout().flush();
	let _ = std::io::stderr().flush();
	std::process::exit(code)
}

/// Fork and wire up every stage of the pipeline. All children join one
/// fresh process group (led by the first child). Returns the group leader,
/// the spawned pids in stage order, and whether a pipe or fork failed
/// partway through.
fn spawn_stages(
	shell: &mut Shell,
	pipeline: &Pipeline,
	flags: ExecFlags,
) -> ShResult<(Option<Pid>, Vec<Pid>, bool)> {
	let mut preps = vec![];
	for stage in &pipeline.stages {
		preps.push(prep_stage(stage)?);
	}

	let total = preps.len();
	let mut pgid: Option<Pid> = None;
	let mut pids = vec![];
	let mut spawn_err = false;
	let mut prev_read: Option<SmartFd> = None;

	for (i, prep) in preps.into_iter().enumerate() {
		let pipe_pair = if i + 1 < total {
			match SmartFd::pipe() {
				Ok(pair) => Some(pair),
				Err(e) => {
					eprintln!("pipe: {}", e);
					spawn_err = true;
					break;
				}
			}
		} else {
			None
		};

		match unsafe { fork() } {
			Ok(ForkResult::Child) => {
				let group = pgid.unwrap_or_else(getpid);
				let _ = setpgid(Pid::from_raw(0), group);
				signal::reset_for_child();

				if let Some((mut r_pipe, mut w_pipe)) = pipe_pair {
					let _ = r_pipe.close();
					if w_pipe.dup2_to(STDOUT_FILENO).is_err() {
						child_exit(1);
					}
					let _ = w_pipe.close();
				}
				if let Some(mut fd) = prev_read {
					if fd.dup2_to(STDIN_FILENO).is_err() {
						child_exit(1);
					}
					let _ = fd.close();
				} else if flags.contains(ExecFlags::BACKGROUND)
					&& i == 0 && !prep.redirs.iter().any(|r| r.kind == RedirKind::Input)
				{
					// Background jobs must not read the terminal.
					match SmartFd::devnull() {
						Ok(mut fd) => {
							let _ = fd.dup2_to(STDIN_FILENO);
							let _ = fd.close();
						}
						Err(_) => child_exit(1),
					}
				}
				if !apply_redirs(&prep.redirs) {
					child_exit(1);
				}

				if prep.is_builtin {
					// Builtins inside a pipeline or with redirections run in
					// the child; their shell-state mutations die with it.
					if let Some(handler) = builtin::lookup(&prep.plain_argv[0]) {
						let code = handler(&prep.plain_argv, shell).unwrap_or(1);
						child_exit(code);
					}
				}
				let argv_refs: Vec<&CStr> = prep.argv.iter().map(|a| a.as_c_str()).collect();
				let _ = execvp(&prep.program, &argv_refs);
				eprintln!("Command not found!");
				child_exit(127);
			}
			Ok(ForkResult::Parent { child }) => {
				let group = *pgid.get_or_insert(child);
				// Raced against the child's own setpgid; either wins.
				let _ = setpgid(child, group);
				log::trace!("spawned stage {} as pid {} in pgid {}", i, child, group);
				pids.push(child);
				if let Some((r_pipe, mut w_pipe)) = pipe_pair {
					let _ = w_pipe.close();
					if let Some(mut fd) = prev_read.take() {
						let _ = fd.close();
					}
					prev_read = Some(r_pipe);
				} else if let Some(mut fd) = prev_read.take() {
					let _ = fd.close();
				}
			}
			Err(e) => {
				eprintln!("fork: {}", e);
				if let Some((mut r_pipe, mut w_pipe)) = pipe_pair {
					let _ = r_pipe.close();
					let _ = w_pipe.close();
				}
				if let Some(mut fd) = prev_read.take() {
					let _ = fd.close();
				}
				spawn_err = true;
				break;
			}
		}
	}
	if let Some(mut fd) = prev_read.take() {
		let _ = fd.close();
	}
	Ok((pgid, pids, spawn_err))
}

/// Run a pipeline in the foreground: hand the terminal to the child group,
/// wait for every stage, then take the terminal back. The group's exit
/// status is the last stage's; a SIGTSTP moves the whole group into the job
/// table instead.
pub fn run_foreground(shell: &mut Shell, pipeline: Pipeline) -> ShResult<CommandStatus> {
	let name = pipeline.stages[0].argv[0].clone();
	let (pgid, pids, spawn_err) = spawn_stages(shell, &pipeline, ExecFlags::empty())?;
	let Some(group) = pgid else {
		return Ok(CommandStatus::Exited(1));
	};

	shell.jobs_mut().set_foreground(group, pids.clone(), name);
	shellenv::attach_tty(group);

	let mut status = if spawn_err { 1 } else { 0 };
	let mut stopped = false;
	// Keyed to the pipeline's stage count, not pids.len(): after a partial
	// spawn the last spawned stage is not the last stage, and its exit code
	// must not overwrite the failure status.
	let total = pipeline.stages.len();
	for (i, pid) in pids.iter().enumerate() {
		loop {
			match waitpid(*pid, Some(WaitPidFlag::WUNTRACED)) {
				Ok(WaitStatus::Stopped(..)) => {
					stopped = true;
					break;
				}
				Ok(WaitStatus::Exited(_, code)) => {
					if i == total - 1 {
						status = code;
					}
					break;
				}
				Ok(WaitStatus::Signaled(..)) => {
					if i == total - 1 {
						status = 1;
					}
					break;
				}
				Ok(_) => continue,
				Err(_) => break,
			}
		}
		if stopped {
			break;
		}
	}

	shellenv::attach_tty(getpgrp());
	if stopped {
		if let Some(job_num) = shell.jobs_mut().move_foreground_to_stopped() {
			println!("[{}] Stopped {}", job_num, pipeline.stages[0].argv[0]);
		}
		return Ok(CommandStatus::Stopped);
	}
	shell.jobs_mut().clear_foreground();
	Ok(CommandStatus::Exited(status))
}

/// Launch a pipeline in the background and register it as a job. Prints the
/// `[n] pid` acknowledgement with the last stage's pid.
pub fn run_background(shell: &mut Shell, pipeline: Pipeline) -> ShResult<()> {
	let mut names: Vec<String> =
		pipeline.stages.iter().map(|s| s.argv[0].clone()).collect();
	if pipeline.stages.len() == 1 {
		// Single-stage jobs display their full argv, `&` included, the way
		// the user typed them.
		names[0] = format!("{} &", pipeline.stages[0].argv.join(" "));
	}
	let (pgid, pids, _spawn_err) = spawn_stages(shell, &pipeline, ExecFlags::BACKGROUND)?;
	if pgid.is_none() || pids.is_empty() {
		return Ok(());
	}
	if let Some((job_num, last_pid)) = shell.jobs_mut().add_background(pids, names) {
		println!("[{}] {}", job_num, last_pid);
	}
	Ok(())
}
