use crate::prelude::*;
use crate::shellenv::Shell;

fn job_arg(argv: &[String]) -> usize {
	// Missing or malformed numbers select the most recent job.
	argv.get(1).and_then(|a| a.parse().ok()).unwrap_or(0)
}

/// `fg [job]`: bring a job to the foreground and wait for it.
pub fn execute_fg(argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	let job_num = job_arg(argv);
	Ok(shell.jobs_mut().cmd_fg(job_num))
}

/// `bg [job]`: resume a stopped job without taking the terminal.
pub fn execute_bg(argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	let job_num = job_arg(argv);
	Ok(shell.jobs_mut().cmd_bg(job_num))
}
