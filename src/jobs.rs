use crate::prelude::*;
use crate::shellenv;

pub const MAX_JOBS: usize = 64;

/// Integer projection of "stopped by SIGTSTP" (128 + 20), used wherever a
/// plain exit status is expected.
pub const STOPPED_STATUS: i32 = 148;

/// How long `fg` sleeps between non-blocking wait sweeps.
const FG_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// The pipeline currently holding the terminal, if any.
#[derive(Debug, Clone)]
struct ForegroundRecord {
	pgid: Pid,
	pids: Vec<Pid>,
	name: String,
}

/// One background job: a process group with per-stage bookkeeping.
#[derive(Debug, Clone)]
pub struct Job {
	job_num: usize,
	pids: Vec<Pid>,
	finished: Vec<bool>,
	stopped: Vec<bool>,
	stage_names: Vec<String>,
	cmd_name: String,
	last_status: i32,
}

impl Job {
	fn new(job_num: usize, pids: Vec<Pid>, stage_names: Vec<String>) -> Self {
		let count = pids.len();
		let cmd_name = stage_names.first().cloned().unwrap_or_else(|| "?".into());
		Self {
			job_num,
			pids,
			finished: vec![false; count],
			stopped: vec![false; count],
			stage_names,
			cmd_name,
			last_status: 0,
		}
	}

	pub fn job_num(&self) -> usize {
		self.job_num
	}

	pub fn cmd_name(&self) -> &str {
		&self.cmd_name
	}

	pub fn pgid(&self) -> Pid {
		self.pids[0]
	}

	fn last_pid(&self) -> Pid {
		self.pids[self.pids.len() - 1]
	}

	/// Fold one wait result into the per-stage state. Only the last stage's
	/// exit decides the job status, and anything but a clean exit counts as
	/// abnormal.
	fn note_status(&mut self, idx: usize, status: WaitStatus) {
		match status {
			WaitStatus::Stopped(..) => self.stopped[idx] = true,
			WaitStatus::Continued(_) => self.stopped[idx] = false,
			WaitStatus::Exited(_, code) => {
				self.finished[idx] = true;
				self.stopped[idx] = false;
				if idx == self.pids.len() - 1 {
					self.last_status = if code == 0 { 0 } else { 1 };
				}
			}
			WaitStatus::Signaled(..) => {
				self.finished[idx] = true;
				self.stopped[idx] = false;
				if idx == self.pids.len() - 1 {
					self.last_status = 1;
				}
			}
			_ => {}
		}
	}

	fn all_finished(&self) -> bool {
		self.finished.iter().all(|f| *f)
	}

	pub fn any_stopped(&self) -> bool {
		self.pids.iter().enumerate().any(|(i, _)| !self.finished[i] && self.stopped[i])
	}
}

/// The job table: background jobs in launch order plus the foreground
/// record. Job numbers are never reused within a session.
#[derive(Debug)]
pub struct JobTable {
	jobs: Vec<Job>,
	next_job_number: usize,
	fg: Option<ForegroundRecord>,
}

impl JobTable {
	pub fn new() -> Self {
		Self { jobs: vec![], next_job_number: 1, fg: None }
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}

	pub fn set_foreground(&mut self, pgid: Pid, pids: Vec<Pid>, name: String) {
		self.fg = Some(ForegroundRecord { pgid, pids, name });
	}

	pub fn clear_foreground(&mut self) {
		self.fg = None;
	}

	pub fn foreground_pgid(&self) -> Option<Pid> {
		self.fg.as_ref().map(|fg| fg.pgid)
	}

	/// Convert the current foreground pipeline into a stopped background
	/// job. Every stage inherits the pipeline's display name.
	pub fn move_foreground_to_stopped(&mut self) -> Option<usize> {
		let fg = self.fg.take()?;
		if fg.pids.is_empty() || self.jobs.len() >= MAX_JOBS {
			return None;
		}
		let names = vec![fg.name.clone(); fg.pids.len()];
		let mut job = Job::new(self.next_job_number, fg.pids, names);
		self.next_job_number += 1;
		for flag in job.stopped.iter_mut() {
			*flag = true;
		}
		let num = job.job_num;
		self.jobs.push(job);
		Some(num)
	}

	/// Register a freshly launched background pipeline. Returns the job
	/// number and the last stage's pid for the `[n] pid` acknowledgement.
	pub fn add_background(&mut self, pids: Vec<Pid>, stage_names: Vec<String>) -> Option<(usize, Pid)> {
		if pids.is_empty() || self.jobs.len() >= MAX_JOBS {
			return None;
		}
		let job = Job::new(self.next_job_number, pids, stage_names);
		self.next_job_number += 1;
		let num = job.job_num;
		let last = job.last_pid();
		log::debug!("registered background job [{}] {} (pgid {})", num, job.cmd_name, job.pgid());
		self.jobs.push(job);
		Some((num, last))
	}

	/// Non-blocking sweep over every tracked pid. Fully finished jobs are
	/// announced and dropped; stop/continue transitions just update flags.
	pub fn poll(&mut self) {
		self.jobs.retain_mut(|job| {
			for i in 0..job.pids.len() {
				if job.finished[i] {
					continue;
				}
				let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
				match waitpid(job.pids[i], Some(flags)) {
					Ok(WaitStatus::StillAlive) => {}
					Ok(status) => job.note_status(i, status),
					// Not our child any more (ECHILD); count it as gone.
					Err(_) => {
						job.finished[i] = true;
						job.stopped[i] = false;
						if i == job.pids.len() - 1 {
							job.last_status = 1;
						}
					}
				}
			}
			if job.all_finished() {
				let how = if job.last_status == 0 { "normally" } else { "abnormally" };
				println!("{} with pid {} exited {}", job.cmd_name, job.last_pid(), how);
				false
			} else {
				true
			}
		});
	}

	/// Visit every live process of every job, most recent launch last.
	pub fn for_each_activity<F: FnMut(Pid, &str, bool)>(&self, mut f: F) {
		for job in &self.jobs {
			for (i, pid) in job.pids.iter().enumerate() {
				if job.finished[i] {
					continue;
				}
				f(*pid, &job.stage_names[i], job.stopped[i]);
			}
		}
	}

	/// Job number 0 means "most recent".
	fn find_index(&self, job_num: usize) -> Option<usize> {
		if job_num == 0 {
			return self.jobs.len().checked_sub(1);
		}
		self.jobs.iter().position(|j| j.job_num == job_num)
	}

	/// `fg`: hand the terminal to the job, resume it if stopped, and wait
	/// until it finishes or stops again.
	pub fn cmd_fg(&mut self, job_num: usize) -> i32 {
		let Some(idx) = self.find_index(job_num) else {
			println!("No such job");
			return 1;
		};
		println!("{}", self.jobs[idx].cmd_name);
		let pgid = self.jobs[idx].pgid();
		shellenv::attach_tty(pgid);
		if self.jobs[idx].any_stopped() {
			let _ = killpg(pgid, Signal::SIGCONT);
		}
		loop {
			let job = &mut self.jobs[idx];
			let mut stopped = false;
			let mut all_done = true;
			for i in 0..job.pids.len() {
				if job.finished[i] {
					continue;
				}
				let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
				match waitpid(job.pids[i], Some(flags)) {
					Ok(WaitStatus::StillAlive) => all_done = false,
					Ok(status @ WaitStatus::Stopped(..)) => {
						job.note_status(i, status);
						stopped = true;
						all_done = false;
					}
					Ok(status @ WaitStatus::Continued(_)) => {
						job.note_status(i, status);
						all_done = false;
					}
					Ok(status) => job.note_status(i, status),
					Err(_) => {
						job.finished[i] = true;
						job.stopped[i] = false;
						if i == job.pids.len() - 1 {
							job.last_status = 1;
						}
					}
				}
			}
			if stopped {
				shellenv::attach_tty(getpgrp());
				println!("[{}] Stopped {}", job.job_num, job.cmd_name);
				return STOPPED_STATUS;
			}
			if all_done {
				let status = job.last_status;
				self.jobs.remove(idx);
				shellenv::attach_tty(getpgrp());
				return status;
			}
			std::thread::sleep(FG_POLL_INTERVAL);
		}
	}

	/// `bg`: resume a stopped job in the background.
	pub fn cmd_bg(&mut self, job_num: usize) -> i32 {
		let Some(idx) = self.find_index(job_num) else {
			println!("No such job");
			return 1;
		};
		let job = &mut self.jobs[idx];
		if !job.any_stopped() {
			println!("Job already running");
			return 1;
		}
		let _ = killpg(job.pgid(), Signal::SIGCONT);
		for flag in job.stopped.iter_mut() {
			*flag = false;
		}
		println!("[{}] {} &", job.job_num, job.cmd_name);
		0
	}
}
