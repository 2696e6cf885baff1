use crate::prelude::*;
use crate::shellenv::Shell;

/// `ping <pid> <signal>`: send a signal to a process. The signal number is
/// taken modulo 32, and 0 only probes for existence.
pub fn execute(argv: &[String], _shell: &mut Shell) -> ShResult<i32> {
	if argv.len() != 3 {
		println!("ping: Invalid Syntax!");
		return Ok(1);
	}
	// Parse straight into pid_t range; anything wider cannot name a
	// live process, so it gets the same answer a dead pid would.
	let pid = match argv[1].parse::<i32>() {
		Ok(pid) if pid > 0 => pid,
		_ => {
			println!("No such process found");
			return Ok(1);
		}
	};
	let Ok(sig) = argv[2].parse::<i64>() else {
		println!("ping: Invalid Syntax!");
		return Ok(1);
	};
	let actual = (sig % 32) as i32;
	let target = Pid::from_raw(pid);
	let result = if actual == 0 {
		kill(target, None)
	} else {
		match Signal::try_from(actual) {
			Ok(signal) => kill(target, signal),
			Err(e) => Err(e),
		}
	};
	match result {
		Ok(()) => {
			println!("Sent signal {} to process with pid {}", sig, pid);
			Ok(0)
		}
		Err(Errno::ESRCH) => {
			println!("No such process found");
			Ok(1)
		}
		Err(e) => {
			eprintln!("kill: {}", e);
			Ok(1)
		}
	}
}
