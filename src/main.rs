use rustyline::error::ReadlineError;

use tish::execute;
use tish::prelude::*;
use tish::prompt;
use tish::shellenv::{self, Shell};
use tish::signal;
use tish::validate;

fn main() {
	env_logger::init();

	// Own process group and terminal, so foreground handoff works and a
	// Ctrl-Z aimed at a child cannot stop the shell itself.
	let shell_pgid = getpid();
	let _ = setpgid(Pid::from_raw(0), shell_pgid);
	signal::setup_shell();
	shellenv::attach_tty(shell_pgid);

	let hist_path = env::var("HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|_| env::temp_dir())
		.join(".tish_hist");
	let mut shell = match Shell::new(hist_path) {
		Ok(shell) => shell,
		Err(e) => {
			eprintln!("tish: {}", e);
			std::process::exit(1);
		}
	};
	let mut rl = match prompt::init_editor(&shell) {
		Ok(rl) => rl,
		Err(e) => {
			eprintln!("tish: {}", e);
			std::process::exit(1);
		}
	};

	loop {
		shell.jobs_mut().poll();
		let line = match rl.readline(&prompt::render(&shell)) {
			Ok(line) => line,
			Err(ReadlineError::Interrupted) => continue,
			Err(ReadlineError::Eof) => break,
			Err(e) => {
				eprintln!("tish: {}", e);
				break;
			}
		};
		// Flush any job completion messages before this command's output.
		shell.jobs_mut().poll();
		if line.trim().is_empty() {
			continue;
		}
		if !validate::is_syntactically_valid(&line) {
			println!("Invalid Syntax!");
			continue;
		}
		shell.history_mut().maybe_store(&line);
		let _ = rl.add_history_entry(line.as_str());
		if let Err(e) = execute::exec_line(&mut shell, &line) {
			eprintln!("tish: {}", e);
		}
	}

	// EOF: announce logout and take the remaining background jobs with us.
	println!("logout");
	shell.jobs().for_each_activity(|pid, _name, _stopped| {
		let _ = kill(pid, Signal::SIGKILL);
	});
}
