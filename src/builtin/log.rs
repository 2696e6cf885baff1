use crate::execute;
use crate::prelude::*;
use crate::shellenv::Shell;

/// `log` prints the history oldest first; `log purge` clears it;
/// `log execute <n>` replays the n-th most recent command through the
/// normal execution path (without re-storing it, since any line naming
/// `log` never enters the history).
pub fn execute(argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	match argv.len() {
		1 => {
			let lines: Vec<String> = shell.history().iter().map(str::to_string).collect();
			for line in lines {
				println!("{}", line);
			}
			Ok(0)
		}
		2 if argv[1] == "purge" => {
			shell.history_mut().purge();
			Ok(0)
		}
		3 if argv[1] == "execute" => {
			let Ok(index) = argv[2].parse::<i64>() else {
				println!("log: Invalid Syntax!");
				return Ok(1);
			};
			// Out-of-range indices fail quietly, like an empty slot would.
			if index <= 0 {
				return Ok(1);
			}
			match shell.history().nth_most_recent(index as usize).map(str::to_string) {
				Some(cmd) => execute::exec_line(shell, &cmd),
				None => Ok(1),
			}
		}
		_ => {
			println!("log: Invalid Syntax!");
			Ok(1)
		}
	}
}
