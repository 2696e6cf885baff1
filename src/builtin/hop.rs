use crate::prelude::*;
use crate::shellenv::Shell;

fn change_to(shell: &mut Shell, target: &Path) -> bool {
	if shell.change_dir(target).is_err() {
		println!("No such directory!");
		return false;
	}
	true
}

fn go_home(shell: &mut Shell) {
	let home = shell.meta().home().to_path_buf();
	let _ = change_to(shell, &home);
}

/// Swap current and previous directory. Silent no-op when there is no
/// previous directory yet.
fn go_back(shell: &mut Shell) -> bool {
	match shell.prev_dir().map(Path::to_path_buf) {
		Some(prev) => {
			let _ = shell.change_dir(&prev);
			true
		}
		None => false,
	}
}

fn hop_one(shell: &mut Shell, arg: &str) {
	match arg {
		"~" => go_home(shell),
		"." => {}
		".." => {
			let _ = change_to(shell, Path::new(".."));
		}
		"-" => {
			let _ = go_back(shell);
		}
		path => {
			let _ = change_to(shell, Path::new(path));
		}
	}
}

/// `hop [target ...]` walks each target in order; with no targets it goes
/// home. Always reports success, printing a diagnostic per failed target.
pub fn execute(argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	if argv.len() == 1 {
		go_home(shell);
		return Ok(0);
	}
	for arg in &argv[1..] {
		hop_one(shell, arg);
	}
	Ok(0)
}

/// `cd [target]`: the one-target spelling of hop, except that extra
/// arguments and `cd -` without a previous directory are hard errors.
pub fn execute_cd(argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	if argv.len() > 2 {
		println!("cd: too many arguments");
		return Ok(1);
	}
	let Some(arg) = argv.get(1) else {
		go_home(shell);
		return Ok(0);
	};
	match arg.as_str() {
		"~" => go_home(shell),
		"." => {}
		".." => {
			let _ = change_to(shell, Path::new(".."));
		}
		"-" => {
			if !go_back(shell) {
				println!("No such directory!");
				return Ok(1);
			}
		}
		path => {
			let _ = change_to(shell, Path::new(path));
		}
	}
	Ok(0)
}
