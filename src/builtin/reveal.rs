use crate::prelude::*;
use crate::shellenv::Shell;
use std::fs;

fn list_dir(path: &Path, show_all: bool, line_by_line: bool) {
	let entries = match fs::read_dir(path) {
		Ok(entries) => entries,
		Err(_) => {
			println!("No such directory!");
			return;
		}
	};
	let mut names: Vec<String> = entries
		.filter_map(|e| e.ok())
		.map(|e| e.file_name().to_string_lossy().into_owned())
		.filter(|name| show_all || !name.starts_with('.'))
		.collect();
	names.sort();
	if line_by_line {
		for name in &names {
			println!("{}", name);
		}
	} else if !names.is_empty() {
		println!("{}", names.join(" "));
	}
}

/// `reveal [-a] [-l] [target]`: list a directory sorted by name. `-a`
/// includes dotfiles, `-l` prints one entry per line; flags may combine
/// (`-al`). The target understands the same `~` `.` `..` `-` shorthands as
/// hop.
pub fn execute(argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	let mut show_all = false;
	let mut line_by_line = false;
	let mut target: Option<PathBuf> = None;
	let mut positional_count = 0;

	for arg in &argv[1..] {
		if arg.starts_with('-') && arg.len() > 1 {
			for ch in arg[1..].chars() {
				match ch {
					'a' => show_all = true,
					'l' => line_by_line = true,
					_ => {
						println!("reveal: Invalid Syntax!");
						return Ok(1);
					}
				}
			}
			continue;
		}
		positional_count += 1;
		if positional_count > 1 {
			println!("reveal: Invalid Syntax!");
			return Ok(1);
		}
		target = Some(match arg.as_str() {
			"~" => shell.meta().home().to_path_buf(),
			"." => PathBuf::from("."),
			".." => PathBuf::from(".."),
			"-" => match shell.prev_dir() {
				Some(prev) => prev.to_path_buf(),
				None => {
					println!("No such directory!");
					return Ok(1);
				}
			},
			path => PathBuf::from(path),
		});
	}

	let target = target.unwrap_or_else(|| PathBuf::from("."));
	list_dir(&target, show_all, line_by_line);
	Ok(0)
}
