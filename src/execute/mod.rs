pub mod pipeline;

use crate::builtin;
use crate::parse::{self, Pipeline};
use crate::prelude::*;
use crate::shellenv::Shell;

/// What followed a command group on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
	Semi,
	Bg,
	And,
	End,
}

/// Split a line into command groups at top-level `;`, `&` and `&&`. The
/// group texts keep their internal pipes and redirections untouched; empty
/// groups are kept because their delimiters still drive conditional
/// skipping.
pub fn split_groups(line: &str) -> Vec<(String, Delim)> {
	let bytes = line.as_bytes();
	let mut groups = vec![];
	let mut start = 0;
	let mut i = 0;
	while i < bytes.len() {
		match bytes[i] {
			b';' => {
				groups.push((line[start..i].trim().to_string(), Delim::Semi));
				i += 1;
				start = i;
			}
			b'&' => {
				let delim = if bytes.get(i + 1) == Some(&b'&') { Delim::And } else { Delim::Bg };
				groups.push((line[start..i].trim().to_string(), delim));
				i += if delim == Delim::And { 2 } else { 1 };
				start = i;
			}
			_ => i += 1,
		}
	}
	let tail = line[start..].trim();
	if !tail.is_empty() || groups.is_empty() {
		groups.push((tail.to_string(), Delim::End));
	}
	groups
}

/// Run a full input line: each command group in order, respecting `&`
/// backgrounding and `&&` short-circuiting. Returns the status of the last
/// foreground group (background launches leave the running status alone).
pub fn exec_line(shell: &mut Shell, line: &str) -> ShResult<i32> {
	let mut last_status = 0;
	let mut skipping = false;
	for (text, delim) in split_groups(line) {
		if skipping {
			// A failed `&&` left-hand side skips the whole `&&` chain,
			// through the next `;`- or `&`-terminated group.
			if delim == Delim::Semi || delim == Delim::Bg {
				skipping = false;
			}
			continue;
		}
		if text.is_empty() {
			continue;
		}
		log::debug!("group {:?} delim {:?}", text, delim);
		match parse::parse_pipeline(&text) {
			Ok(pl) => {
				if delim == Delim::Bg {
					pipeline::run_background(shell, pl)?;
				} else {
					last_status = run_group(shell, pl)?;
				}
			}
			Err(ShError::Syntax(msg)) => {
				if !msg.is_empty() {
					eprintln!("{}", msg);
				}
				println!("Invalid Syntax!");
				last_status = 1;
			}
			Err(e) => return Err(e),
		}
		if delim == Delim::And && last_status != 0 {
			skipping = true;
		}
	}
	Ok(last_status)
}

/// Run one foreground command group. A lone builtin with no redirections
/// runs inside the shell process so it can see and mutate shell state;
/// anything else goes through the pipeline orchestrator.
fn run_group(shell: &mut Shell, pl: Pipeline) -> ShResult<i32> {
	if pl.stages.len() == 1 && pl.stages[0].redirs.is_empty() {
		if let Some(handler) = builtin::lookup(&pl.stages[0].argv[0]) {
			let argv = pl.stages[0].argv.clone();
			return handler(&argv, shell);
		}
	}
	Ok(pipeline::run_foreground(shell, pl)?.code())
}
