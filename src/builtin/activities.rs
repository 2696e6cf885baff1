use crate::prelude::*;
use crate::shellenv::Shell;

/// `activities`: every live background process, sorted by name then pid,
/// as `[pid] : name - Running|Stopped`.
pub fn execute(_argv: &[String], shell: &mut Shell) -> ShResult<i32> {
	let mut rows: Vec<(String, i32, bool)> = vec![];
	shell.jobs().for_each_activity(|pid, name, stopped| {
		rows.push((name.to_string(), pid.as_raw(), stopped));
	});
	rows.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
	for (name, pid, stopped) in rows {
		let state = if stopped { "Stopped" } else { "Running" };
		println!("[{}] : {} - {}", pid, name, state);
	}
	Ok(0)
}
