use crate::prelude::*;
use std::fs;

pub const HISTORY_MAX: usize = 15;

/// Persistent command history: a fixed-capacity ring of the most recent
/// distinct commands, rewritten to disk after every accepted entry.
pub struct History {
	entries: [Option<String>; HISTORY_MAX],
	head: usize,
	count: usize,
	path: PathBuf,
}

impl History {
	/// Load the saved history, tolerating a missing or unreadable file.
	pub fn load(path: PathBuf) -> Self {
		let mut hist = Self {
			entries: std::array::from_fn(|_| None),
			head: 0,
			count: 0,
			path,
		};
		if let Ok(contents) = fs::read_to_string(&hist.path) {
			for line in contents.lines() {
				let line = line.trim_end();
				if !line.is_empty() {
					hist.ring_push_raw(line.to_string());
				}
			}
		}
		hist
	}

	fn ring_push_raw(&mut self, entry: String) {
		let slot = (self.head + self.count) % HISTORY_MAX;
		self.entries[slot] = Some(entry);
		if self.count < HISTORY_MAX {
			self.count += 1;
		} else {
			self.head = (self.head + 1) % HISTORY_MAX;
		}
	}

	fn save(&self) {
		let mut out = String::new();
		for entry in self.iter() {
			out.push_str(entry);
			out.push('\n');
		}
		if let Err(e) = fs::write(&self.path, out) {
			log::warn!("could not write history file {}: {}", self.path.display(), e);
		}
	}

	/// Append an entry, suppressing a repeat of the latest one, and persist.
	fn push(&mut self, entry: String) {
		if self.count > 0 {
			let newest = (self.head + self.count - 1) % HISTORY_MAX;
			if self.entries[newest].as_deref() == Some(entry.as_str()) {
				return;
			}
		}
		self.ring_push_raw(entry);
		self.save();
	}

	/// Store a typed line unless it is empty or any of its command names is
	/// `log` itself. The whole line is stored verbatim, separators included.
	pub fn maybe_store(&mut self, line: &str) {
		let line = line.trim_end();
		if line.is_empty() || invokes_log(line) {
			return;
		}
		self.push(line.to_string());
	}

	/// Entries oldest first.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		(0..self.count).filter_map(move |i| {
			self.entries[(self.head + i) % HISTORY_MAX].as_deref()
		})
	}

	pub fn len(&self) -> usize {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// 1 is the newest entry, `len()` the oldest. 0 and out-of-range give
	/// None.
	pub fn nth_most_recent(&self, n: usize) -> Option<&str> {
		if n == 0 || n > self.count {
			return None;
		}
		let slot = (self.head + self.count - n) % HISTORY_MAX;
		self.entries[slot].as_deref()
	}

	pub fn purge(&mut self) {
		self.entries = std::array::from_fn(|_| None);
		self.head = 0;
		self.count = 0;
		self.save();
	}
}

/// True when any command name anywhere in the line (across `;`, `&` and
/// pipes) is `log`. Such lines are kept out of the history so replaying it
/// cannot recurse.
fn invokes_log(line: &str) -> bool {
	for group in line.split(|c| c == ';' || c == '&') {
		for segment in group.split('|') {
			let name = segment
				.split_whitespace()
				.next()
				.unwrap_or("");
			let name = name.split(|c| c == '<' || c == '>').next().unwrap_or("");
			if name == "log" {
				return true;
			}
		}
	}
	false
}
