pub mod activities;
pub mod control;
pub mod hop;
pub mod log;
pub mod ping;
pub mod reveal;

use once_cell::sync::Lazy;

use crate::prelude::*;
use crate::shellenv::Shell;

/// A builtin gets the full argv (name included) and mutable shell state,
/// and returns its exit status.
pub type BuiltinFn = fn(&[String], &mut Shell) -> ShResult<i32>;

static BUILTINS: Lazy<HashMap<&'static str, BuiltinFn>> = Lazy::new(|| {
	let mut map: HashMap<&'static str, BuiltinFn> = HashMap::new();
	map.insert("hop", hop::execute as BuiltinFn);
	map.insert("cd", hop::execute_cd as BuiltinFn);
	map.insert("reveal", reveal::execute as BuiltinFn);
	map.insert("ping", ping::execute as BuiltinFn);
	map.insert("log", self::log::execute as BuiltinFn);
	map.insert("activities", activities::execute as BuiltinFn);
	map.insert("fg", control::execute_fg as BuiltinFn);
	map.insert("bg", control::execute_bg as BuiltinFn);
	map
});

pub fn lookup(name: &str) -> Option<BuiltinFn> {
	BUILTINS.get(name).copied()
}
