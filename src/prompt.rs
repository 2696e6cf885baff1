use crate::history::HISTORY_MAX;
use crate::prelude::*;
use crate::shellenv::Shell;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

/// `<user@host:dir>` with the shell's starting directory collapsed to `~`.
pub fn render(shell: &Shell) -> String {
	let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("?"));
	let dir = collapse_home(&cwd, shell.meta().home());
	format!("<{}@{}:{}>", shell.meta().user(), shell.meta().host(), dir)
}

fn collapse_home(cwd: &Path, home: &Path) -> String {
	if cwd == home {
		return "~".into();
	}
	if let Ok(rest) = cwd.strip_prefix(home) {
		return format!("~/{}", rest.display());
	}
	cwd.display().to_string()
}

/// Build the line editor and seed it with the persisted history so arrow
/// keys recall previous sessions.
pub fn init_editor(shell: &Shell) -> ShResult<Editor<(), DefaultHistory>> {
	let config = Config::builder()
		.max_history_size(HISTORY_MAX)?
		.history_ignore_dups(true)?
		.auto_add_history(false)
		.build();
	let mut editor: Editor<(), DefaultHistory> = Editor::with_config(config)?;
	for entry in shell.history().iter() {
		let _ = editor.add_history_entry(entry);
	}
	Ok(editor)
}
