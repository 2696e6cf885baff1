use nix::sys::signal::{signal, SigHandler, Signal};

/// Shell-process signal disposition. The shell must survive its own
/// tcsetpgrp calls (SIGTTOU/SIGTTIN) and must not be stopped by Ctrl-Z
/// aimed at a foreground job that shares its terminal.
pub fn setup_shell() {
	unsafe {
		let _ = signal(Signal::SIGTSTP, SigHandler::SigIgn);
		let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
		let _ = signal(Signal::SIGTTIN, SigHandler::SigIgn);
	}
}

/// Undo the shell's dispositions in a freshly forked child so the default
/// terminal signals work again before exec.
pub fn reset_for_child() {
	unsafe {
		let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
		let _ = signal(Signal::SIGQUIT, SigHandler::SigDfl);
		let _ = signal(Signal::SIGTSTP, SigHandler::SigDfl);
		let _ = signal(Signal::SIGTTOU, SigHandler::SigDfl);
		let _ = signal(Signal::SIGTTIN, SigHandler::SigDfl);
	}
}
