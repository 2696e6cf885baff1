use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tish::execute::exec_line;
use tish::jobs::STOPPED_STATUS;
use tish::shellenv::Shell;

fn tmp(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("tish_it_{}_{}", std::process::id(), name))
}

fn path_str(p: &PathBuf) -> String {
	p.display().to_string()
}

// Everything that forks lives in this one test so no other test thread is
// running (and possibly holding allocator locks) at fork time.
#[test]
fn exec_end_to_end() {
	let hist = tmp("hist");
	let _ = fs::remove_file(&hist);
	let mut shell = Shell::new(hist.clone()).unwrap();

	// Output redirection, input redirection and a pipe.
	let out = tmp("out");
	let count = tmp("count");
	let status = exec_line(
		&mut shell,
		&format!("echo hi > {} ; cat < {} | wc -l > {}", path_str(&out), path_str(&out), path_str(&count)),
	)
	.unwrap();
	assert_eq!(status, 0);
	assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
	assert_eq!(fs::read_to_string(&count).unwrap().trim(), "1");

	// Multiple output redirections: all files created, last one wins.
	let f1 = tmp("f1");
	let f2 = tmp("f2");
	let status = exec_line(&mut shell, &format!("echo hi > {} > {}", path_str(&f1), path_str(&f2))).unwrap();
	assert_eq!(status, 0);
	assert_eq!(fs::read_to_string(&f2).unwrap(), "hi\n");
	assert_eq!(fs::read_to_string(&f1).unwrap(), "");

	// Append mode.
	let app = tmp("app");
	exec_line(&mut shell, &format!("echo one > {}", path_str(&app))).unwrap();
	exec_line(&mut shell, &format!("echo two >> {}", path_str(&app))).unwrap();
	assert_eq!(fs::read_to_string(&app).unwrap(), "one\ntwo\n");

	// Exit statuses: a pipeline's status is its last stage's.
	assert_eq!(exec_line(&mut shell, "false").unwrap(), 1);
	assert_eq!(exec_line(&mut shell, "true | false").unwrap(), 1);
	assert_eq!(exec_line(&mut shell, "false | true").unwrap(), 0);

	// Unknown commands exit 127.
	assert_eq!(exec_line(&mut shell, "definitely_not_a_command_123").unwrap(), 127);

	// Missing input file fails the stage.
	let absent = tmp("absent");
	let _ = fs::remove_file(&absent);
	assert_eq!(exec_line(&mut shell, &format!("cat < {}", path_str(&absent))).unwrap(), 1);

	// A pipeline that only partially spawns reports failure even when the
	// stages that did start exit cleanly. Pinching RLIMIT_NOFILE down to
	// the two lowest free descriptors lets the first pipe through and
	// starves the second.
	let status = unsafe {
		let mut lim = libc::rlimit { rlim_cur: 0, rlim_max: 0 };
		assert_eq!(libc::getrlimit(libc::RLIMIT_NOFILE, &mut lim), 0);
		let a = libc::dup(0);
		let b = libc::dup(0);
		assert!(a >= 0 && b > a);
		libc::close(a);
		libc::close(b);
		let tight = libc::rlimit { rlim_cur: (b + 1) as libc::rlim_t, rlim_max: lim.rlim_max };
		assert_eq!(libc::setrlimit(libc::RLIMIT_NOFILE, &tight), 0);
		let status = exec_line(&mut shell, "true | true | true");
		assert_eq!(libc::setrlimit(libc::RLIMIT_NOFILE, &lim), 0);
		status.unwrap()
	};
	assert_eq!(status, 1, "a half-spawned pipeline must not report success");

	// && short-circuits up to and including the next ';' group.
	let g1 = tmp("g1");
	let g2 = tmp("g2");
	let _ = fs::remove_file(&g1);
	let _ = fs::remove_file(&g2);
	exec_line(
		&mut shell,
		&format!("false && echo skipped > {} ; echo ran > {}", path_str(&g1), path_str(&g2)),
	)
	.unwrap();
	assert!(!g1.exists());
	assert_eq!(fs::read_to_string(&g2).unwrap(), "ran\n");
	let gy = tmp("gy");
	exec_line(&mut shell, &format!("true && echo y > {}", path_str(&gy))).unwrap();
	assert_eq!(fs::read_to_string(&gy).unwrap(), "y\n");

	// The skipped chain ends at a single '&' as well.
	let s1 = tmp("s1");
	let s2 = tmp("s2");
	let _ = fs::remove_file(&s1);
	let _ = fs::remove_file(&s2);
	exec_line(
		&mut shell,
		&format!("false && echo skipped > {} & echo ran > {}", path_str(&s1), path_str(&s2)),
	)
	.unwrap();
	assert!(!s1.exists());
	assert_eq!(fs::read_to_string(&s2).unwrap(), "ran\n");

	// Background jobs land in the job table and are reaped by polling.
	assert!(shell.jobs().is_empty());
	let status = exec_line(&mut shell, "false; sleep 0.2 &").unwrap();
	assert_eq!(status, 1, "background launch must not overwrite the status");
	assert_eq!(shell.jobs().len(), 1);
	let deadline = Instant::now() + Duration::from_secs(5);
	while !shell.jobs().is_empty() {
		assert!(Instant::now() < deadline, "background job never finished");
		shell.jobs_mut().poll();
		std::thread::sleep(Duration::from_millis(20));
	}

	// A foreground command that stops itself comes back as status 148,
	// lands in the job table flagged stopped, and bg resumes it.
	let stopper = tmp("stopper");
	let marker = tmp("marker");
	let _ = fs::remove_file(&marker);
	fs::write(&stopper, format!("#!/bin/sh\nkill -TSTP $$\ntouch {}\n", path_str(&marker))).unwrap();
	let mut perms = fs::metadata(&stopper).unwrap().permissions();
	perms.set_mode(0o755);
	fs::set_permissions(&stopper, perms).unwrap();
	let status = exec_line(&mut shell, &path_str(&stopper)).unwrap();
	assert_eq!(status, STOPPED_STATUS);
	assert_eq!(shell.jobs().len(), 1);
	let mut stopped_rows = 0;
	shell.jobs().for_each_activity(|_, _, stopped| {
		assert!(stopped);
		stopped_rows += 1;
	});
	assert_eq!(stopped_rows, 1);
	assert_eq!(exec_line(&mut shell, "bg").unwrap(), 0);
	let deadline = Instant::now() + Duration::from_secs(5);
	while !shell.jobs().is_empty() {
		assert!(Instant::now() < deadline, "resumed job never finished");
		shell.jobs_mut().poll();
		std::thread::sleep(Duration::from_millis(20));
	}
	assert!(marker.exists(), "resumed job never ran to completion");

	// fg/bg with nothing to manage.
	assert_eq!(exec_line(&mut shell, "fg").unwrap(), 1);
	assert_eq!(exec_line(&mut shell, "bg 3").unwrap(), 1);

	// cd runs in-process and cd - returns to where we came from.
	let before = std::env::current_dir().unwrap();
	assert_eq!(exec_line(&mut shell, "cd /").unwrap(), 0);
	assert_eq!(std::env::current_dir().unwrap(), PathBuf::from("/"));
	assert_eq!(exec_line(&mut shell, "cd -").unwrap(), 0);
	assert_eq!(std::env::current_dir().unwrap(), before);

	// reveal accepts its flags.
	assert_eq!(exec_line(&mut shell, "reveal -l /tmp").unwrap(), 0);

	// Syntactic failures surface as status 1, not an Err.
	assert_eq!(exec_line(&mut shell, "a |").unwrap(), 1);

	for f in [&hist, &out, &count, &f1, &f2, &app, &g2, &gy, &s2, &stopper, &marker] {
		let _ = fs::remove_file(f);
	}
}
