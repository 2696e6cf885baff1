use crate::prelude::*;

pub const MAX_STAGES: usize = 16;
pub const MAX_ARGS: usize = 64;
pub const MAX_REDIRS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
	Input,
	OutputTrunc,
	OutputAppend,
}

/// One redirection directive. Directives are applied in declaration order, so
/// a later directive overrides an earlier one aimed at the same direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redir {
	pub kind: RedirKind,
	pub path: String,
}

/// One stage of a pipeline: argv (argv[0] is the program) plus redirections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage {
	pub argv: Vec<String>,
	pub redirs: Vec<Redir>,
}

impl Stage {
	pub fn has_input_redir(&self) -> bool {
		self.redirs.iter().any(|r| r.kind == RedirKind::Input)
	}
}

/// An ordered sequence of stages chained stdout -> stdin. Transient: built
/// per command-group and consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
	pub stages: Vec<Stage>,
}

fn is_special(ch: char) -> bool {
	matches!(ch, '|' | '&' | ';' | '<' | '>') || ch.is_whitespace()
}

fn skip_ws(text: &str, pos: &mut usize) {
	while let Some(ch) = text[*pos..].chars().next() {
		if !ch.is_whitespace() {
			break;
		}
		*pos += ch.len_utf8();
	}
}

/// Read one name token: stops at whitespace or any of `|&;<>`.
fn read_name<'a>(text: &'a str, pos: &mut usize) -> Option<&'a str> {
	let start = *pos;
	while let Some(ch) = text[*pos..].chars().next() {
		if is_special(ch) {
			break;
		}
		*pos += ch.len_utf8();
	}
	if *pos > start {
		Some(&text[start..*pos])
	} else {
		None
	}
}

/// Parse one pipe-free segment into a Stage: argv plus redirections, which
/// may appear in any order after the program name. Both the attached
/// (`<file`) and spaced (`< file`) redirection forms are accepted.
fn parse_segment(seg: &str) -> ShResult<Stage> {
	let mut pos = 0;
	skip_ws(seg, &mut pos);
	let Some(name) = read_name(seg, &mut pos) else {
		return Err(ShError::syntax(""));
	};
	let mut stage = Stage { argv: vec![name.to_string()], redirs: vec![] };

	loop {
		skip_ws(seg, &mut pos);
		let Some(ch) = seg[pos..].chars().next() else { break };
		if ch == '<' || ch == '>' {
			pos += 1;
			let kind = if ch == '<' {
				RedirKind::Input
			} else if seg[pos..].starts_with('>') {
				pos += 1;
				RedirKind::OutputAppend
			} else {
				RedirKind::OutputTrunc
			};
			skip_ws(seg, &mut pos);
			let Some(path) = read_name(seg, &mut pos) else {
				return Err(ShError::syntax("redirection: missing file name"));
			};
			if stage.redirs.len() >= MAX_REDIRS {
				return Err(ShError::syntax(format!("too many redirections (max {})", MAX_REDIRS)));
			}
			stage.redirs.push(Redir { kind, path: path.to_string() });
			continue;
		}
		let Some(tok) = read_name(seg, &mut pos) else { break };
		if stage.argv.len() >= MAX_ARGS - 1 {
			return Err(ShError::syntax(format!("too many arguments (max {})", MAX_ARGS - 1)));
		}
		stage.argv.push(tok.to_string());
	}
	Ok(stage)
}

/// Parse one command-group's worth of text into a Pipeline. The text must
/// already be free of `;`, `&` and `&&` (the sequencer splits those off);
/// each `|`-separated segment must be non-empty, which also rejects leading,
/// trailing and doubled pipes.
pub fn parse_pipeline(text: &str) -> ShResult<Pipeline> {
	let mut pipeline = Pipeline::default();
	for seg in text.split('|') {
		let seg = seg.trim();
		if seg.is_empty() {
			return Err(ShError::syntax(""));
		}
		if pipeline.stages.len() >= MAX_STAGES {
			return Err(ShError::syntax(format!("too many pipeline stages (max {})", MAX_STAGES)));
		}
		pipeline.stages.push(parse_segment(seg)?);
	}
	if pipeline.stages.is_empty() {
		return Err(ShError::syntax(""));
	}
	Ok(pipeline)
}

impl Display for Redir {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			RedirKind::Input => write!(f, "< {}", self.path),
			RedirKind::OutputTrunc => write!(f, "> {}", self.path),
			RedirKind::OutputAppend => write!(f, ">> {}", self.path),
		}
	}
}

impl Display for Stage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.argv.join(" "))?;
		for redir in &self.redirs {
			write!(f, " {}", redir)?;
		}
		Ok(())
	}
}

impl Display for Pipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut first = true;
		for stage in &self.stages {
			if !first {
				write!(f, " | ")?;
			}
			write!(f, "{}", stage)?;
			first = false;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn syntax_msg(result: ShResult<Pipeline>) -> String {
		match result {
			Err(ShError::Syntax(msg)) => msg,
			other => panic!("expected a syntax error, got {:?}", other),
		}
	}

	#[test]
	fn parses_a_simple_command() {
		let pl = parse_pipeline("echo hello world").unwrap();
		assert_eq!(pl.stages.len(), 1);
		assert_eq!(pl.stages[0].argv, vec!["echo", "hello", "world"]);
		assert!(pl.stages[0].redirs.is_empty());
	}

	#[test]
	fn parses_a_multi_stage_pipeline() {
		let pl = parse_pipeline("cat f | grep x | wc -l").unwrap();
		assert_eq!(pl.stages.len(), 3);
		assert_eq!(pl.stages[0].argv, vec!["cat", "f"]);
		assert_eq!(pl.stages[1].argv, vec!["grep", "x"]);
		assert_eq!(pl.stages[2].argv, vec!["wc", "-l"]);
	}

	#[test]
	fn attached_and_spaced_redirections_are_equivalent() {
		let spaced = parse_pipeline("sort < in > out").unwrap();
		let attached = parse_pipeline("sort <in >out").unwrap();
		assert_eq!(spaced, attached);
		assert_eq!(
			spaced.stages[0].redirs,
			vec![
				Redir { kind: RedirKind::Input, path: "in".into() },
				Redir { kind: RedirKind::OutputTrunc, path: "out".into() },
			]
		);
	}

	#[test]
	fn append_redirection() {
		let pl = parse_pipeline("echo hi >> log.txt").unwrap();
		assert_eq!(
			pl.stages[0].redirs,
			vec![Redir { kind: RedirKind::OutputAppend, path: "log.txt".into() }]
		);
	}

	#[test]
	fn redirections_keep_declaration_order() {
		let pl = parse_pipeline("cmd > f1 > f2 < f3").unwrap();
		let kinds: Vec<_> = pl.stages[0].redirs.iter().map(|r| (r.kind, r.path.as_str())).collect();
		assert_eq!(
			kinds,
			vec![
				(RedirKind::OutputTrunc, "f1"),
				(RedirKind::OutputTrunc, "f2"),
				(RedirKind::Input, "f3"),
			]
		);
	}

	#[test]
	fn redirections_may_interleave_with_arguments() {
		let pl = parse_pipeline("cmd a < in b > out c").unwrap();
		assert_eq!(pl.stages[0].argv, vec!["cmd", "a", "b", "c"]);
		assert_eq!(pl.stages[0].redirs.len(), 2);
	}

	#[test]
	fn empty_pipe_segments_are_rejected() {
		assert_eq!(syntax_msg(parse_pipeline("a || b")), "");
		assert_eq!(syntax_msg(parse_pipeline("| a")), "");
		assert_eq!(syntax_msg(parse_pipeline("a |")), "");
		assert_eq!(syntax_msg(parse_pipeline("   ")), "");
	}

	#[test]
	fn missing_redirection_target() {
		assert_eq!(syntax_msg(parse_pipeline("echo >")), "redirection: missing file name");
		assert_eq!(syntax_msg(parse_pipeline("echo <")), "redirection: missing file name");
	}

	#[test]
	fn stage_limit_is_enforced() {
		let line = vec!["true"; MAX_STAGES + 1].join(" | ");
		assert_eq!(syntax_msg(parse_pipeline(&line)), "too many pipeline stages (max 16)");
	}

	#[test]
	fn argument_limit_is_enforced() {
		let line = vec!["x"; MAX_ARGS].join(" ");
		assert_eq!(syntax_msg(parse_pipeline(&line)), "too many arguments (max 63)");
	}

	#[test]
	fn redirection_limit_is_enforced() {
		let mut line = String::from("cmd");
		for i in 0..=MAX_REDIRS {
			line.push_str(&format!(" > f{}", i));
		}
		assert_eq!(syntax_msg(parse_pipeline(&line)), "too many redirections (max 16)");
	}

	#[test]
	fn display_round_trips_structurally() {
		let pl = parse_pipeline("cat <in | grep x arg >out >>log | wc -l").unwrap();
		let redisplayed = pl.to_string();
		let reparsed = parse_pipeline(&redisplayed).unwrap();
		assert_eq!(pl, reparsed);
	}
}
