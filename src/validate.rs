use pest::Parser;
use pest_derive::Parser;

/// Recognizer for the whole-line grammar in `shell_cmd.pest`.
///
/// This is deliberately decoupled from the pipeline parser: it only answers
/// yes or no for a full input line, and the sequencer re-reads the text on
/// its own terms afterwards.
#[derive(Parser)]
#[grammar = "shell_cmd.pest"]
struct LineGrammar;

pub fn is_syntactically_valid(line: &str) -> bool {
	LineGrammar::parse(Rule::shell_cmd, line).is_ok()
}
