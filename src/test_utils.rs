//! Test utilities
//!
//! Scripted collaborators for driving stages without real processes or a
//! terminal, plus proptest generators.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::core::wizard::Prompter;
use crate::error::{ConfigError, ProcessError};
use crate::infra::process::{ProcessCommand, ProcessOutput, ProcessRunner};

type Matcher = Box<dyn Fn(&ProcessCommand) -> bool + Send + Sync>;
type Responder = Box<dyn Fn(&ProcessCommand) -> Result<ProcessOutput, ProcessError> + Send + Sync>;

/// [`ProcessRunner`] with scripted outcomes
///
/// Rules are checked in the order they were added; the first matching rule
/// answers. Commands no rule matches succeed with empty output. Every
/// invocation is recorded.
#[derive(Default)]
pub struct FakeProcessRunner {
    rules: Vec<(Matcher, Responder)>,
    calls: Mutex<Vec<ProcessCommand>>,
}

impl FakeProcessRunner {
    /// Runner on which every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands matching `matcher` with `responder`
    #[must_use]
    pub fn on<M, R>(mut self, matcher: M, responder: R) -> Self
    where
        M: Fn(&ProcessCommand) -> bool + Send + Sync + 'static,
        R: Fn(&ProcessCommand) -> Result<ProcessOutput, ProcessError> + Send + Sync + 'static,
    {
        self.rules.push((Box::new(matcher), Box::new(responder)));
        self
    }

    /// Successful output carrying `stdout`
    pub fn stdout(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// Non-zero exit of `command`
    pub fn failure(command: &ProcessCommand, code: i32, stderr: &str) -> ProcessError {
        ProcessError::Failed {
            command: command.to_string(),
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Names of the programs run so far, in order
    pub fn programs(&self) -> Vec<String> {
        self.calls().iter().map(ProcessCommand::program_name).collect()
    }
}

impl ProcessRunner for FakeProcessRunner {
    fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        self.rules
            .iter()
            .find(|(matcher, _)| matcher(command))
            .map_or_else(|| Ok(ProcessOutput::default()), |(_, respond)| respond(command))
    }
}

/// Matches commands whose program name (no directory, no extension) is `name`
pub fn program_is(name: &'static str) -> impl Fn(&ProcessCommand) -> bool + Send + Sync {
    move |cmd| cmd.program_name() == name
}

/// Matches commands with `arg` among their arguments
pub fn has_arg(arg: &'static str) -> impl Fn(&ProcessCommand) -> bool + Send + Sync {
    move |cmd| cmd.args_lossy().iter().any(|a| a == arg)
}

/// One scripted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Typed text
    Text(String),
    /// Yes/no
    Confirm(bool),
    /// Empty line: take the prompt's default
    Default,
    /// End of input
    Eof,
}

/// [`Prompter`] answering from a fixed script
///
/// An exhausted script behaves like end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    questions: Vec<String>,
    notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            ..Self::default()
        }
    }

    /// Questions asked so far
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Notices shown so far
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Whether every scripted answer was consumed
    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }
}

impl Prompter for ScriptedPrompter {
    fn input(
        &mut self,
        question: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(Answer::Text(text)) => Ok(Some(text)),
            Some(Answer::Default) => Ok(Some(default.unwrap_or_default().to_string())),
            Some(Answer::Confirm(b)) => panic!("Scripted yes/no ({b}) for text prompt: {question}"),
            Some(Answer::Eof) | None => Ok(None),
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>, ConfigError> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(Answer::Confirm(b)) => Ok(Some(b)),
            Some(Answer::Default) => Ok(Some(default)),
            Some(Answer::Text(t)) => panic!("Scripted text '{t}' for yes/no prompt: {question}"),
            Some(Answer::Eof) | None => Ok(None),
        }
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Split a command line on whitespace, honouring double quotes
///
/// Mirrors how a shell hands a reproduced command back to the parser.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

pub mod generators {
    use proptest::prelude::*;

    use crate::core::config::Arch;

    /// `MAJOR.MINOR.PATCH` runtime version
    pub fn python_version() -> impl Strategy<Value = String> {
        (2u32..4, 0u32..20, 0u32..30)
            .prop_map(|(major, minor, patch)| format!("{major}.{minor}.{patch}"))
    }

    /// Any target architecture
    pub fn arch() -> impl Strategy<Value = Arch> {
        prop::sample::select(Arch::ALL.to_vec())
    }

    /// Folder or file name, sometimes with spaces or a leading hyphen
    pub fn file_name() -> impl Strategy<Value = String> {
        "-?[A-Za-z][A-Za-z0-9_]{0,8}( [A-Za-z0-9_]{1,6})?"
    }

    /// Script file name
    pub fn script_name() -> impl Strategy<Value = String> {
        file_name().prop_map(|stem| format!("{stem}.py"))
    }

    /// Mirror URL
    pub fn mirror() -> impl Strategy<Value = String> {
        ("[a-z]{3,10}", prop_oneof!["com", "org", "edu.cn"])
            .prop_map(|(host, tld)| format!("https://{host}.{tld}/simple"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_command_line_quotes() {
        assert_eq!(
            split_command_line(r#"pysuitcase "C:\My Project" --app-folder app"#),
            vec!["pysuitcase", r"C:\My Project", "--app-folder", "app"]
        );
    }

    #[test]
    fn test_split_command_line_empty_quoted_token() {
        assert_eq!(split_command_line(r#"a "" b"#), vec!["a", "", "b"]);
    }

    #[test]
    fn test_fake_runner_records_and_matches_in_order() {
        let runner = FakeProcessRunner::new()
            .on(program_is("cl"), |cmd| Err(FakeProcessRunner::failure(cmd, 2, "C1083")))
            .on(|_| true, |_| Ok(FakeProcessRunner::stdout("ok")));

        let ok = runner.run(&ProcessCommand::new("rc")).unwrap();
        assert_eq!(ok.stdout, "ok");
        let err = runner.run(&ProcessCommand::new("cl.exe")).unwrap_err();
        assert_eq!(err.stderr(), Some("C1083"));
        assert_eq!(runner.programs(), vec!["rc", "cl"]);
    }

    #[test]
    fn test_scripted_prompter_defaults_and_eof() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Default, Answer::Default]);
        assert_eq!(
            prompter.input("Folder?", Some("app")).unwrap(),
            Some("app".to_string())
        );
        assert_eq!(prompter.confirm("Sure?", true).unwrap(), Some(true));
        assert_eq!(prompter.confirm("Again?", true).unwrap(), None);
        assert_eq!(prompter.questions().len(), 3);
        assert!(prompter.is_exhausted());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_python_version_generator(version in python_version()) {
            prop_assert_eq!(version.split('.').count(), 3);
            prop_assert!(semver::Version::parse(&version).is_ok());
        }

        #[test]
        fn test_file_name_generator_splits_back(name in file_name()) {
            let line = if name.contains(' ') { format!("\"{name}\"") } else { name.clone() };
            prop_assert_eq!(split_command_line(&line), vec![name]);
        }
    }
}
