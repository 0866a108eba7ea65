//! External command descriptions
//!
//! Commands are kept as discrete argv tokens and handed to the OS without a
//! shell, so a value containing quotes, `&&` or newlines stays one argument.
//! User-supplied positionals are placed after an end-of-options marker (`--`)
//! so a value starting with `-` cannot be read as a flag.

use std::borrow::Cow;
use std::fmt;

/// End-of-options marker separating flags from positionals
pub const END_OF_OPTIONS: &str = "--";

/// A program plus its ordered argument tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by its arguments
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Renders as a single POSIX-shell-quoted line. For logs only; never executed.
impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a token for display in a POSIX shell.
pub fn shell_quote(token: &str) -> Cow<'_, str> {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./,:=@+%".contains(c));
    if plain {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(format!("'{}'", token.replace('\'', r"'\''")))
    }
}

/// Incrementally assembles an [`ExternalCommand`].
///
/// Flags keep their insertion order; positionals always come last.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    flags: Vec<String>,
    positionals: Vec<String>,
}

impl CommandBuilder {
    /// Start a command with its fixed subcommand path, e.g. `["repo", "list"]`.
    pub fn new(program: &str, subcommand: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            flags: subcommand.iter().map(|s| s.to_string()).collect(),
            positionals: Vec::new(),
        }
    }

    /// `--flag value` as two tokens
    pub fn option(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.flags.push(flag.to_string());
        self.flags.push(value.into());
        self
    }

    /// `--flag value` only when a value is present
    pub fn option_if<S: Into<String>>(self, flag: &str, value: Option<S>) -> Self {
        match value {
            Some(value) => self.option(flag, value),
            None => self,
        }
    }

    /// Bare `--flag`
    pub fn switch(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    pub fn switch_if(self, enabled: bool, flag: &str) -> Self {
        if enabled { self.switch(flag) } else { self }
    }

    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.positionals.push(value.into());
        self
    }

    pub fn positional_if<S: Into<String>>(self, value: Option<S>) -> Self {
        match value {
            Some(value) => self.positional(value),
            None => self,
        }
    }

    pub fn build(self) -> ExternalCommand {
        let mut args = self.flags;
        if !self.positionals.is_empty() {
            args.push(END_OF_OPTIONS.to_string());
            args.extend(self.positionals);
        }
        ExternalCommand {
            program: self.program,
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn positionals_follow_end_of_options() {
        let cmd = CommandBuilder::new("gh", &["repo", "create"])
            .positional("octo/demo")
            .switch("--public")
            .option("--description", "hello")
            .build();

        assert_eq!(
            cmd.tokens(),
            vec![
                "gh",
                "repo",
                "create",
                "--public",
                "--description",
                "hello",
                "--",
                "octo/demo"
            ]
        );
    }

    #[test]
    fn no_marker_without_positionals() {
        let cmd = CommandBuilder::new("gh", &["workflow", "list"])
            .option("--repo", "octo/demo")
            .build();
        assert!(!cmd.args().iter().any(|a| a == END_OF_OPTIONS));
    }

    #[test]
    fn conditional_parts() {
        let cmd = CommandBuilder::new("gh", &["pr", "create"])
            .option_if("--body", None::<String>)
            .option_if("--title", Some("t"))
            .switch_if(false, "--draft")
            .switch_if(true, "--web")
            .positional_if(None::<&str>)
            .build();
        assert_eq!(cmd.args(), &["pr", "create", "--title", "t", "--web"]);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("octo/repo", "octo/repo")]
    #[case("", "''")]
    #[case("two words", "'two words'")]
    #[case("it's", r"'it'\''s'")]
    #[case("a && rm -rf /", "'a && rm -rf /'")]
    fn quoting(#[case] token: &str, #[case] expected: &str) {
        assert_eq!(shell_quote(token), expected);
    }

    #[test]
    fn display_quotes_each_token() {
        let cmd = ExternalCommand::new("gh", ["issue", "create", "--title", "Fix \"quotes\""]);
        insta::assert_snapshot!(cmd.to_string(), @r#"gh issue create --title 'Fix "quotes"'"#);
    }
}
