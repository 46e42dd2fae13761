use derive_more::{AsRef, Deref, Display, From, Into};
use ringmenu::Item;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ShellCommand(String);

ringmenu::impl_string_newtype!(ShellCommand);

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Command line is empty")]
    EmptyCommand,
    #[error("Invalid command line: {0}")]
    Parse(#[from] shell_words::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What a confirmed item does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    /// Spawn a detached process.
    Exec(ShellCommand),
    /// Write a line to stdout, for scripts driving the menu.
    Print(String),
}

impl ItemAction {
    pub fn run(&self) -> Result<(), ActionError> {
        match self {
            Self::Exec(cmd) => spawn(cmd),
            Self::Print(text) => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", text)?;
                out.flush()?;
                Ok(())
            }
        }
    }

    /// Closure suitable for [`Item::on_activate`]; failures are logged.
    pub fn into_callback(self) -> impl Fn(&Item) + 'static {
        move |item: &Item| {
            if let Err(e) = self.run() {
                log::error!("Action for '{}' failed: {}", item.glyph(), e);
            }
        }
    }
}

pub fn split_command(cmd: &ShellCommand) -> Result<Vec<String>, ActionError> {
    let args = shell_words::split(cmd.as_str())?;
    if args.is_empty() {
        return Err(ActionError::EmptyCommand);
    }
    Ok(args)
}

pub fn spawn(cmd: &ShellCommand) -> Result<(), ActionError> {
    let args = split_command(cmd)?;
    Command::new(&args[0])
        .args(&args[1..])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command_honours_quotes() {
        let cmd = ShellCommand::from("notify-send 'Pen selected' --urgency=low");
        assert_eq!(
            split_command(&cmd).unwrap(),
            vec!["notify-send", "Pen selected", "--urgency=low"]
        );
    }

    #[test]
    fn test_split_command_rejects_empty_and_unbalanced() {
        assert!(matches!(
            split_command(&ShellCommand::from("   ")),
            Err(ActionError::EmptyCommand)
        ));
        assert!(matches!(
            split_command(&ShellCommand::from("echo 'oops")),
            Err(ActionError::Parse(_))
        ));
    }

    #[test]
    fn test_spawn_missing_binary_is_io_error() {
        let cmd = ShellCommand::from("ringpop-definitely-not-a-real-binary --flag");
        assert!(matches!(spawn(&cmd), Err(ActionError::Io(_))));
    }
}
