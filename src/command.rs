//! SMTP commands and the classification used by the pipelining validator.

use std::fmt::{self, Display, Formatter};

/// Which pipelining rule applies to a command, independent of how it renders
/// on the wire. `Other` covers every command with no special pipelining
/// treatment (`MAIL`, `RCPT`, `QUIT`, `RSET`, `VRFY`, `EXPN`, `STARTTLS`, ...).
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CommandKind {
    /// `HELO` — never allowed in a pipelined request.
    Helo,
    /// `HELP` — never allowed in a pipelined request.
    Help,
    /// `DATA` — must be last if pipelined.
    Data,
    /// `EHLO` — must be last if pipelined.
    Ehlo,
    /// `NOOP` — must be last if pipelined.
    Noop,
    /// Any other command.
    Other,
}

/// A command that can be placed in a pipelined submission.
///
/// `Display` renders the exact CRLF-terminated wire form; `kind` reports the
/// classification the validator needs without re-parsing that text.
pub trait SmtpCommand: Display {
    /// This command's pipelining classification.
    fn kind(&self) -> CommandKind;
}

/// `EHLO` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct EhloCommand {
    client_id: String,
}

impl EhloCommand {
    /// Creates an EHLO command naming `client_id` (a domain or bracketed
    /// address literal; constructing that literal is a higher layer's job).
    pub fn new(client_id: impl Into<String>) -> Self {
        EhloCommand {
            client_id: client_id.into(),
        }
    }
}

impl Display for EhloCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "EHLO {}\r\n", self.client_id)
    }
}

impl SmtpCommand for EhloCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Ehlo
    }
}

/// `HELO` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct HeloCommand {
    client_id: String,
}

impl HeloCommand {
    /// Creates a HELO command naming `client_id`.
    pub fn new(client_id: impl Into<String>) -> Self {
        HeloCommand {
            client_id: client_id.into(),
        }
    }
}

impl Display for HeloCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "HELO {}\r\n", self.client_id)
    }
}

impl SmtpCommand for HeloCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Helo
    }
}

/// `STARTTLS` command.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct StarttlsCommand;

impl Display for StarttlsCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("STARTTLS\r\n")
    }
}

impl SmtpCommand for StarttlsCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

/// `MAIL FROM` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MailCommand {
    sender: Option<String>,
    parameters: Vec<String>,
}

impl MailCommand {
    /// Creates a MAIL command. `sender` is the already-validated address
    /// (without angle brackets); `parameters` are already-rendered
    /// `KEYWORD[=VALUE]` extension parameters.
    pub fn new(sender: Option<String>, parameters: Vec<String>) -> Self {
        MailCommand { sender, parameters }
    }
}

impl Display for MailCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "MAIL FROM:<{}>", self.sender.as_deref().unwrap_or(""))?;
        for parameter in &self.parameters {
            write!(f, " {}", parameter)?;
        }
        f.write_str("\r\n")
    }
}

impl SmtpCommand for MailCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

/// `RCPT TO` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RcptCommand {
    recipient: String,
    parameters: Vec<String>,
}

impl RcptCommand {
    /// Creates an RCPT command for the already-validated `recipient` address.
    pub fn new(recipient: impl Into<String>, parameters: Vec<String>) -> Self {
        RcptCommand {
            recipient: recipient.into(),
            parameters,
        }
    }
}

impl Display for RcptCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "RCPT TO:<{}>", self.recipient)?;
        for parameter in &self.parameters {
            write!(f, " {}", parameter)?;
        }
        f.write_str("\r\n")
    }
}

impl SmtpCommand for RcptCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

/// `DATA` command.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DataCommand;

impl Display for DataCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("DATA\r\n")
    }
}

impl SmtpCommand for DataCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Data
    }
}

/// `NOOP` command.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct NoopCommand;

impl Display for NoopCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("NOOP\r\n")
    }
}

impl SmtpCommand for NoopCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Noop
    }
}

/// `HELP` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct HelpCommand {
    argument: Option<String>,
}

impl HelpCommand {
    /// Creates a HELP command, optionally about a specific topic.
    pub fn new(argument: Option<String>) -> Self {
        HelpCommand { argument }
    }
}

impl Display for HelpCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("HELP")?;
        if let Some(arg) = &self.argument {
            write!(f, " {}", arg)?;
        }
        f.write_str("\r\n")
    }
}

impl SmtpCommand for HelpCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Help
    }
}

/// `QUIT` command.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct QuitCommand;

impl Display for QuitCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("QUIT\r\n")
    }
}

impl SmtpCommand for QuitCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

/// `RSET` command.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct RsetCommand;

impl Display for RsetCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("RSET\r\n")
    }
}

impl SmtpCommand for RsetCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

/// `VRFY` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct VrfyCommand {
    argument: String,
}

impl VrfyCommand {
    /// Creates a VRFY command.
    pub fn new(argument: impl Into<String>) -> Self {
        VrfyCommand {
            argument: argument.into(),
        }
    }
}

impl Display for VrfyCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "VRFY {}\r\n", self.argument)
    }
}

impl SmtpCommand for VrfyCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

/// `EXPN` command.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ExpnCommand {
    argument: String,
}

impl ExpnCommand {
    /// Creates an EXPN command.
    pub fn new(argument: impl Into<String>) -> Self {
        ExpnCommand {
            argument: argument.into(),
        }
    }
}

impl Display for ExpnCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "EXPN {}\r\n", self.argument)
    }
}

impl SmtpCommand for ExpnCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", EhloCommand::new("localhost")),
            "EHLO localhost\r\n"
        );
        assert_eq!(
            format!("{}", HeloCommand::new("localhost")),
            "HELO localhost\r\n"
        );
        assert_eq!(
            format!("{}", MailCommand::new(Some("a@b.com".to_string()), vec![])),
            "MAIL FROM:<a@b.com>\r\n"
        );
        assert_eq!(
            format!("{}", MailCommand::new(None, vec![])),
            "MAIL FROM:<>\r\n"
        );
        assert_eq!(
            format!(
                "{}",
                MailCommand::new(Some("a@b.com".to_string()), vec!["SIZE=42".to_string()])
            ),
            "MAIL FROM:<a@b.com> SIZE=42\r\n"
        );
        assert_eq!(
            format!("{}", RcptCommand::new("a@b.com", vec![])),
            "RCPT TO:<a@b.com>\r\n"
        );
        assert_eq!(format!("{}", DataCommand), "DATA\r\n");
        assert_eq!(format!("{}", NoopCommand), "NOOP\r\n");
        assert_eq!(format!("{}", QuitCommand), "QUIT\r\n");
        assert_eq!(format!("{}", RsetCommand), "RSET\r\n");
        assert_eq!(format!("{}", HelpCommand::new(None)), "HELP\r\n");
        assert_eq!(
            format!("{}", HelpCommand::new(Some("MAIL".to_string()))),
            "HELP MAIL\r\n"
        );
        assert_eq!(format!("{}", VrfyCommand::new("alice")), "VRFY alice\r\n");
        assert_eq!(format!("{}", ExpnCommand::new("staff")), "EXPN staff\r\n");
    }

    #[test]
    fn test_kind() {
        assert_eq!(EhloCommand::new("x").kind(), CommandKind::Ehlo);
        assert_eq!(HeloCommand::new("x").kind(), CommandKind::Helo);
        assert_eq!(DataCommand.kind(), CommandKind::Data);
        assert_eq!(NoopCommand.kind(), CommandKind::Noop);
        assert_eq!(HelpCommand::new(None).kind(), CommandKind::Help);
        assert_eq!(QuitCommand.kind(), CommandKind::Other);
    }
}
