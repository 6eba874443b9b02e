//! Pure validation of SMTP pipelining rules (RFC 2920).

use crate::command::CommandKind;
use crate::error::Error;

/// Validates an ordered, non-empty list of command kinds against the
/// pipelining rules, returning the first violation found.
///
/// The optional leading content payload of a submission is not a command
/// and is never passed here — it is always the first wire unit when
/// present, ahead of every command in this list.
///
/// Pure and stateless: the same input always yields the same result, with
/// no connection identifier or other session state involved.
pub fn validate(kinds: &[CommandKind]) -> Result<(), Error> {
    if kinds.len() == 1 {
        return Ok(());
    }

    for (i, kind) in kinds.iter().enumerate() {
        let is_last = i == kinds.len() - 1;
        match kind {
            CommandKind::Helo => {
                return Err(Error::InvalidArgument(
                    "HELO cannot be used in a pipelined request".to_string(),
                ))
            }
            CommandKind::Help => {
                return Err(Error::InvalidArgument(
                    "HELP cannot be used in a pipelined request".to_string(),
                ))
            }
            CommandKind::Data if !is_last => {
                return Err(Error::InvalidArgument(
                    "DATA must appear last in a pipelined request".to_string(),
                ))
            }
            CommandKind::Ehlo if !is_last => {
                return Err(Error::InvalidArgument(
                    "EHLO must appear last in a pipelined request".to_string(),
                ))
            }
            CommandKind::Noop if !is_last => {
                return Err(Error::InvalidArgument(
                    "NOOP must appear last in a pipelined request".to_string(),
                ))
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_command_always_accepted() {
        assert!(validate(&[CommandKind::Helo]).is_ok());
        assert!(validate(&[CommandKind::Data]).is_ok());
    }

    #[test]
    fn test_helo_rejected_when_pipelined() {
        let err = validate(&[CommandKind::Helo, CommandKind::Other]).unwrap_err();
        assert_eq!(format!("{}", err), "HELO cannot be used in a pipelined request");
    }

    #[test]
    fn test_help_rejected_when_pipelined() {
        let err = validate(&[CommandKind::Other, CommandKind::Help]).unwrap_err();
        assert_eq!(format!("{}", err), "HELP cannot be used in a pipelined request");
    }

    #[test]
    fn test_data_must_be_last() {
        let err = validate(&[CommandKind::Data, CommandKind::Other]).unwrap_err();
        assert_eq!(format!("{}", err), "DATA must appear last in a pipelined request");
    }

    #[test]
    fn test_data_last_is_fine() {
        assert!(validate(&[CommandKind::Other, CommandKind::Other, CommandKind::Data]).is_ok());
    }

    #[test]
    fn test_ehlo_and_noop_must_be_last() {
        assert!(validate(&[CommandKind::Ehlo, CommandKind::Other]).is_err());
        assert!(validate(&[CommandKind::Other, CommandKind::Ehlo]).is_ok());
        assert!(validate(&[CommandKind::Noop, CommandKind::Other]).is_err());
        assert!(validate(&[CommandKind::Other, CommandKind::Noop]).is_ok());
    }

    #[test]
    fn test_pure_same_input_same_result() {
        let kinds = [CommandKind::Other, CommandKind::Data];
        assert_eq!(validate(&kinds).is_ok(), validate(&kinds).is_ok());
    }
}
