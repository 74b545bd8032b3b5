//! # Telecommand module
//!
//! Telecommands arrive over a text stream as single characters. Each character maps to exactly
//! one command, characters which don't map to a command are rejected by the parser and ignored by
//! the processor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
use crate::eqpt::mech::MotorId;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the arm by the operator.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Copy, Clone)]
pub enum Tc {
    /// Dump joystick and servo diagnostics (`i`)
    Info,

    /// Select the motor subsequent commands apply to (`1` to `4`)
    Select(MotorId),

    /// Report the current angle of the selected motor (`a`)
    ReportAngle,

    /// Step the selected motor up by one step (`+`)
    NudgeUp,

    /// Step the selected motor down by one step (`-`)
    NudgeDown,

    /// Set the selected motor's minimum limit to its current angle (`<`)
    SetMin,

    /// Set the selected motor's maximum limit to its current angle (`>`)
    SetMax,
}

/// Possible parsing errors.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum TcParseError {
    #[error("{0:?} is not a recognised TC character")]
    UnknownCommand(char),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a TC from the character received on the command stream.
    pub fn from_char(c: char) -> Result<Self, TcParseError> {
        match c {
            'i' => Ok(Tc::Info),
            '1' => Ok(Tc::Select(MotorId::Base)),
            '2' => Ok(Tc::Select(MotorId::Reach)),
            '3' => Ok(Tc::Select(MotorId::Height)),
            '4' => Ok(Tc::Select(MotorId::Claw)),
            'a' => Ok(Tc::ReportAngle),
            '+' => Ok(Tc::NudgeUp),
            '-' => Ok(Tc::NudgeDown),
            '<' => Ok(Tc::SetMin),
            '>' => Ok(Tc::SetMax),
            _ => Err(TcParseError::UnknownCommand(c))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_char() {
        assert_eq!(Tc::from_char('i'), Ok(Tc::Info));
        assert_eq!(Tc::from_char('3'), Ok(Tc::Select(MotorId::Height)));
        assert_eq!(Tc::from_char('4'), Ok(Tc::Select(MotorId::Claw)));
        assert_eq!(Tc::from_char('<'), Ok(Tc::SetMin));
        assert_eq!(Tc::from_char('-'), Ok(Tc::NudgeDown));

        assert_eq!(Tc::from_char('5'), Err(TcParseError::UnknownCommand('5')));
        assert_eq!(Tc::from_char('\n'), Err(TcParseError::UnknownCommand('\n')));
        assert_eq!(Tc::from_char('I'), Err(TcParseError::UnknownCommand('I')));
    }
}
