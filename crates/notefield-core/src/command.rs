//! Commands sent from the editor to the host application.
//!
//! On the wire every command is a single string:
//!
//! - `focus:<ordinal>`
//! - `key:<ordinal>:<noteId>:<content>` and `blur:<ordinal>:<noteId>:<content>`,
//!   with `null` as the note id while the host has not set one
//! - `paste`
//! - `cutOrCopy`
//!
//! Content is the last component and may itself contain `:`.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Host-assigned identifier of the note being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Why a field's content is being saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// Debounced save while typing, or an explicit save keeping focus.
    Key,
    /// Save on focus leaving the field.
    Blur,
}

impl SaveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Blur => "blur",
        }
    }
}

/// Note id placeholder on the wire when no note id is set.
pub const NULL_NOTE_ID: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Focus {
        ordinal: usize,
    },
    Save {
        kind: SaveKind,
        ordinal: usize,
        note_id: Option<NoteId>,
        content: String,
    },
    Paste,
    CutOrCopy,
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focus { ordinal } => write!(f, "focus:{ordinal}"),
            Self::Save {
                kind,
                ordinal,
                note_id,
                content,
            } => {
                write!(f, "{}:{ordinal}:", kind.as_str())?;
                match note_id {
                    Some(id) => write!(f, "{id}")?,
                    None => f.write_str(NULL_NOTE_ID)?,
                }
                write!(f, ":{content}")
            }
            Self::Paste => f.write_str("paste"),
            Self::CutOrCopy => f.write_str("cutOrCopy"),
        }
    }
}

/// Errors from parsing a wire command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    /// A required component is missing.
    #[error("`{command}` command is missing its {component}")]
    Missing {
        command: &'static str,
        component: &'static str,
    },

    #[error("`{0}` takes no arguments")]
    UnexpectedArguments(&'static str),

    #[error("invalid ordinal {value:?}: {source}")]
    InvalidOrdinal {
        value: String,
        source: ParseIntError,
    },

    #[error("invalid note id {value:?}: {source}")]
    InvalidNoteId {
        value: String,
        source: ParseIntError,
    },
}

fn parse_ordinal(value: &str) -> Result<usize, CommandParseError> {
    value
        .parse()
        .map_err(|source| CommandParseError::InvalidOrdinal {
            value: value.to_string(),
            source,
        })
}

fn parse_note_id(value: &str) -> Result<Option<NoteId>, CommandParseError> {
    if value == NULL_NOTE_ID {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|source| CommandParseError::InvalidNoteId {
            value: value.to_string(),
            source,
        })
}

fn no_arguments(
    args: Option<&str>,
    command: HostCommand,
    name: &'static str,
) -> Result<HostCommand, CommandParseError> {
    match args {
        Some(_) => Err(CommandParseError::UnexpectedArguments(name)),
        None => Ok(command),
    }
}

fn parse_save(kind: SaveKind, args: Option<&str>) -> Result<HostCommand, CommandParseError> {
    let command = kind.as_str();
    let missing = |component| CommandParseError::Missing { command, component };

    let mut parts = args.ok_or_else(|| missing("ordinal"))?.splitn(3, ':');
    let ordinal = parts.next().ok_or_else(|| missing("ordinal"))?;
    let note_id = parts.next().ok_or_else(|| missing("note id"))?;
    let content = parts.next().ok_or_else(|| missing("content"))?;

    Ok(HostCommand::Save {
        kind,
        ordinal: parse_ordinal(ordinal)?,
        note_id: parse_note_id(note_id)?,
        content: content.to_string(),
    })
}

impl FromStr for HostCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let (name, args) = match s.split_once(':') {
            Some((name, args)) => (name, Some(args)),
            None => (s, None),
        };

        match name {
            "paste" => no_arguments(args, Self::Paste, "paste"),
            "cutOrCopy" => no_arguments(args, Self::CutOrCopy, "cutOrCopy"),
            "focus" => {
                let ordinal = args.ok_or(CommandParseError::Missing {
                    command: "focus",
                    component: "ordinal",
                })?;
                Ok(Self::Focus {
                    ordinal: parse_ordinal(ordinal)?,
                })
            }
            "key" => parse_save(SaveKind::Key, args),
            "blur" => parse_save(SaveKind::Blur, args),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(HostCommand::Focus { ordinal: 3 }.to_string(), "focus:3");
        assert_eq!(
            HostCommand::Save {
                kind: SaveKind::Blur,
                ordinal: 0,
                note_id: Some(NoteId(1234)),
                content: "<b>a:b</b>".into(),
            }
            .to_string(),
            "blur:0:1234:<b>a:b</b>"
        );
        assert_eq!(HostCommand::Paste.to_string(), "paste");
        assert_eq!(HostCommand::CutOrCopy.to_string(), "cutOrCopy");
    }

    #[test]
    fn test_parse_save_keeps_colons_in_content() {
        let command: HostCommand = "key:1:-5:a:b:c".parse().unwrap();
        assert_eq!(
            command,
            HostCommand::Save {
                kind: SaveKind::Key,
                ordinal: 1,
                note_id: Some(NoteId(-5)),
                content: "a:b:c".into(),
            }
        );
    }

    #[test]
    fn test_missing_note_id_is_null_on_the_wire() {
        let command = HostCommand::Save {
            kind: SaveKind::Key,
            ordinal: 0,
            note_id: None,
            content: "abc".into(),
        };
        assert_eq!(command.to_string(), "key:0:null:abc");
        assert_eq!("key:0:null:abc".parse::<HostCommand>(), Ok(command));
    }

    #[test]
    fn test_parse_empty_content() {
        let command: HostCommand = "blur:2:7:".parse().unwrap();
        assert!(matches!(command, HostCommand::Save { ref content, .. } if content.is_empty()));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("paste".parse::<HostCommand>(), Ok(HostCommand::Paste));
        assert_eq!("cutOrCopy".parse::<HostCommand>(), Ok(HostCommand::CutOrCopy));
        assert_eq!(
            "focus:12".parse::<HostCommand>(),
            Ok(HostCommand::Focus { ordinal: 12 })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<HostCommand>(), Err(CommandParseError::Empty));
        assert!(matches!(
            "save:1".parse::<HostCommand>(),
            Err(CommandParseError::Unknown(name)) if name == "save"
        ));
        assert!(matches!(
            "paste:now".parse::<HostCommand>(),
            Err(CommandParseError::UnexpectedArguments("paste"))
        ));
        assert!(matches!(
            "focus".parse::<HostCommand>(),
            Err(CommandParseError::Missing { component: "ordinal", .. })
        ));
        assert!(matches!(
            "focus:1:2".parse::<HostCommand>(),
            Err(CommandParseError::InvalidOrdinal { .. })
        ));
        assert!(matches!(
            "key:1:abc:x".parse::<HostCommand>(),
            Err(CommandParseError::InvalidNoteId { .. })
        ));
        assert!(matches!(
            "key:1:2".parse::<HostCommand>(),
            Err(CommandParseError::Missing { component: "content", .. })
        ));
    }

    #[test]
    fn test_display_parse_round_trip() {
        let command = HostCommand::Save {
            kind: SaveKind::Key,
            ordinal: 4,
            note_id: Some(NoteId(99)),
            content: "x:y".into(),
        };
        assert_eq!(command.to_string().parse::<HostCommand>(), Ok(command));
    }
}
