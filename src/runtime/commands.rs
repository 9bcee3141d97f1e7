use std::path::PathBuf;

use thiserror::Error;

use platter::{RepeatMode, ShuffleMode};

/// Step used by `vol +` and `vol -`.
pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeChange {
    Show,
    Up,
    Down,
    Set(f32),
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Stop,
    Next,
    Prev,
    /// Set the repeat mode, or cycle it when no argument is given.
    Repeat(Option<RepeatMode>),
    /// Set shuffle, or toggle it when no argument is given.
    Shuffle(Option<ShuffleMode>),
    Search(String),
    List,
    /// 1-based queue position.
    Goto(usize),
    /// 1-based queue position.
    Remove(usize),
    Clear,
    /// Rescan the current folder, or switch to another one.
    Rescan(Option<PathBuf>),
    /// Append a single audio file to the queue.
    Add(PathBuf),
    Volume(VolumeChange),
    Status,
    Config,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{cmd}` needs {what}")]
    MissingArgument { cmd: &'static str, what: &'static str },
    #[error("invalid argument `{arg}` for `{cmd}`")]
    InvalidArgument { cmd: &'static str, arg: String },
}

pub const HELP: &str = "\
commands:
  play | pause | toggle | stop
  next | prev
  repeat [off|one|all]     cycle or set repeat mode
  shuffle [on|off]         toggle or set shuffle
  search <query>           list matching queue entries
  list                     show the queue
  goto <n>                 play entry n
  remove <n>               remove entry n
  clear                    empty the queue
  rescan [folder]          rescan the library folder
  add <file>               append one audio file
  vol [+|-|0.0-1.0]        show, step or set the volume
  status | config | help | quit";

impl Command {
    /// Parse a trimmed input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "play" | "p" => Self::Play,
            "pause" => Self::Pause,
            "toggle" | "t" => Self::Toggle,
            "stop" | "s" => Self::Stop,
            "next" | "n" => Self::Next,
            "prev" | "previous" => Self::Prev,
            "repeat" | "r" => {
                if rest.is_empty() {
                    Self::Repeat(None)
                } else {
                    let mode = RepeatMode::parse(rest).ok_or_else(|| {
                        CommandError::InvalidArgument {
                            cmd: "repeat",
                            arg: rest.to_string(),
                        }
                    })?;
                    Self::Repeat(Some(mode))
                }
            }
            "shuffle" | "z" => match rest.to_ascii_lowercase().as_str() {
                "" => Self::Shuffle(None),
                "on" => Self::Shuffle(Some(ShuffleMode::On)),
                "off" => Self::Shuffle(Some(ShuffleMode::Off)),
                _ => {
                    return Err(CommandError::InvalidArgument {
                        cmd: "shuffle",
                        arg: rest.to_string(),
                    });
                }
            },
            "search" | "/" => Self::Search(rest.to_string()),
            "list" | "ls" => Self::List,
            "goto" | "g" => Self::Goto(position("goto", rest)?),
            "remove" | "rm" => Self::Remove(position("remove", rest)?),
            "clear" => Self::Clear,
            "rescan" => Self::Rescan((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "add" | "a" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        cmd: "add",
                        what: "a file path",
                    });
                }
                Self::Add(PathBuf::from(rest))
            }
            "vol" | "volume" => Self::Volume(volume(rest)?),
            "status" => Self::Status,
            "config" => Self::Config,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(cmd))
    }
}

fn volume(arg: &str) -> Result<VolumeChange, CommandError> {
    match arg {
        "" => Ok(VolumeChange::Show),
        "+" | "up" => Ok(VolumeChange::Up),
        "-" | "down" => Ok(VolumeChange::Down),
        _ => match arg.parse::<f32>() {
            Ok(v) if (0.0..=1.0).contains(&v) => Ok(VolumeChange::Set(v)),
            _ => Err(CommandError::InvalidArgument {
                cmd: "vol",
                arg: arg.to_string(),
            }),
        },
    }
}

fn position(cmd: &'static str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            cmd,
            what: "a queue position",
        });
    }
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CommandError::InvalidArgument {
            cmd,
            arg: arg.to_string(),
        }),
    }
}
