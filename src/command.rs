use std::fmt;
use std::str::FromStr;

use crate::model::{EventId, Seat};

/// Upper bound on seat pairs in one RESERVE line.
pub const MAX_RESERVATION_SEATS: usize = 256;

/// Usage text emitted by HELP, verbatim.
pub const HELP_TEXT: &str = "\
Available commands:
  CREATE <event_id> <num_rows> <num_columns>
  RESERVE <event_id> (<x1>,<y1>) (<x2>,<y2>) ...
  SHOW <event_id>
  LIST
  WAIT <delay_ms>
  BARRIER
  HELP
";

/// One parsed job-file line. Verbs are case-sensitive; a blank line parses
/// to `Empty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        event_id: EventId,
        rows: usize,
        cols: usize,
    },
    Reserve {
        event_id: EventId,
        seats: Vec<Seat>,
    },
    Show {
        event_id: EventId,
    },
    List,
    Wait {
        delay_ms: u64,
    },
    Barrier,
    Help,
    Empty,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    WrongArity {
        verb: &'static str,
        expected: usize,
        got: usize,
    },
    InvalidNumber(String),
    ZeroEventId,
    InvalidSeat(String),
    NoSeats,
    TooManySeats(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand(verb) => write!(f, "unknown command: {verb}"),
            ParseError::WrongArity { verb, expected, got } => {
                write!(f, "{verb} takes {expected} arguments, got {got}")
            }
            ParseError::InvalidNumber(token) => write!(f, "invalid number: {token}"),
            ParseError::ZeroEventId => write!(f, "event id must be positive"),
            ParseError::InvalidSeat(token) => write!(f, "malformed seat: {token}"),
            ParseError::NoSeats => write!(f, "RESERVE needs at least one seat"),
            ParseError::TooManySeats(count) => {
                write!(f, "too many seats in one reservation: {count} (max {MAX_RESERVATION_SEATS})")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one line of a job file.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&verb) = tokens.first() else {
        return Ok(Command::Empty);
    };
    let args = &tokens[1..];

    match verb {
        "CREATE" => {
            expect_arity("CREATE", args, 3)?;
            Ok(Command::Create {
                event_id: parse_event_id(args[0])?,
                rows: parse_number(args[1])?,
                cols: parse_number(args[2])?,
            })
        }
        "RESERVE" => {
            let Some((&id_token, seat_tokens)) = args.split_first() else {
                return Err(ParseError::NoSeats);
            };
            let event_id = parse_event_id(id_token)?;
            if seat_tokens.is_empty() {
                return Err(ParseError::NoSeats);
            }
            if seat_tokens.len() > MAX_RESERVATION_SEATS {
                return Err(ParseError::TooManySeats(seat_tokens.len()));
            }
            let seats = seat_tokens
                .iter()
                .map(|t| parse_seat(t))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Reserve { event_id, seats })
        }
        "SHOW" => {
            expect_arity("SHOW", args, 1)?;
            Ok(Command::Show {
                event_id: parse_event_id(args[0])?,
            })
        }
        "LIST" => {
            expect_arity("LIST", args, 0)?;
            Ok(Command::List)
        }
        // A targeted `WAIT <delay> <thread_id>` form is unsupported; any
        // trailing token makes the line invalid.
        "WAIT" => {
            expect_arity("WAIT", args, 1)?;
            Ok(Command::Wait {
                delay_ms: parse_number(args[0])?,
            })
        }
        "BARRIER" => {
            expect_arity("BARRIER", args, 0)?;
            Ok(Command::Barrier)
        }
        "HELP" => {
            expect_arity("HELP", args, 0)?;
            Ok(Command::Help)
        }
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn expect_arity(verb: &'static str, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::WrongArity {
            verb,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn parse_number<T: FromStr>(token: &str) -> Result<T, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.to_string()))
}

fn parse_event_id(token: &str) -> Result<EventId, ParseError> {
    let id: EventId = parse_number(token)?;
    if id == 0 {
        return Err(ParseError::ZeroEventId);
    }
    Ok(id)
}

/// A seat token is `(<row>,<col>)` with no interior whitespace (whitespace
/// would have split the token already).
fn parse_seat(token: &str) -> Result<Seat, ParseError> {
    let invalid = || ParseError::InvalidSeat(token.to_string());
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let (row, col) = inner.split_once(',').ok_or_else(invalid)?;
    Ok(Seat::new(
        row.parse().map_err(|_| invalid())?,
        col.parse().map_err(|_| invalid())?,
    ))
}
