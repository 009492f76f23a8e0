//! Event scripts replayed against the simulated stack.
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! join
//! write 2/6/0 01        # inbound write, ep/cluster/attribute then hex value
//! cmd 2/0x0006/2        # inbound cluster command, optional hex payload
//! report 2/6/0
//! set 5/0x0012/0x0055 0100
//! send 5/6/2
//! press 5
//! leave
//! ```

use miette::Diagnostic;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, hex_digit1, space0, space1};
use nom::combinator::{all_consuming, map, map_res, opt, value};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;
use relay_data_model::AttributePath;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Join,
    Leave,
    /// Inbound write attributes command.
    Write {
        path: AttributePath,
        value: Vec<u8>,
    },
    /// Inbound cluster-specific command.
    Command {
        endpoint: u8,
        cluster_id: u16,
        command_id: u8,
        payload: Vec<u8>,
    },
    Report(AttributePath),
    /// Local attribute update.
    Set {
        path: AttributePath,
        value: Vec<u8>,
    },
    /// Outbound command to bound peers.
    Send {
        endpoint: u8,
        cluster_id: u16,
        command_id: u8,
        payload: Vec<u8>,
    },
    /// Button press on a switch endpoint.
    Press(u8),
}

#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
#[error("line {line}: cannot parse `{text}`")]
#[diagnostic(
    code(zcl_stub::script),
    help("events are join, leave, write, cmd, report, set, send and press")
)]
pub struct ParseError {
    pub line: usize,
    pub text: String,
}

fn number(input: &str) -> IResult<&str, u32> {
    alt((
        preceded(tag("0x"), map_res(hex_digit1, |s| u32::from_str_radix(s, 16))),
        map_res(digit1, |s: &str| s.parse::<u32>()),
    ))(input)
}

fn byte(input: &str) -> IResult<&str, u8> {
    map_res(number, |n: u32| u8::try_from(n))(input)
}

fn word(input: &str) -> IResult<&str, u16> {
    map_res(number, |n: u32| u16::try_from(n))(input)
}

/// `<u8>/<u16>/<T>`
fn triple<'i, T>(
    last: impl FnMut(&'i str) -> IResult<&'i str, T>,
) -> impl FnMut(&'i str) -> IResult<&'i str, (u8, u16, T)> {
    tuple((byte, preceded(char('/'), word), preceded(char('/'), last)))
}

fn path(input: &str) -> IResult<&str, AttributePath> {
    map(triple(word), |(endpoint, cluster_id, attribute_id)| {
        AttributePath::new(endpoint, cluster_id, attribute_id)
    })(input)
}

fn hex_bytes(input: &str) -> IResult<&str, Vec<u8>> {
    map_res(hex_digit1, hex::decode::<&str>)(input)
}

fn keyword<'i>(name: &'static str) -> impl FnMut(&'i str) -> IResult<&'i str, ()> {
    value((), pair(tag(name), space1))
}

fn command(input: &str) -> IResult<&str, (u8, u16, u8, Vec<u8>)> {
    map(
        pair(triple(byte), opt(preceded(space1, hex_bytes))),
        |((endpoint, cluster_id, command_id), payload)| {
            (endpoint, cluster_id, command_id, payload.unwrap_or_default())
        },
    )(input)
}

fn event(input: &str) -> IResult<&str, Event> {
    alt((
        value(Event::Join, tag("join")),
        value(Event::Leave, tag("leave")),
        map(
            preceded(keyword("write"), pair(path, preceded(space1, hex_bytes))),
            |(path, value)| Event::Write { path, value },
        ),
        map(preceded(keyword("cmd"), command), |(endpoint, cluster_id, command_id, payload)| {
            Event::Command {
                endpoint,
                cluster_id,
                command_id,
                payload,
            }
        }),
        map(preceded(keyword("report"), path), Event::Report),
        map(
            preceded(keyword("set"), pair(path, preceded(space1, hex_bytes))),
            |(path, value)| Event::Set { path, value },
        ),
        map(preceded(keyword("send"), command), |(endpoint, cluster_id, command_id, payload)| {
            Event::Send {
                endpoint,
                cluster_id,
                command_id,
                payload,
            }
        }),
        map(preceded(keyword("press"), byte), Event::Press),
    ))(input)
}

/// Parses a whole script, skipping blank lines and comments.
pub fn parse(script: &str) -> Result<Vec<Event>, ParseError> {
    let mut events = Vec::new();
    for (i, raw) in script.lines().enumerate() {
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let (_, event) =
            all_consuming(delimited(space0, event, space0))(text).map_err(|_| ParseError {
                line: i + 1,
                text: text.to_string(),
            })?;
        events.push(event);
    }
    Ok(events)
}
