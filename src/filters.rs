//! Template filters for blog pages: month names, UTC timestamps, post
//! previews, and markdown rendering. Each filter is a plain function plus a
//! [`Func`] wrapper with the calling convention of the template engine, so
//! the wrappers can be handed to [`crate::registry::Registry::register_filter`].

use crate::markdown;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gtmpl_value::{Func, Value};
use serde::Deserialize;
use std::fmt;

/// The fold marker separating a post's preview from the rest of its body.
pub const PREVIEW_DELIMITER: &str = "<!-- more -->";

/// The output format of [`date_to_utc`].
pub const UTC_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// What [`preview`] returns when the text has no delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewFallback {
    /// No preview at all.
    Empty,

    /// The whole text.
    FullText,
}

impl Default for PreviewFallback {
    fn default() -> Self {
        PreviewFallback::Empty
    }
}

/// Returns the full English name of month `month` (1 = January).
pub fn month_name(month: u64) -> Result<&'static str> {
    match month {
        1..=12 => Ok(MONTH_NAMES[month as usize - 1]),
        _ => Err(Error::MonthOutOfRange(month)),
    }
}

/// Returns the three-letter abbreviation of month `month` (1 = Jan).
pub fn month_abbr(month: u64) -> Result<&'static str> {
    Ok(&month_name(month)?[..3])
}

/// Parses a timestamp and converts it to UTC. Accepts RFC 3339
/// (`2021-03-04T05:06:07+02:00`), the `2021-03-04 05:06:07 +0200` form used in
/// post frontmatter, and bare dates, which are taken as midnight UTC.
pub fn to_utc(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(input) {
        return Ok(date_time.with_timezone(&Utc));
    }
    if let Ok(date_time) = DateTime::parse_from_str(input, UTC_FORMAT) {
        return Ok(date_time.with_timezone(&Utc));
    }
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => match date.and_hms_opt(0, 0, 0) {
            Some(midnight) => Ok(Utc.from_utc_datetime(&midnight)),
            None => Err(Error::InvalidTimestamp(input.to_owned())),
        },
        Err(_) => Err(Error::InvalidTimestamp(input.to_owned())),
    }
}

/// Returns the part of `text` before the first `delimiter`. If `text`
/// doesn't contain `delimiter`, the result depends on `fallback`. An empty
/// `delimiter` never matches.
pub fn preview<'a>(
    text: &'a str,
    delimiter: &str,
    fallback: PreviewFallback,
) -> &'a str {
    match text.find(delimiter).filter(|_| !delimiter.is_empty()) {
        Some(i) => &text[..i],
        None => match fallback {
            PreviewFallback::Empty => "",
            PreviewFallback::FullText => text,
        },
    }
}

/// `date_to_month N`: the full name of month `N`.
pub fn date_to_month(args: &[Value]) -> std::result::Result<Value, String> {
    let month = month_arg("date_to_month", args)?;
    Ok(Value::String(month_name(month).map_err(to_message)?.to_owned()))
}

/// `date_to_month_abbr N`: the abbreviated name of month `N`.
pub fn date_to_month_abbr(args: &[Value]) -> std::result::Result<Value, String> {
    let month = month_arg("date_to_month_abbr", args)?;
    Ok(Value::String(month_abbr(month).map_err(to_message)?.to_owned()))
}

/// `date_to_utc TIMESTAMP`: the timestamp converted to UTC.
pub fn date_to_utc(args: &[Value]) -> std::result::Result<Value, String> {
    let input = string_arg("date_to_utc", args, 0)?;
    let utc = to_utc(input).map_err(to_message)?;
    Ok(Value::String(utc.format(UTC_FORMAT).to_string()))
}

/// `preview TEXT [DELIMITER]`: the text above the fold, or nothing if there
/// is no fold.
pub fn preview_or_empty(args: &[Value]) -> std::result::Result<Value, String> {
    preview_filter("preview", args, PreviewFallback::Empty)
}

/// `preview TEXT [DELIMITER]`: the text above the fold, or all of it if there
/// is no fold.
pub fn preview_or_full_text(args: &[Value]) -> std::result::Result<Value, String> {
    preview_filter("preview", args, PreviewFallback::FullText)
}

/// `markdownify TEXT`: the text rendered from markdown to HTML.
pub fn markdownify(args: &[Value]) -> std::result::Result<Value, String> {
    let text = string_arg("markdownify", args, 0)?;
    Ok(Value::String(markdown::to_html(text)))
}

/// Selects the `preview` filter for a fallback policy.
pub fn preview_filter_for(fallback: PreviewFallback) -> Func {
    match fallback {
        PreviewFallback::Empty => preview_or_empty,
        PreviewFallback::FullText => preview_or_full_text,
    }
}

fn preview_filter(
    filter: &'static str,
    args: &[Value],
    fallback: PreviewFallback,
) -> std::result::Result<Value, String> {
    let text = string_arg(filter, args, 0)?;
    let delimiter = match args.len() {
        1 => PREVIEW_DELIMITER,
        _ => string_arg(filter, args, 1)?,
    };
    if delimiter.is_empty() {
        return Err(to_message(Error::Argument {
            filter,
            message: String::from("delimiter must not be empty"),
        }));
    }
    Ok(Value::String(preview(text, delimiter, fallback).to_owned()))
}

fn month_arg(filter: &'static str, args: &[Value]) -> std::result::Result<u64, String> {
    let month = match args.first() {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    month.ok_or_else(|| {
        to_message(Error::Argument {
            filter,
            message: String::from("expected a month number"),
        })
    })
}

fn string_arg<'a>(
    filter: &'static str,
    args: &'a [Value],
    index: usize,
) -> std::result::Result<&'a str, String> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(to_message(Error::Argument {
            filter,
            message: format!("argument {} must be a string", index + 1),
        })),
        None => Err(to_message(Error::Argument {
            filter,
            message: format!("missing argument {}", index + 1),
        })),
    }
}

fn to_message(err: Error) -> String {
    err.to_string()
}

/// The result of a fallible filter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem applying a filter.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when a month number is outside `1..=12`.
    MonthOutOfRange(u64),

    /// Returned when a timestamp matches none of the accepted formats.
    InvalidTimestamp(String),

    /// Returned when a filter is called with missing or mistyped arguments.
    Argument {
        filter: &'static str,
        message: String,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MonthOutOfRange(month) => {
                write!(f, "month {} is not between 1 and 12", month)
            }
            Error::InvalidTimestamp(input) => {
                write!(f, "invalid timestamp: {:?}", input)
            }
            Error::Argument { filter, message } => {
                write!(f, "{}: {}", filter, message)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_month_names() -> Result<()> {
        assert_eq!("January", month_name(1)?);
        assert_eq!("December", month_name(12)?);
        assert_eq!("Sep", month_abbr(9)?);
        assert_eq!("May", month_abbr(5)?);
        Ok(())
    }

    #[test]
    fn test_month_out_of_range() {
        assert_eq!(Err(Error::MonthOutOfRange(0)), month_name(0));
        assert_eq!(Err(Error::MonthOutOfRange(13)), month_abbr(13));
    }

    #[test]
    fn test_to_utc_with_offset() -> Result<()> {
        assert_eq!(
            "2021-03-04 03:06:07 +0000",
            to_utc("2021-03-04 05:06:07 +0200")?
                .format(UTC_FORMAT)
                .to_string(),
        );
        Ok(())
    }

    #[test]
    fn test_to_utc_rfc3339_crosses_midnight() -> Result<()> {
        assert_eq!(
            "2020-12-31 23:30:00 +0000",
            to_utc("2021-01-01T01:30:00+02:00")?
                .format(UTC_FORMAT)
                .to_string(),
        );
        Ok(())
    }

    #[test]
    fn test_to_utc_bare_date() -> Result<()> {
        assert_eq!(
            "2021-03-04 00:00:00 +0000",
            to_utc("2021-03-04")?.format(UTC_FORMAT).to_string(),
        );
        Ok(())
    }

    #[test]
    fn test_to_utc_invalid() {
        assert_eq!(
            Err(Error::InvalidTimestamp(String::from("yesterday"))),
            to_utc("yesterday"),
        );
    }

    #[test]
    fn test_preview_with_delimiter() {
        let text = "intro<!-- more -->rest";
        assert_eq!("intro", preview(text, PREVIEW_DELIMITER, PreviewFallback::Empty));
        assert_eq!("intro", preview(text, PREVIEW_DELIMITER, PreviewFallback::FullText));
    }

    #[test]
    fn test_preview_without_delimiter() {
        let text = "no fold here";
        assert_eq!("", preview(text, PREVIEW_DELIMITER, PreviewFallback::Empty));
        assert_eq!(text, preview(text, PREVIEW_DELIMITER, PreviewFallback::FullText));
    }

    #[test]
    fn test_preview_uses_first_delimiter() {
        assert_eq!("a", preview("a|b|c", "|", PreviewFallback::Empty));
    }

    #[test]
    fn test_preview_filter_custom_delimiter() {
        let args = vec![
            Value::String(String::from("head::tail")),
            Value::String(String::from("::")),
        ];
        match preview_or_empty(&args) {
            Ok(Value::String(s)) => assert_eq!("head", s),
            _ => panic!("unexpected result"),
        }
    }

    #[test]
    fn test_preview_empty_delimiter() {
        let text = "intro<!-- more -->rest";
        assert_eq!("", preview(text, "", PreviewFallback::Empty));
        assert_eq!(text, preview(text, "", PreviewFallback::FullText));

        let args = vec![
            Value::String(String::from(text)),
            Value::String(String::new()),
        ];
        assert_eq!(
            Err(String::from("preview: delimiter must not be empty")),
            preview_or_full_text(&args).map(|_| ()),
        );
    }

    #[test]
    fn test_date_to_month_filter_accepts_strings() {
        match date_to_month(&[Value::String(String::from("3"))]) {
            Ok(Value::String(s)) => assert_eq!("March", s),
            _ => panic!("unexpected result"),
        }
    }

    #[test]
    fn test_filter_argument_errors() {
        assert_eq!(
            Err(String::from("markdownify: missing argument 1")),
            markdownify(&[]).map(|_| ()),
        );
        assert_eq!(
            Err(String::from("month 13 is not between 1 and 12")),
            date_to_month_abbr(&[Value::String(String::from("13"))]).map(|_| ()),
        );
    }

    #[test]
    fn test_markdownify_filter() {
        match markdownify(&[Value::String(String::from("*hi*"))]) {
            Ok(Value::String(s)) => assert_eq!("<p><em>hi</em></p>\n", s),
            _ => panic!("unexpected result"),
        }
    }
}
