use super::*;

// Leading whitespace, optional sign, then a hex (`0x`) or decimal digit run.
const INT_PREFIX_PATTERN: &str = r"^\s*([+-]?)(?:0[xX]([0-9a-fA-F]+)|([0-9]+))";

/// Integer reader with the prefix rules of JavaScript's `parseInt(text)`.
///
/// Reading stops at the first character that cannot continue the number, so
/// `"3 adults"` reads as `3` and `"2.9"` as `2`. `None` stands for `NaN`: no
/// digits at all, or a value that does not fit in an `i64`.
#[derive(Debug, Clone)]
pub(crate) struct IntParser {
    prefix: fancy_regex::Regex,
}

impl IntParser {
    pub(crate) fn new() -> Result<Self> {
        let prefix = fancy_regex::Regex::new(INT_PREFIX_PATTERN)
            .map_err(|err| Error::Config(format!("integer prefix pattern: {err}")))?;
        Ok(Self { prefix })
    }

    pub(crate) fn parse(&self, text: &str) -> Option<i64> {
        let captures = self.prefix.captures(text).ok()??;
        let negative = captures.get(1).is_some_and(|sign| sign.as_str() == "-");
        let magnitude = if let Some(hex) = captures.get(2) {
            i64::from_str_radix(hex.as_str(), 16).ok()?
        } else {
            captures.get(3)?.as_str().parse::<i64>().ok()?
        };
        Some(if negative { -magnitude } else { magnitude })
    }
}

/// Reads an integer prefix of `text` the way JavaScript's `parseInt` does.
///
/// ```
/// use aeroreserva_ui::parse_int;
///
/// assert_eq!(parse_int("250"), Some(250));
/// assert_eq!(parse_int("  3 adults"), Some(3));
/// assert_eq!(parse_int("-2"), Some(-2));
/// assert_eq!(parse_int(""), None);
/// assert_eq!(parse_int("USD 1,200"), None);
/// ```
pub fn parse_int(text: &str) -> Option<i64> {
    IntParser::new().ok()?.parse(text)
}
