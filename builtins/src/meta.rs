use std::{borrow::Cow, fmt};

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidLexicalForm {
        type_name: &'static str,
        value: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::InvalidLexicalForm {
                type_name,
                ref value,
            } => {
                write!(f, "Value {value:?} is not a valid xs:{type_name}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Whitespace {
    Preserve,
    Replace,
    Collapse,
}

pub fn normalized_value(value: &str, whitespace: Whitespace) -> Cow<str> {
    match whitespace {
        Whitespace::Preserve => Cow::Borrowed(value),
        Whitespace::Replace => {
            if value.contains(['\t', '\n', '\r']) {
                Cow::Owned(value.replace(['\t', '\n', '\r'], " "))
            } else {
                Cow::Borrowed(value)
            }
        }
        Whitespace::Collapse => {
            let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
            if collapsed == value {
                Cow::Borrowed(value)
            } else {
                Cow::Owned(collapsed)
            }
        }
    }
}

/// Checks for the lexical spaces of the builtin datatypes (XSD pt. 2, §3.3). These only look at
/// the shape of a literal; value-space constraints beyond integer bounds are not checked.
pub(crate) mod lexical {
    use super::*;

    lazy_static! {
        static ref INTEGER: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();
        static ref DECIMAL: Regex = Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)$").unwrap();
        static ref FLOAT: Regex =
            Regex::new(r"^([+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([Ee][+-]?[0-9]+)?|[+-]?INF|NaN)$")
                .unwrap();
        static ref DURATION: Regex = Regex::new(
            r"^-?P(([0-9]+Y)?([0-9]+M)?([0-9]+D)?(T([0-9]+H)?([0-9]+M)?([0-9]+(\.[0-9]+)?S)?)?)$"
        )
        .unwrap();
        static ref DATE_TIME: Regex = Regex::new(
            r"^-?[0-9]{4,}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})?$"
        )
        .unwrap();
        static ref DATE_TIME_STAMP: Regex = Regex::new(
            r"^-?[0-9]{4,}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})$"
        )
        .unwrap();
        static ref TIME: Regex =
            Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})?$")
                .unwrap();
        static ref DATE: Regex =
            Regex::new(r"^-?[0-9]{4,}-[0-9]{2}-[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?$").unwrap();
        static ref G_YEAR_MONTH: Regex =
            Regex::new(r"^-?[0-9]{4,}-[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?$").unwrap();
        static ref G_YEAR: Regex = Regex::new(r"^-?[0-9]{4,}(Z|[+-][0-9]{2}:[0-9]{2})?$").unwrap();
        static ref G_MONTH_DAY: Regex =
            Regex::new(r"^--[0-9]{2}-[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?$").unwrap();
        static ref G_DAY: Regex = Regex::new(r"^---[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?$").unwrap();
        static ref G_MONTH: Regex = Regex::new(r"^--[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?$").unwrap();
        static ref HEX_BINARY: Regex = Regex::new(r"^([0-9a-fA-F]{2})*$").unwrap();
        static ref BASE64_BINARY: Regex =
            Regex::new(r"^(([A-Za-z0-9+/] ?){4})*(([A-Za-z0-9+/] ?){2}==|([A-Za-z0-9+/] ?){3}=)?$")
                .unwrap();
        static ref LANGUAGE: Regex = Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap();
        static ref NMTOKEN: Regex = Regex::new(r"^[\w.:-]+$").unwrap();
        static ref NAME: Regex = Regex::new(r"^[\p{L}_:][\w.:-]*$").unwrap();
        static ref NCNAME: Regex = Regex::new(r"^[\p{L}_][\w.-]*$").unwrap();
        static ref QNAME: Regex = Regex::new(r"^([\p{L}_][\w.-]*:)?[\p{L}_][\w.-]*$").unwrap();
    }

    pub(crate) fn any(_: &str) -> bool {
        true
    }

    pub(crate) fn boolean(v: &str) -> bool {
        matches!(v, "true" | "false" | "1" | "0")
    }

    pub(crate) fn integer(v: &str) -> bool {
        INTEGER.is_match(v)
    }

    fn is_zero(v: &str) -> bool {
        v.trim_start_matches(['+', '-']).bytes().all(|b| b == b'0')
    }

    pub(crate) fn non_negative_integer(v: &str) -> bool {
        integer(v) && (!v.starts_with('-') || is_zero(v))
    }

    pub(crate) fn positive_integer(v: &str) -> bool {
        integer(v) && !v.starts_with('-') && !is_zero(v)
    }

    pub(crate) fn non_positive_integer(v: &str) -> bool {
        integer(v) && (v.starts_with('-') || is_zero(v))
    }

    pub(crate) fn negative_integer(v: &str) -> bool {
        integer(v) && v.starts_with('-') && !is_zero(v)
    }

    pub(crate) fn long(v: &str) -> bool {
        v.parse::<i64>().is_ok()
    }

    pub(crate) fn int(v: &str) -> bool {
        v.parse::<i32>().is_ok()
    }

    pub(crate) fn short(v: &str) -> bool {
        v.parse::<i16>().is_ok()
    }

    pub(crate) fn byte(v: &str) -> bool {
        v.parse::<i8>().is_ok()
    }

    // `str::parse` for unsigned types rejects a leading '-', even for "-0", which is a valid
    // literal for the unsigned XSD types.
    fn unsigned<T: std::str::FromStr>(v: &str) -> bool {
        if v.starts_with('-') {
            integer(v) && is_zero(v)
        } else {
            v.parse::<T>().is_ok()
        }
    }

    pub(crate) fn unsigned_long(v: &str) -> bool {
        unsigned::<u64>(v)
    }

    pub(crate) fn unsigned_int(v: &str) -> bool {
        unsigned::<u32>(v)
    }

    pub(crate) fn unsigned_short(v: &str) -> bool {
        unsigned::<u16>(v)
    }

    pub(crate) fn unsigned_byte(v: &str) -> bool {
        unsigned::<u8>(v)
    }

    pub(crate) fn decimal(v: &str) -> bool {
        DECIMAL.is_match(v)
    }

    pub(crate) fn float(v: &str) -> bool {
        FLOAT.is_match(v)
    }

    pub(crate) fn duration(v: &str) -> bool {
        // "P" and "PT" alone are not valid durations
        DURATION.is_match(v) && !v.ends_with('P') && !v.ends_with('T')
    }

    pub(crate) fn date_time(v: &str) -> bool {
        DATE_TIME.is_match(v)
    }

    pub(crate) fn date_time_stamp(v: &str) -> bool {
        DATE_TIME_STAMP.is_match(v)
    }

    pub(crate) fn time(v: &str) -> bool {
        TIME.is_match(v)
    }

    pub(crate) fn date(v: &str) -> bool {
        DATE.is_match(v)
    }

    pub(crate) fn g_year_month(v: &str) -> bool {
        G_YEAR_MONTH.is_match(v)
    }

    pub(crate) fn g_year(v: &str) -> bool {
        G_YEAR.is_match(v)
    }

    pub(crate) fn g_month_day(v: &str) -> bool {
        G_MONTH_DAY.is_match(v)
    }

    pub(crate) fn g_day(v: &str) -> bool {
        G_DAY.is_match(v)
    }

    pub(crate) fn g_month(v: &str) -> bool {
        G_MONTH.is_match(v)
    }

    pub(crate) fn hex_binary(v: &str) -> bool {
        HEX_BINARY.is_match(v)
    }

    pub(crate) fn base64_binary(v: &str) -> bool {
        BASE64_BINARY.is_match(v)
    }

    pub(crate) fn language(v: &str) -> bool {
        LANGUAGE.is_match(v)
    }

    pub(crate) fn nmtoken(v: &str) -> bool {
        NMTOKEN.is_match(v)
    }

    pub(crate) fn nmtokens(v: &str) -> bool {
        !v.is_empty() && v.split(' ').all(nmtoken)
    }

    pub(crate) fn name(v: &str) -> bool {
        NAME.is_match(v)
    }

    pub(crate) fn ncname(v: &str) -> bool {
        NCNAME.is_match(v)
    }

    pub(crate) fn ncnames(v: &str) -> bool {
        !v.is_empty() && v.split(' ').all(ncname)
    }

    pub(crate) fn qname(v: &str) -> bool {
        QNAME.is_match(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_joins_with_single_spaces() {
        assert_eq!(
            normalized_value("  a \n\t b  c ", Whitespace::Collapse),
            "a b c"
        );
        assert!(matches!(
            normalized_value("a b", Whitespace::Collapse),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn replace_keeps_length() {
        assert_eq!(normalized_value("a\tb\n", Whitespace::Replace), "a b ");
        assert_eq!(normalized_value(" x ", Whitespace::Preserve), " x ");
    }

    #[test]
    fn integer_bounds() {
        assert!(lexical::byte("-128"));
        assert!(!lexical::byte("128"));
        assert!(lexical::unsigned_byte("-0"));
        assert!(!lexical::unsigned_int("-1"));
        assert!(lexical::positive_integer("007"));
        assert!(!lexical::positive_integer("000"));
        assert!(lexical::non_negative_integer("-0"));
        assert!(lexical::negative_integer("-3"));
    }

    #[test]
    fn temporal_shapes() {
        assert!(lexical::date("2019-02-28"));
        assert!(lexical::date_time("2019-02-28T10:00:00.123+01:00"));
        assert!(!lexical::date_time_stamp("2019-02-28T10:00:00"));
        assert!(lexical::duration("P1Y2MT3H"));
        assert!(!lexical::duration("PT"));
        assert!(lexical::g_month_day("--12-25"));
    }
}
