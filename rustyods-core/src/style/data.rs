//! Data styles: how a cell value is rendered as text (`number:*-style`).

use super::{OdsStyle, StyleFamily, Visibility};
use crate::xml::{push_attr, push_int_attr, push_text_element};

/// One element of a date or time pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum DateToken {
    Year,
    ShortYear,
    Month,
    MonthName,
    Day,
    DayOfWeek,
    Hours,
    Minutes,
    Seconds,
    AmPm,
    Text(String),
}

impl DateToken {
    fn write_xml(&self, out: &mut String) {
        match self {
            DateToken::Year => out.push_str("<number:year number:style=\"long\"/>"),
            DateToken::ShortYear => out.push_str("<number:year/>"),
            DateToken::Month => out.push_str("<number:month number:style=\"long\"/>"),
            DateToken::MonthName => {
                out.push_str("<number:month number:style=\"long\" number:textual=\"true\"/>")
            }
            DateToken::Day => out.push_str("<number:day number:style=\"long\"/>"),
            DateToken::DayOfWeek => out.push_str("<number:day-of-week number:style=\"long\"/>"),
            DateToken::Hours => out.push_str("<number:hours number:style=\"long\"/>"),
            DateToken::Minutes => out.push_str("<number:minutes number:style=\"long\"/>"),
            DateToken::Seconds => out.push_str("<number:seconds number:style=\"long\"/>"),
            DateToken::AmPm => out.push_str("<number:am-pm/>"),
            DateToken::Text(text) => push_text_element(out, "number:text", text),
        }
    }
}

/// What a data style formats and how.
#[derive(Clone, Debug, PartialEq)]
pub enum DataFormat {
    Float {
        decimals: u8,
        min_integer_digits: u8,
        grouping: bool,
    },
    Percentage {
        decimals: u8,
        min_integer_digits: u8,
    },
    Currency {
        decimals: u8,
        grouping: bool,
        symbol: String,
        /// Symbol before the amount ("$1.00") or after it ("1,00 €").
        symbol_first: bool,
    },
    Date(Vec<DateToken>),
    /// Time of day or duration; hours do not wrap at 24.
    Time(Vec<DateToken>),
    Boolean,
    Text,
}

/// A named data style.
///
/// Data styles are automatic unless made common explicitly, so they land in
/// the same file as the cell styles that reference them.
#[derive(Clone, Debug, PartialEq)]
pub struct DataStyle {
    name: String,
    visibility: Visibility,
    pub format: DataFormat,
    /// Language and country, e.g. ("en", "US").
    pub locale: Option<(String, String)>,
    /// Keep the declaration even when nothing references it.
    pub volatile: bool,
}

impl DataStyle {
    pub fn new<S: Into<String>>(name: S, format: DataFormat) -> Self {
        DataStyle {
            name: name.into(),
            visibility: Visibility::Automatic,
            format,
            locale: None,
            volatile: false,
        }
    }

    pub fn float<S: Into<String>>(name: S, decimals: u8) -> Self {
        Self::new(
            name,
            DataFormat::Float {
                decimals,
                min_integer_digits: 1,
                grouping: false,
            },
        )
    }

    pub fn percentage<S: Into<String>>(name: S, decimals: u8) -> Self {
        Self::new(
            name,
            DataFormat::Percentage {
                decimals,
                min_integer_digits: 1,
            },
        )
    }

    pub fn currency<S: Into<String>, C: Into<String>>(name: S, decimals: u8, symbol: C) -> Self {
        Self::new(
            name,
            DataFormat::Currency {
                decimals,
                grouping: true,
                symbol: symbol.into(),
                symbol_first: true,
            },
        )
    }

    pub fn date<S: Into<String>>(name: S, tokens: Vec<DateToken>) -> Self {
        Self::new(name, DataFormat::Date(tokens))
    }

    /// `YYYY-MM-DD`.
    pub fn iso_date<S: Into<String>>(name: S) -> Self {
        Self::date(
            name,
            vec![
                DateToken::Year,
                DateToken::Text("-".into()),
                DateToken::Month,
                DateToken::Text("-".into()),
                DateToken::Day,
            ],
        )
    }

    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn iso_datetime<S: Into<String>>(name: S) -> Self {
        Self::date(
            name,
            vec![
                DateToken::Year,
                DateToken::Text("-".into()),
                DateToken::Month,
                DateToken::Text("-".into()),
                DateToken::Day,
                DateToken::Text(" ".into()),
                DateToken::Hours,
                DateToken::Text(":".into()),
                DateToken::Minutes,
                DateToken::Text(":".into()),
                DateToken::Seconds,
            ],
        )
    }

    pub fn time<S: Into<String>>(name: S, tokens: Vec<DateToken>) -> Self {
        Self::new(name, DataFormat::Time(tokens))
    }

    /// `HH:MM:SS`.
    pub fn hms<S: Into<String>>(name: S) -> Self {
        Self::time(
            name,
            vec![
                DateToken::Hours,
                DateToken::Text(":".into()),
                DateToken::Minutes,
                DateToken::Text(":".into()),
                DateToken::Seconds,
            ],
        )
    }

    pub fn boolean<S: Into<String>>(name: S) -> Self {
        Self::new(name, DataFormat::Boolean)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_locale<L: Into<String>, C: Into<String>>(mut self, language: L, country: C) -> Self {
        self.locale = Some((language.into(), country.into()));
        self
    }

    pub fn with_volatile(mut self, volatile: bool) -> Self {
        self.volatile = volatile;
        self
    }

    /// Enable thousands separators on float and currency formats.
    pub fn with_grouping(mut self, enabled: bool) -> Self {
        match &mut self.format {
            DataFormat::Float { grouping, .. } | DataFormat::Currency { grouping, .. } => {
                *grouping = enabled
            }
            _ => {}
        }
        self
    }

    pub fn with_min_integer_digits(mut self, digits: u8) -> Self {
        match &mut self.format {
            DataFormat::Float { min_integer_digits, .. }
            | DataFormat::Percentage { min_integer_digits, .. } => *min_integer_digits = digits,
            _ => {}
        }
        self
    }

    fn element(&self) -> &'static str {
        match self.format {
            DataFormat::Float { .. } => "number:number-style",
            DataFormat::Percentage { .. } => "number:percentage-style",
            DataFormat::Currency { .. } => "number:currency-style",
            DataFormat::Date(_) => "number:date-style",
            DataFormat::Time(_) => "number:time-style",
            DataFormat::Boolean => "number:boolean-style",
            DataFormat::Text => "number:text-style",
        }
    }
}

fn write_number(out: &mut String, decimals: u8, min_integer_digits: u8, grouping: bool) {
    out.push_str("<number:number");
    push_int_attr(out, "number:decimal-places", u64::from(decimals));
    push_int_attr(out, "number:min-decimal-places", u64::from(decimals));
    push_int_attr(out, "number:min-integer-digits", u64::from(min_integer_digits));
    if grouping {
        out.push_str(" number:grouping=\"true\"");
    }
    out.push_str("/>");
}

impl OdsStyle for DataStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::Data
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn write_xml(&self, out: &mut String) {
        let element = self.element();
        out.push('<');
        out.push_str(element);
        push_attr(out, "style:name", &self.name);
        if let Some((language, country)) = &self.locale {
            push_attr(out, "number:language", language);
            push_attr(out, "number:country", country);
        }
        if self.volatile {
            out.push_str(" number:volatile=\"true\"");
        }
        if matches!(self.format, DataFormat::Time(_)) {
            out.push_str(" number:truncate-on-overflow=\"false\"");
        }
        out.push('>');

        match &self.format {
            DataFormat::Float {
                decimals,
                min_integer_digits,
                grouping,
            } => write_number(out, *decimals, *min_integer_digits, *grouping),
            DataFormat::Percentage {
                decimals,
                min_integer_digits,
            } => {
                write_number(out, *decimals, *min_integer_digits, false);
                push_text_element(out, "number:text", "%");
            }
            DataFormat::Currency {
                decimals,
                grouping,
                symbol,
                symbol_first,
            } => {
                if *symbol_first {
                    push_text_element(out, "number:currency-symbol", symbol);
                    write_number(out, *decimals, 1, *grouping);
                } else {
                    write_number(out, *decimals, 1, *grouping);
                    push_text_element(out, "number:text", " ");
                    push_text_element(out, "number:currency-symbol", symbol);
                }
            }
            DataFormat::Date(tokens) | DataFormat::Time(tokens) => {
                for token in tokens {
                    token.write_xml(out);
                }
            }
            DataFormat::Boolean => out.push_str("<number:boolean/>"),
            DataFormat::Text => out.push_str("<number:text-content/>"),
        }

        out.push_str("</");
        out.push_str(element);
        out.push('>');
    }
}
