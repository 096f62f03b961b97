//! Cell value types.

use std::any::Any;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{Result, RustyodsError};
use crate::xml::{format_float, push_attr};

/// The `office:value-type` of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Float,
    Boolean,
    Currency,
    Percentage,
    Date,
    Time,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Currency => "currency",
            ValueType::Percentage => "percentage",
            ValueType::Date => "date",
            ValueType::Time => "time",
        }
    }

    /// Attribute that carries the machine-readable value for this type.
    fn value_attribute(self) -> Option<&'static str> {
        match self {
            ValueType::String => None,
            ValueType::Float | ValueType::Currency | ValueType::Percentage => Some("office:value"),
            ValueType::Boolean => Some("office:boolean-value"),
            ValueType::Date => Some("office:date-value"),
            ValueType::Time => Some("office:time-value"),
        }
    }
}

/// Value stored in a cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// No value.
    #[default]
    Void,
    String(Arc<str>),
    Float(f64),
    Boolean(bool),
    /// Amount with an ISO 4217 currency code.
    Currency { value: f64, currency: String },
    /// Fraction, so 0.25 displays as 25%.
    Percentage(f64),
    Date(NaiveDateTime),
    /// A duration, written as an ISO 8601 `PnYnMnDTnHnMnS` value.
    Time(Duration),
    /// Formula text, with or without the leading `=`.
    Formula(String),
    /// Caller-defined rendering: explicit value type, raw value attribute
    /// and display text.
    Custom {
        value_type: ValueType,
        value: String,
        text: String,
    },
}

impl CellValue {
    pub fn is_void(&self) -> bool {
        matches!(self, CellValue::Void)
    }

    /// The value type declared for this value, if any.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            CellValue::Void | CellValue::Formula(_) => None,
            CellValue::String(_) => Some(ValueType::String),
            CellValue::Float(_) => Some(ValueType::Float),
            CellValue::Boolean(_) => Some(ValueType::Boolean),
            CellValue::Currency { .. } => Some(ValueType::Currency),
            CellValue::Percentage(_) => Some(ValueType::Percentage),
            CellValue::Date(_) => Some(ValueType::Date),
            CellValue::Time(_) => Some(ValueType::Time),
            CellValue::Custom { value_type, .. } => Some(*value_type),
        }
    }

    /// Convert a dynamically typed value.
    ///
    /// Accepts `String`, `&'static str`, `Arc<str>`, `f64`, `f32`, `i32`,
    /// `i64`, `u32`, `bool`, `NaiveDate`, `NaiveDateTime`, `Duration` and
    /// `CellValue` itself; anything else is rejected rather than guessed.
    pub fn from_any(value: &dyn Any) -> Result<CellValue> {
        if let Some(v) = value.downcast_ref::<CellValue>() {
            return Ok(v.clone());
        }
        if let Some(v) = value.downcast_ref::<String>() {
            return Ok(CellValue::from(v.as_str()));
        }
        if let Some(v) = value.downcast_ref::<&'static str>() {
            return Ok(CellValue::from(*v));
        }
        if let Some(v) = value.downcast_ref::<Arc<str>>() {
            return Ok(CellValue::String(v.clone()));
        }
        if let Some(v) = value.downcast_ref::<f64>() {
            return Ok(CellValue::Float(*v));
        }
        if let Some(v) = value.downcast_ref::<f32>() {
            return Ok(CellValue::Float(*v as f64));
        }
        if let Some(v) = value.downcast_ref::<i32>() {
            return Ok(CellValue::from(*v));
        }
        if let Some(v) = value.downcast_ref::<i64>() {
            return Ok(CellValue::from(*v));
        }
        if let Some(v) = value.downcast_ref::<u32>() {
            return Ok(CellValue::from(*v));
        }
        if let Some(v) = value.downcast_ref::<bool>() {
            return Ok(CellValue::Boolean(*v));
        }
        if let Some(v) = value.downcast_ref::<NaiveDate>() {
            return Ok(CellValue::from(*v));
        }
        if let Some(v) = value.downcast_ref::<NaiveDateTime>() {
            return Ok(CellValue::Date(*v));
        }
        if let Some(v) = value.downcast_ref::<Duration>() {
            return Ok(CellValue::Time(*v));
        }
        Err(RustyodsError::custom("unsupported value type for a cell"))
    }

    /// Text shown in the cell's paragraph.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Void | CellValue::Formula(_) => String::new(),
            CellValue::String(s) => s.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Currency { value, currency } => format!("{} {}", format_float(*value), currency),
            CellValue::Percentage(p) => format!("{}%", format_float(p * 100.0)),
            CellValue::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Time(t) => format_duration(*t),
            CellValue::Custom { text, .. } => text.clone(),
        }
    }

    /// Append the value attributes (`office:value-type` and friends).
    pub(crate) fn push_attributes(&self, out: &mut String) {
        match self {
            CellValue::Void => {}
            CellValue::Formula(formula) => {
                push_attr(out, "table:formula", &formula_attribute(formula));
            }
            CellValue::Custom { value_type, value, .. } => {
                push_attr(out, "office:value-type", value_type.as_str());
                if let Some(attr) = value_type.value_attribute() {
                    push_attr(out, attr, value);
                }
            }
            CellValue::String(_) => push_attr(out, "office:value-type", "string"),
            CellValue::Float(f) => {
                push_attr(out, "office:value-type", "float");
                push_attr(out, "office:value", &format_float(*f));
            }
            CellValue::Boolean(b) => {
                push_attr(out, "office:value-type", "boolean");
                push_attr(out, "office:boolean-value", if *b { "true" } else { "false" });
            }
            CellValue::Currency { value, currency } => {
                push_attr(out, "office:value-type", "currency");
                push_attr(out, "office:currency", currency);
                push_attr(out, "office:value", &format_float(*value));
            }
            CellValue::Percentage(p) => {
                push_attr(out, "office:value-type", "percentage");
                push_attr(out, "office:value", &format_float(*p));
            }
            CellValue::Date(d) => {
                push_attr(out, "office:value-type", "date");
                push_attr(out, "office:date-value", &d.format("%Y-%m-%dT%H:%M:%S").to_string());
            }
            CellValue::Time(t) => {
                push_attr(out, "office:value-type", "time");
                push_attr(out, "office:time-value", &format_duration(*t));
            }
        }
    }
}

/// `of:=SUM(A1:A2)` from either `=SUM(A1:A2)` or `SUM(A1:A2)`.
fn formula_attribute(formula: &str) -> String {
    if formula.starts_with("of:") {
        formula.to_string()
    } else if let Some(body) = formula.strip_prefix('=') {
        format!("of:={}", body)
    } else {
        format!("of:={}", formula)
    }
}

/// ISO 8601 duration, e.g. `PT1H30M0S` or `PT0H0M1.5S`.
pub fn format_duration(duration: Duration) -> String {
    let negative = duration < Duration::zero();
    let millis = duration.num_milliseconds().unsigned_abs();
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis / 1_000) % 60;
    let fraction = millis % 1_000;

    let mut out = String::with_capacity(16);
    if negative {
        out.push('-');
    }
    out.push_str("PT");
    out.push_str(itoa::Buffer::new().format(hours));
    out.push('H');
    out.push_str(itoa::Buffer::new().format(minutes));
    out.push('M');
    out.push_str(itoa::Buffer::new().format(seconds));
    if fraction > 0 {
        let frac = format!("{:03}", fraction);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('S');
    out
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Arc::from(s))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Arc::from(s))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Float(i as f64)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Float(i as f64)
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Float(i as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl From<Duration> for CellValue {
    fn from(t: Duration) -> Self {
        CellValue::Time(t)
    }
}
