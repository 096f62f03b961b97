//! Style objects and the style container.
//!
//! Every style family implements [`OdsStyle`], which gives the container
//! enough to route a declaration to the right document section: its name,
//! its family and whether it is a common (user-visible, `styles.xml`) or an
//! automatic (`content.xml`) style. The XML body of each declaration is
//! produced by the style itself.

use std::fmt;

mod cell;
mod container;
mod data;
pub mod defaults;
mod page;
mod table;

pub use cell::{Alignment, Border, BorderStyle, Font, HorizontalAlign, Protection, TableCellStyle, TextStyle, VerticalAlign};
pub use container::{ChildCellStyle, EntryMode, Registry, StyleContainer, CHILD_STYLE_SEPARATOR};
pub use data::{DataFormat, DataStyle, DateToken};
pub use page::{MasterPage, Orientation, PageLayout};
pub use table::{TableColumnStyle, TableRowStyle, TableStyle};

use crate::error::{Result, RustyodsError};
use crate::xml::format_float;

/// Which dictionary a style is declared in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Named, user-visible style (`office:styles`).
    Common,
    /// Inline property set (`office:automatic-styles`).
    Automatic,
}

/// Style family, mirroring `style:family` plus the page and data dictionaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleFamily {
    TableCell,
    TableRow,
    TableColumn,
    Table,
    Text,
    Data,
    PageLayout,
    MasterPage,
}

impl StyleFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleFamily::TableCell => "table-cell",
            StyleFamily::TableRow => "table-row",
            StyleFamily::TableColumn => "table-column",
            StyleFamily::Table => "table",
            StyleFamily::Text => "text",
            StyleFamily::Data => "data-style",
            StyleFamily::PageLayout => "page-layout",
            StyleFamily::MasterPage => "master-page",
        }
    }
}

impl fmt::Display for StyleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour shared by every style family.
pub trait OdsStyle {
    fn name(&self) -> &str;
    fn family(&self) -> StyleFamily;
    fn visibility(&self) -> Visibility;
    /// Append the full declaration element.
    fn write_xml(&self, out: &mut String);
}

/// Any style the container can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleObject {
    Cell(TableCellStyle),
    Row(TableRowStyle),
    Column(TableColumnStyle),
    Table(TableStyle),
    Text(TextStyle),
    Data(DataStyle),
    PageLayout(PageLayout),
    MasterPage(MasterPage),
}

impl StyleObject {
    fn inner(&self) -> &dyn OdsStyle {
        match self {
            StyleObject::Cell(s) => s,
            StyleObject::Row(s) => s,
            StyleObject::Column(s) => s,
            StyleObject::Table(s) => s,
            StyleObject::Text(s) => s,
            StyleObject::Data(s) => s,
            StyleObject::PageLayout(s) => s,
            StyleObject::MasterPage(s) => s,
        }
    }
}

impl OdsStyle for StyleObject {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn family(&self) -> StyleFamily {
        self.inner().family()
    }

    fn visibility(&self) -> Visibility {
        self.inner().visibility()
    }

    fn write_xml(&self, out: &mut String) {
        self.inner().write_xml(out)
    }
}

macro_rules! impl_from_style {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StyleObject {
                fn from(style: $ty) -> Self {
                    StyleObject::$variant(style)
                }
            }
        )*
    };
}

impl_from_style! {
    Cell => TableCellStyle,
    Row => TableRowStyle,
    Column => TableColumnStyle,
    Table => TableStyle,
    Text => TextStyle,
    Data => DataStyle,
    PageLayout => PageLayout,
    MasterPage => MasterPage,
}

/// Check that `name` can be used as a `style:name`.
pub fn validate_style_name(name: &str) -> Result<()> {
    let invalid = |reason| RustyodsError::InvalidStyleName {
        name: name.to_string(),
        reason,
    };
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if !(c.is_alphabetic() || c == '_') => {
            return Err(invalid("name must start with a letter or '_'"))
        }
        _ => {}
    }
    if chars.any(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))) {
        return Err(invalid("only letters, digits, '_', '-' and '.' are allowed"));
    }
    Ok(())
}

/// A length with its unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Cm(f64),
    Mm(f64),
    In(f64),
    Pt(f64),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = match *self {
            Length::Cm(v) => (v, "cm"),
            Length::Mm(v) => (v, "mm"),
            Length::In(v) => (v, "in"),
            Length::Pt(v) => (v, "pt"),
        };
        write!(f, "{}{}", format_float(value), unit)
    }
}
