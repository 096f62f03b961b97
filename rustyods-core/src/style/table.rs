//! Table, row and column styles.

use super::{Length, OdsStyle, StyleFamily, Visibility};
use crate::xml::push_attr;

/// Style of a whole table: its master page and whether it is displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStyle {
    name: String,
    visibility: Visibility,
    pub master_page: String,
    pub display: bool,
}

impl TableStyle {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TableStyle {
            name: name.into(),
            visibility: Visibility::Automatic,
            master_page: "Default".to_string(),
            display: true,
        }
    }

    pub fn with_master_page<S: Into<String>>(mut self, master_page: S) -> Self {
        self.master_page = master_page.into();
        self
    }

    /// Hide the table from the user.
    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl OdsStyle for TableStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::Table
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:style");
        push_attr(out, "style:name", &self.name);
        out.push_str(" style:family=\"table\"");
        push_attr(out, "style:master-page-name", &self.master_page);
        out.push_str("><style:table-properties");
        push_attr(out, "table:display", if self.display { "true" } else { "false" });
        out.push_str(" style:writing-mode=\"lr-tb\"/></style:style>");
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRowStyle {
    name: String,
    visibility: Visibility,
    pub height: Option<Length>,
    /// Let the consumer grow the row to fit its content.
    pub optimal_height: bool,
}

impl TableRowStyle {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TableRowStyle {
            name: name.into(),
            visibility: Visibility::Automatic,
            height: None,
            optimal_height: true,
        }
    }

    /// Fixed row height; disables optimal height.
    pub fn with_height(mut self, height: Length) -> Self {
        self.height = Some(height);
        self.optimal_height = false;
        self
    }

    pub fn with_optimal_height(mut self, optimal: bool) -> Self {
        self.optimal_height = optimal;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl OdsStyle for TableRowStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::TableRow
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:style");
        push_attr(out, "style:name", &self.name);
        out.push_str(" style:family=\"table-row\"><style:table-row-properties");
        if let Some(height) = self.height {
            push_attr(out, "style:row-height", &height.to_string());
        }
        push_attr(
            out,
            "style:use-optimal-row-height",
            if self.optimal_height { "true" } else { "false" },
        );
        out.push_str(" fo:break-before=\"auto\"/></style:style>");
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableColumnStyle {
    name: String,
    visibility: Visibility,
    pub width: Length,
    pub optimal_width: bool,
}

impl TableColumnStyle {
    pub fn new<S: Into<String>>(name: S, width: Length) -> Self {
        TableColumnStyle {
            name: name.into(),
            visibility: Visibility::Automatic,
            width,
            optimal_width: false,
        }
    }

    pub fn with_optimal_width(mut self, optimal: bool) -> Self {
        self.optimal_width = optimal;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl OdsStyle for TableColumnStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::TableColumn
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:style");
        push_attr(out, "style:name", &self.name);
        out.push_str(" style:family=\"table-column\"><style:table-column-properties fo:break-before=\"auto\"");
        push_attr(out, "style:column-width", &self.width.to_string());
        if self.optimal_width {
            out.push_str(" style:use-optimal-column-width=\"true\"");
        }
        out.push_str("/></style:style>");
    }
}
