//! Page layouts and master pages.

use super::{Length, OdsStyle, StyleFamily, Visibility};
use crate::xml::{push_attr, push_text_element};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Paper size, margins and orientation.
///
/// Page layouts are always automatic styles of `styles.xml`.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    name: String,
    pub width: Length,
    pub height: Length,
    /// Top, right, bottom, left.
    pub margins: [Length; 4],
    pub orientation: Orientation,
}

impl PageLayout {
    /// A4 portrait with 1.5cm margins.
    pub fn a4<S: Into<String>>(name: S) -> Self {
        PageLayout {
            name: name.into(),
            width: Length::Cm(21.0),
            height: Length::Cm(29.7),
            margins: [Length::Cm(1.5); 4],
            orientation: Orientation::Portrait,
        }
    }

    pub fn with_size(mut self, width: Length, height: Length) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_margins(mut self, margin: Length) -> Self {
        self.margins = [margin; 4];
        self
    }

    /// Switch orientation, swapping width and height.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        if orientation != self.orientation {
            std::mem::swap(&mut self.width, &mut self.height);
            self.orientation = orientation;
        }
        self
    }
}

impl OdsStyle for PageLayout {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::PageLayout
    }

    fn visibility(&self) -> Visibility {
        Visibility::Automatic
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:page-layout");
        push_attr(out, "style:name", &self.name);
        out.push_str("><style:page-layout-properties");
        push_attr(out, "fo:page-width", &self.width.to_string());
        push_attr(out, "fo:page-height", &self.height.to_string());
        let sides = ["fo:margin-top", "fo:margin-right", "fo:margin-bottom", "fo:margin-left"];
        for (attr, margin) in sides.iter().zip(self.margins.iter()) {
            push_attr(out, attr, &margin.to_string());
        }
        push_attr(
            out,
            "style:print-orientation",
            match self.orientation {
                Orientation::Portrait => "portrait",
                Orientation::Landscape => "landscape",
            },
        );
        out.push_str(" style:writing-mode=\"lr-tb\"/></style:page-layout>");
    }
}

/// Master page: a page layout plus optional header and footer text.
#[derive(Clone, Debug, PartialEq)]
pub struct MasterPage {
    name: String,
    pub page_layout: String,
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl MasterPage {
    pub fn new<S: Into<String>, L: Into<String>>(name: S, page_layout: L) -> Self {
        MasterPage {
            name: name.into(),
            page_layout: page_layout.into(),
            header: None,
            footer: None,
        }
    }

    pub fn with_header<S: Into<String>>(mut self, text: S) -> Self {
        self.header = Some(text.into());
        self
    }

    pub fn with_footer<S: Into<String>>(mut self, text: S) -> Self {
        self.footer = Some(text.into());
        self
    }
}

impl OdsStyle for MasterPage {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::MasterPage
    }

    fn visibility(&self) -> Visibility {
        Visibility::Common
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:master-page");
        push_attr(out, "style:name", &self.name);
        push_attr(out, "style:page-layout-name", &self.page_layout);
        out.push('>');
        if let Some(header) = &self.header {
            out.push_str("<style:header>");
            push_text_element(out, "text:p", header);
            out.push_str("</style:header>");
        }
        if let Some(footer) = &self.footer {
            out.push_str("<style:footer>");
            push_text_element(out, "text:p", footer);
            out.push_str("</style:footer>");
        }
        out.push_str("</style:master-page>");
    }
}
