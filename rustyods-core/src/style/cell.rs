//! Cell and text styles: Font, Border, Alignment, Protection, TableCellStyle.

use super::{Length, OdsStyle, StyleFamily, Visibility};
use crate::xml::{format_float, push_attr};

/// Font properties, written as `style:text-properties`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Font {
    /// Font family name (e.g., "Liberation Sans").
    pub name: Option<String>,
    /// Font size in points.
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    /// Font color as RGB hex (e.g., "#FF0000").
    pub color: Option<String>,
    /// "super" or "sub".
    pub vert_align: Option<String>,
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the font size in points.
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_strike(mut self, strike: bool) -> Self {
        self.strike = strike;
        self
    }

    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set superscript ("super") or subscript ("sub").
    pub fn with_vert_align<S: Into<String>>(mut self, vert_align: S) -> Self {
        self.vert_align = Some(vert_align.into());
        self
    }

    pub(crate) fn write_properties(&self, out: &mut String) {
        out.push_str("<style:text-properties");
        if let Some(name) = &self.name {
            push_attr(out, "fo:font-family", name);
        }
        if let Some(size) = self.size {
            push_attr(out, "fo:font-size", &Length::Pt(size).to_string());
        }
        if self.bold {
            out.push_str(" fo:font-weight=\"bold\"");
        }
        if self.italic {
            out.push_str(" fo:font-style=\"italic\"");
        }
        if self.underline {
            out.push_str(
                " style:text-underline-style=\"solid\" style:text-underline-width=\"auto\" style:text-underline-color=\"font-color\"",
            );
        }
        if self.strike {
            out.push_str(" style:text-line-through-style=\"solid\"");
        }
        if let Some(color) = &self.color {
            push_attr(out, "fo:color", color);
        }
        match self.vert_align.as_deref() {
            Some("super") | Some("superscript") => out.push_str(" style:text-position=\"super 58%\""),
            Some("sub") | Some("subscript") => out.push_str(" style:text-position=\"sub 58%\""),
            _ => {}
        }
        out.push_str("/>");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAlign {
    Start,
    Center,
    End,
    Justify,
}

impl HorizontalAlign {
    fn as_str(self) -> &'static str {
        match self {
            HorizontalAlign::Start => "start",
            HorizontalAlign::Center => "center",
            HorizontalAlign::End => "end",
            HorizontalAlign::Justify => "justify",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    fn as_str(self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Middle => "middle",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

/// Text alignment properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    /// Wrap text within cell.
    pub wrap_text: bool,
    /// Text rotation angle in degrees.
    pub text_rotation: Option<i32>,
    /// Shrink text to fit cell.
    pub shrink_to_fit: bool,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizontal(mut self, align: HorizontalAlign) -> Self {
        self.horizontal = Some(align);
        self
    }

    pub fn with_vertical(mut self, align: VerticalAlign) -> Self {
        self.vertical = Some(align);
        self
    }

    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.text_rotation = Some(degrees);
        self
    }

    pub fn with_shrink_to_fit(mut self, shrink: bool) -> Self {
        self.shrink_to_fit = shrink;
        self
    }
}

/// Border style for a single edge.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderStyle {
    pub width: Length,
    /// Line style: solid, dashed, dotted, double.
    pub line: String,
    /// Border color as RGB hex.
    pub color: String,
}

impl BorderStyle {
    pub fn new<S: Into<String>>(width: Length, line: S) -> Self {
        BorderStyle {
            width,
            line: line.into(),
            color: "#000000".to_string(),
        }
    }

    pub fn thin() -> Self {
        Self::new(Length::Pt(0.75), "solid")
    }

    pub fn medium() -> Self {
        Self::new(Length::Pt(1.75), "solid")
    }

    pub fn thick() -> Self {
        Self::new(Length::Pt(2.5), "solid")
    }

    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = color.into();
        self
    }

    /// Value of an `fo:border*` attribute, e.g. `0.75pt solid #000000`.
    fn attribute_value(&self) -> String {
        format!("{} {} {}", self.width, self.line, self.color)
    }
}

/// Cell border properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Border {
    pub left: Option<BorderStyle>,
    pub right: Option<BorderStyle>,
    pub top: Option<BorderStyle>,
    pub bottom: Option<BorderStyle>,
    /// Top-left to bottom-right diagonal.
    pub diagonal: Option<BorderStyle>,
}

impl Border {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a border with all edges the same style.
    pub fn all(style: BorderStyle) -> Self {
        Border {
            left: Some(style.clone()),
            right: Some(style.clone()),
            top: Some(style.clone()),
            bottom: Some(style),
            diagonal: None,
        }
    }

    pub fn with_left(mut self, style: BorderStyle) -> Self {
        self.left = Some(style);
        self
    }

    pub fn with_right(mut self, style: BorderStyle) -> Self {
        self.right = Some(style);
        self
    }

    pub fn with_top(mut self, style: BorderStyle) -> Self {
        self.top = Some(style);
        self
    }

    pub fn with_bottom(mut self, style: BorderStyle) -> Self {
        self.bottom = Some(style);
        self
    }

    pub fn with_diagonal(mut self, style: BorderStyle) -> Self {
        self.diagonal = Some(style);
        self
    }

    fn write_attributes(&self, out: &mut String) {
        let uniform = self.left.is_some()
            && self.left == self.right
            && self.left == self.top
            && self.left == self.bottom;
        if uniform {
            if let Some(edge) = &self.left {
                push_attr(out, "fo:border", &edge.attribute_value());
            }
        } else {
            let edges = [
                ("fo:border-left", &self.left),
                ("fo:border-right", &self.right),
                ("fo:border-top", &self.top),
                ("fo:border-bottom", &self.bottom),
            ];
            for (attr, edge) in edges {
                if let Some(edge) = edge {
                    push_attr(out, attr, &edge.attribute_value());
                }
            }
        }
        if let Some(edge) = &self.diagonal {
            push_attr(out, "style:diagonal-tl-br", &edge.attribute_value());
        }
    }
}

/// Cell protection, effective when the table is protected.
#[derive(Clone, Debug, PartialEq)]
pub struct Protection {
    pub locked: bool,
    /// Hide formulas when the table is protected.
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Protection {
            locked: true,
            hidden: false,
        }
    }
}

impl Protection {
    /// Locked, formula visible.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlocked() -> Self {
        Protection {
            locked: false,
            hidden: false,
        }
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    fn attribute_value(&self) -> &'static str {
        match (self.locked, self.hidden) {
            (false, false) => "none",
            (true, false) => "protected",
            (false, true) => "formula-hidden",
            (true, true) => "protected formula-hidden",
        }
    }
}

/// Style of a table cell (`style:family="table-cell"`).
///
/// Cell styles are common by default. The data style of a cell is not part
/// of its visual style: combining the two is done by the style container,
/// which synthesizes an automatic child style per (style, data style) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct TableCellStyle {
    name: String,
    visibility: Visibility,
    parent: Option<String>,
    pub(crate) data_style: Option<String>,
    pub font: Option<Font>,
    pub alignment: Option<Alignment>,
    pub border: Option<Border>,
    /// Background color as RGB hex.
    pub background_color: Option<String>,
    pub protection: Option<Protection>,
}

impl TableCellStyle {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TableCellStyle {
            name: name.into(),
            visibility: Visibility::Common,
            parent: None,
            data_style: None,
            font: None,
            alignment: None,
            border: None,
            background_color: None,
            protection: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Inherit unset properties from a common cell style.
    pub fn with_parent<S: Into<String>>(mut self, parent: S) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_background_color<S: Into<String>>(mut self, color: S) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = Some(protection);
        self
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Name of the data style bound to this style, set on synthesized
    /// child styles only.
    pub fn data_style(&self) -> Option<&str> {
        self.data_style.as_deref()
    }

    /// Copy of this style's visual properties under another name.
    pub(crate) fn derive(&self, name: String, visibility: Visibility, parent: Option<String>) -> Self {
        TableCellStyle {
            name,
            visibility,
            parent,
            ..self.clone()
        }
    }

    fn has_cell_properties(&self) -> bool {
        self.background_color.is_some()
            || self.border.is_some()
            || self.protection.is_some()
            || self.alignment.as_ref().is_some_and(|a| {
                a.vertical.is_some() || a.wrap_text || a.text_rotation.is_some() || a.shrink_to_fit
            })
    }
}

impl OdsStyle for TableCellStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::TableCell
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:style");
        push_attr(out, "style:name", &self.name);
        out.push_str(" style:family=\"table-cell\"");
        if let Some(parent) = &self.parent {
            push_attr(out, "style:parent-style-name", parent);
        }
        if let Some(data_style) = &self.data_style {
            push_attr(out, "style:data-style-name", data_style);
        }
        out.push('>');

        if self.has_cell_properties() {
            out.push_str("<style:table-cell-properties");
            if let Some(color) = &self.background_color {
                push_attr(out, "fo:background-color", color);
            }
            if let Some(border) = &self.border {
                border.write_attributes(out);
            }
            if let Some(alignment) = &self.alignment {
                if let Some(v) = alignment.vertical {
                    push_attr(out, "style:vertical-align", v.as_str());
                }
                if alignment.wrap_text {
                    out.push_str(" fo:wrap-option=\"wrap\"");
                }
                if let Some(angle) = alignment.text_rotation {
                    push_attr(out, "style:rotation-angle", &format_float(f64::from(angle)));
                }
                if alignment.shrink_to_fit {
                    out.push_str(" style:shrink-to-fit=\"true\"");
                }
            }
            if let Some(protection) = &self.protection {
                push_attr(out, "style:cell-protect", protection.attribute_value());
            }
            out.push_str("/>");
        }

        if let Some(h) = self.alignment.as_ref().and_then(|a| a.horizontal) {
            out.push_str("<style:paragraph-properties");
            push_attr(out, "fo:text-align", h.as_str());
            out.push_str("/>");
        }

        if let Some(font) = &self.font {
            font.write_properties(out);
        }
        out.push_str("</style:style>");
    }
}

/// Character style for spans inside cell text (`style:family="text"`).
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    name: String,
    visibility: Visibility,
    pub font: Font,
}

impl TextStyle {
    pub fn new<S: Into<String>>(name: S, font: Font) -> Self {
        TextStyle {
            name: name.into(),
            visibility: Visibility::Automatic,
            font,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl OdsStyle for TextStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> StyleFamily {
        StyleFamily::Text
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<style:style");
        push_attr(out, "style:name", &self.name);
        out.push_str(" style:family=\"text\">");
        self.font.write_properties(out);
        out.push_str("</style:style>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_of(style: &dyn OdsStyle) -> String {
        let mut out = String::new();
        style.write_xml(&mut out);
        out
    }

    #[test]
    fn test_font_builder() {
        let font = Font::new()
            .with_name("Arial")
            .with_size(12.0)
            .with_bold(true)
            .with_color("#FF0000");

        assert_eq!(font.name, Some("Arial".to_string()));
        assert_eq!(font.size, Some(12.0));
        assert!(font.bold);
        assert_eq!(font.color, Some("#FF0000".to_string()));
    }

    #[test]
    fn test_border_all_collapses_to_single_attribute() {
        let style = TableCellStyle::new("boxed").with_border(Border::all(BorderStyle::thin()));
        let xml = xml_of(&style);
        assert!(xml.contains("fo:border=\"0.75pt solid #000000\""));
        assert!(!xml.contains("fo:border-left"));
    }

    #[test]
    fn test_border_edges() {
        let border = Border::new()
            .with_bottom(BorderStyle::thick().with_color("#FF0000"))
            .with_diagonal(BorderStyle::thin());
        let xml = xml_of(&TableCellStyle::new("under").with_border(border));
        assert!(xml.contains("fo:border-bottom=\"2.5pt solid #FF0000\""));
        assert!(xml.contains("style:diagonal-tl-br=\"0.75pt solid #000000\""));
        assert!(!xml.contains("fo:border-top"));
    }

    #[test]
    fn test_cell_style_xml() {
        let style = TableCellStyle::new("Heading")
            .with_parent("Default")
            .with_font(Font::new().with_bold(true).with_size(14.0))
            .with_alignment(
                Alignment::new()
                    .with_horizontal(HorizontalAlign::Center)
                    .with_wrap_text(true),
            )
            .with_background_color("#DDDDDD");
        let xml = xml_of(&style);
        assert!(xml.starts_with(
            "<style:style style:name=\"Heading\" style:family=\"table-cell\" style:parent-style-name=\"Default\">"
        ));
        assert!(xml.contains("fo:background-color=\"#DDDDDD\""));
        assert!(xml.contains("fo:wrap-option=\"wrap\""));
        assert!(xml.contains("<style:paragraph-properties fo:text-align=\"center\"/>"));
        assert!(xml.contains("fo:font-weight=\"bold\""));
        assert!(xml.contains("fo:font-size=\"14pt\""));
        assert!(xml.ends_with("</style:style>"));
    }

    #[test]
    fn test_empty_cell_style_has_no_property_elements() {
        let xml = xml_of(&TableCellStyle::new("Default"));
        assert_eq!(
            xml,
            "<style:style style:name=\"Default\" style:family=\"table-cell\"></style:style>"
        );
    }

    #[test]
    fn test_protection_attribute() {
        let xml = xml_of(&TableCellStyle::new("open").with_protection(Protection::unlocked()));
        assert!(xml.contains("style:cell-protect=\"none\""));
        let xml = xml_of(&TableCellStyle::new("secret").with_protection(Protection::new().with_hidden(true)));
        assert!(xml.contains("style:cell-protect=\"protected formula-hidden\""));
    }

    #[test]
    fn test_text_style() {
        let style = TextStyle::new("T1", Font::new().with_italic(true).with_vert_align("super"));
        let xml = xml_of(&style);
        assert!(xml.contains("style:family=\"text\""));
        assert!(xml.contains("fo:font-style=\"italic\""));
        assert!(xml.contains("style:text-position=\"super 58%\""));
        assert_eq!(style.visibility(), Visibility::Automatic);
    }
}
