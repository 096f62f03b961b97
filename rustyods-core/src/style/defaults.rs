//! Styles every document starts with.

use super::{
    DataStyle, Length, MasterPage, PageLayout, StyleContainer, TableCellStyle,
    TableColumnStyle, TableRowStyle, TableStyle,
};
use crate::value::CellValue;

pub const DEFAULT_CELL_STYLE: &str = "Default";
pub const DEFAULT_TABLE_STYLE: &str = "ta1";
pub const DEFAULT_ROW_STYLE: &str = "ro1";
pub const DEFAULT_COLUMN_STYLE: &str = "co1";
pub const DEFAULT_PAGE_LAYOUT: &str = "Mpm1";
pub const DEFAULT_MASTER_PAGE: &str = "Default";

pub const BOOLEAN_DATA_STYLE: &str = "boolean-data";
pub const CURRENCY_DATA_STYLE: &str = "currency-data";
pub const DATE_DATA_STYLE: &str = "date-data";
pub const PERCENTAGE_DATA_STYLE: &str = "percentage-data";
pub const TIME_DATA_STYLE: &str = "time-data";

/// Data style applied to a value that has none of its own.
pub fn data_style_for(value: &CellValue) -> Option<&'static str> {
    match value {
        CellValue::Boolean(_) => Some(BOOLEAN_DATA_STYLE),
        CellValue::Currency { .. } => Some(CURRENCY_DATA_STYLE),
        CellValue::Date(_) => Some(DATE_DATA_STYLE),
        CellValue::Percentage(_) => Some(PERCENTAGE_DATA_STYLE),
        CellValue::Time(_) => Some(TIME_DATA_STYLE),
        _ => None,
    }
}

fn default_data_styles() -> [DataStyle; 5] {
    [
        DataStyle::boolean(BOOLEAN_DATA_STYLE),
        DataStyle::currency(CURRENCY_DATA_STYLE, 2, "€"),
        DataStyle::iso_date(DATE_DATA_STYLE),
        DataStyle::percentage(PERCENTAGE_DATA_STYLE, 2),
        DataStyle::hms(TIME_DATA_STYLE),
    ]
}

/// Register the default styles, including the children of `Default` for
/// every default data style.
pub(crate) fn seed(styles: &mut StyleContainer) {
    let base = TableCellStyle::new(DEFAULT_CELL_STYLE);
    styles.insert_builtin(base.clone());
    styles.insert_builtin(TableStyle::new(DEFAULT_TABLE_STYLE));
    styles.insert_builtin(
        TableRowStyle::new(DEFAULT_ROW_STYLE)
            .with_height(Length::Cm(0.45))
            .with_optimal_height(true),
    );
    styles.insert_builtin(TableColumnStyle::new(DEFAULT_COLUMN_STYLE, Length::Cm(2.5)));
    styles.insert_builtin(PageLayout::a4(DEFAULT_PAGE_LAYOUT));
    styles.insert_builtin(MasterPage::new(DEFAULT_MASTER_PAGE, DEFAULT_PAGE_LAYOUT));
    for data in default_data_styles() {
        styles.insert_builtin_child(&base, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleFamily;

    #[test]
    fn test_seed() {
        let mut styles = StyleContainer::new();
        seed(&mut styles);
        assert!(styles.contains(StyleFamily::TableCell, "Default"));
        assert!(styles.contains(StyleFamily::TableCell, "Default-_-date-data"));
        assert!(styles.contains(StyleFamily::Data, "time-data"));
        assert!(styles.contains(StyleFamily::PageLayout, "Mpm1"));
        assert!(styles.contains(StyleFamily::MasterPage, "Default"));
        assert!(styles.contains(StyleFamily::TableRow, "ro1"));
    }

    #[test]
    fn test_seeded_children_survive_freeze() {
        let mut styles = StyleContainer::new();
        seed(&mut styles);
        styles.freeze();
        let base = styles.cell_style(DEFAULT_CELL_STYLE).unwrap().clone();
        let percent = styles.data_style(PERCENTAGE_DATA_STYLE).unwrap().clone();
        let child = styles.add_child_cell_style(&base, &percent).unwrap();
        assert_eq!(&*child.name, "Default-_-percentage-data");
        assert_eq!(styles.cell_style(&child.name).unwrap().parent(), Some("Default"));
    }

    #[test]
    fn test_data_style_for() {
        assert_eq!(data_style_for(&CellValue::Boolean(true)), Some(BOOLEAN_DATA_STYLE));
        assert_eq!(data_style_for(&CellValue::Percentage(0.5)), Some(PERCENTAGE_DATA_STYLE));
        assert_eq!(data_style_for(&CellValue::Float(1.0)), None);
        assert_eq!(data_style_for(&CellValue::from("x")), None);
    }
}
