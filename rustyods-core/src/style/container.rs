//! Registry of every style a document declares.
//!
//! Styles are kept in insertion order, one sub-registry per family. Cell
//! styles carry a second index: the cache of child styles synthesized for a
//! (cell style, data style) pair, so that every cell formatted the same way
//! shares a single automatic declaration.

use std::sync::Arc;

use log::{debug, warn};

use super::{
    validate_style_name, DataStyle, MasterPage, OdsStyle, PageLayout, StyleFamily, StyleObject,
    TableCellStyle, TableColumnStyle, TableRowStyle, TableStyle, TextStyle, Visibility,
};
use crate::error::{Result, RustyodsError};
use crate::HashMap;

/// Separator between base and data style names in a child style name.
pub const CHILD_STYLE_SEPARATOR: &str = "-_-";

/// How `add` treats an existing key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryMode {
    /// Insert only if absent.
    Create,
    /// Replace only if present.
    Update,
    /// Insert or replace.
    CreateOrUpdate,
}

/// Insertion-ordered map from style name to style, with a freeze switch.
#[derive(Clone, Debug)]
pub struct Registry<V> {
    entries: Vec<V>,
    index: HashMap<String, usize>,
    frozen: bool,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Registry {
            entries: Vec::new(),
            index: HashMap::default(),
            frozen: false,
        }
    }
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `key`. Returns whether the registry changed.
    ///
    /// Once frozen, a key that was never added is rejected regardless of
    /// the mode; known keys still follow the mode.
    pub fn add(&mut self, key: &str, value: V, mode: EntryMode) -> Result<bool> {
        match self.index.get(key) {
            Some(&idx) => match mode {
                EntryMode::Create => Ok(false),
                EntryMode::Update | EntryMode::CreateOrUpdate => {
                    self.entries[idx] = value;
                    Ok(true)
                }
            },
            None => {
                if self.frozen {
                    return Err(RustyodsError::StylesFrozen(key.to_string()));
                }
                if mode == EntryMode::Update {
                    return Ok(false);
                }
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(value);
                Ok(true)
            }
        }
    }

    /// Add or replace `value` under `key`, ignoring the freeze.
    pub(crate) fn insert(&mut self, key: &str, value: V) {
        match self.index.get(key) {
            Some(&idx) => self.entries[idx] = value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in insertion order.
    pub fn values(&self) -> std::slice::Iter<'_, V> {
        self.entries.iter()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Handle to a synthesized (cell style, data style) child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildCellStyle {
    pub name: Arc<str>,
    pub base: Arc<str>,
    pub data_style: Arc<str>,
}

/// All styles of a document, partitioned by family.
#[derive(Debug, Default)]
pub struct StyleContainer {
    cell_styles: Registry<TableCellStyle>,
    row_styles: Registry<TableRowStyle>,
    column_styles: Registry<TableColumnStyle>,
    table_styles: Registry<TableStyle>,
    text_styles: Registry<TextStyle>,
    data_styles: Registry<DataStyle>,
    page_layouts: Registry<PageLayout>,
    master_pages: Registry<MasterPage>,
    children: HashMap<(String, String), ChildCellStyle>,
    frozen: bool,
}

impl StyleContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a style of any family. Returns whether the container changed.
    pub fn add_style(&mut self, style: impl Into<StyleObject>, mode: EntryMode) -> Result<bool> {
        let style = style.into();
        let name = style.name().to_string();
        validate_style_name(&name)?;
        match style {
            StyleObject::Cell(s) => {
                let changed = self.cell_styles.add(&name, s, mode)?;
                if changed {
                    self.rederive_children(&name)?;
                }
                Ok(changed)
            }
            StyleObject::Row(s) => self.row_styles.add(&name, s, mode),
            StyleObject::Column(s) => self.column_styles.add(&name, s, mode),
            StyleObject::Table(s) => self.table_styles.add(&name, s, mode),
            StyleObject::Text(s) => self.text_styles.add(&name, s, mode),
            StyleObject::Data(s) => self.data_styles.add(&name, s, mode),
            StyleObject::PageLayout(s) => self.page_layouts.add(&name, s, mode),
            StyleObject::MasterPage(s) => self.master_pages.add(&name, s, mode),
        }
    }

    /// Register a style on first use.
    ///
    /// A different style already registered under the same name wins; the
    /// mismatch is logged.
    pub(crate) fn register_if_absent<S>(&mut self, style: &S) -> Result<()>
    where
        S: OdsStyle + Clone + Into<StyleObject>,
    {
        if self.contains(style.family(), style.name()) {
            if let Some(existing) = self.get_style(style.family(), style.name()) {
                let given: StyleObject = style.clone().into();
                if existing != given {
                    warn!(
                        "style {} '{}' already registered with other properties; keeping the first",
                        style.family(),
                        style.name()
                    );
                }
            }
            return Ok(());
        }
        self.add_style(style.clone(), EntryMode::Create).map(|_| ())
    }

    pub fn contains(&self, family: StyleFamily, name: &str) -> bool {
        match family {
            StyleFamily::TableCell => self.cell_styles.contains(name),
            StyleFamily::TableRow => self.row_styles.contains(name),
            StyleFamily::TableColumn => self.column_styles.contains(name),
            StyleFamily::Table => self.table_styles.contains(name),
            StyleFamily::Text => self.text_styles.contains(name),
            StyleFamily::Data => self.data_styles.contains(name),
            StyleFamily::PageLayout => self.page_layouts.contains(name),
            StyleFamily::MasterPage => self.master_pages.contains(name),
        }
    }

    /// Copy of the style registered under `name` in `family`.
    pub fn get_style(&self, family: StyleFamily, name: &str) -> Option<StyleObject> {
        match family {
            StyleFamily::TableCell => self.cell_styles.get(name).cloned().map(Into::into),
            StyleFamily::TableRow => self.row_styles.get(name).cloned().map(Into::into),
            StyleFamily::TableColumn => self.column_styles.get(name).cloned().map(Into::into),
            StyleFamily::Table => self.table_styles.get(name).cloned().map(Into::into),
            StyleFamily::Text => self.text_styles.get(name).cloned().map(Into::into),
            StyleFamily::Data => self.data_styles.get(name).cloned().map(Into::into),
            StyleFamily::PageLayout => self.page_layouts.get(name).cloned().map(Into::into),
            StyleFamily::MasterPage => self.master_pages.get(name).cloned().map(Into::into),
        }
    }

    pub fn cell_style(&self, name: &str) -> Option<&TableCellStyle> {
        self.cell_styles.get(name)
    }

    pub fn data_style(&self, name: &str) -> Option<&DataStyle> {
        self.data_styles.get(name)
    }

    /// Automatic cell style combining `base`'s visual properties with
    /// `data`'s formatting, created on first request and cached after.
    ///
    /// `base` and `data` are registered if they are not yet known. The child
    /// inherits from `base` when `base` is common, otherwise from `base`'s
    /// own parent.
    pub fn add_child_cell_style(&mut self, base: &TableCellStyle, data: &DataStyle) -> Result<ChildCellStyle> {
        let key = (base.name().to_string(), data.name().to_string());
        if let Some(child) = self.children.get(&key) {
            return Ok(child.clone());
        }

        let child_name = format!("{}{}{}", key.0, CHILD_STYLE_SEPARATOR, key.1);
        if self.frozen {
            return Err(RustyodsError::StylesFrozen(child_name));
        }
        self.register_if_absent(base)?;
        self.register_if_absent(data)?;

        let registered = self.cell_styles.get(&key.0).cloned().unwrap_or_else(|| base.clone());
        Ok(self.store_child(&registered, &key.1))
    }

    fn store_child(&mut self, base: &TableCellStyle, data: &str) -> ChildCellStyle {
        let name = format!("{}{}{}", base.name(), CHILD_STYLE_SEPARATOR, data);
        self.cell_styles.insert(&name, derive_child(base, &name, data));
        debug!("synthesized child cell style {}", name);

        let handle = ChildCellStyle {
            name: Arc::from(name),
            base: Arc::from(base.name()),
            data_style: Arc::from(data),
        };
        self.children
            .insert((base.name().to_string(), data.to_string()), handle.clone());
        handle
    }

    /// Built-in style, stored without validation or freeze checks.
    pub(crate) fn insert_builtin(&mut self, style: impl Into<StyleObject>) {
        let style = style.into();
        let name = style.name().to_string();
        match style {
            StyleObject::Cell(s) => self.cell_styles.insert(&name, s),
            StyleObject::Row(s) => self.row_styles.insert(&name, s),
            StyleObject::Column(s) => self.column_styles.insert(&name, s),
            StyleObject::Table(s) => self.table_styles.insert(&name, s),
            StyleObject::Text(s) => self.text_styles.insert(&name, s),
            StyleObject::Data(s) => self.data_styles.insert(&name, s),
            StyleObject::PageLayout(s) => self.page_layouts.insert(&name, s),
            StyleObject::MasterPage(s) => self.master_pages.insert(&name, s),
        }
    }

    /// Built-in child of `base` for `data`, both stored alongside it.
    pub(crate) fn insert_builtin_child(&mut self, base: &TableCellStyle, data: DataStyle) -> ChildCellStyle {
        let data_name = data.name().to_string();
        self.insert_builtin(base.clone());
        self.insert_builtin(data);
        self.store_child(base, &data_name)
    }

    /// Rebuild the cached children of `base` from its current properties.
    fn rederive_children(&mut self, base: &str) -> Result<()> {
        let Some(registered) = self.cell_styles.get(base).cloned() else {
            return Ok(());
        };
        let stale: Vec<ChildCellStyle> = self
            .children
            .values()
            .filter(|child| &*child.base == base)
            .cloned()
            .collect();
        for child in stale {
            let derived = derive_child(&registered, &child.name, &child.data_style);
            self.cell_styles.add(&child.name, derived, EntryMode::Update)?;
            debug!("re-derived child cell style {} after {} changed", child.name, base);
        }
        Ok(())
    }

    /// Child of two already registered styles, looked up by name.
    pub(crate) fn child_by_name(&mut self, base: &str, data: &str) -> Result<Arc<str>> {
        if let Some(child) = self.children.get(&(base.to_string(), data.to_string())) {
            return Ok(child.name.clone());
        }
        let base = self
            .cell_styles
            .get(base)
            .cloned()
            .ok_or_else(|| RustyodsError::custom(format!("cell style '{}' is not registered", base)))?;
        let data = self
            .data_styles
            .get(data)
            .cloned()
            .ok_or_else(|| RustyodsError::custom(format!("data style '{}' is not registered", data)))?;
        Ok(self.add_child_cell_style(&base, &data)?.name)
    }

    /// Reject every style not already known from now on.
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.cell_styles.freeze();
        self.row_styles.freeze();
        self.column_styles.freeze();
        self.table_styles.freeze();
        self.text_styles.freeze();
        self.data_styles.freeze();
        self.page_layouts.freeze();
        self.master_pages.freeze();
        debug!("style container frozen with {} cell styles", self.cell_styles.len());
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Data styles of the given visibility.
    pub fn write_data_styles(&self, out: &mut String, visibility: Visibility) {
        write_matching(out, self.data_styles.values(), visibility);
    }

    /// Body of `office:styles` in styles.xml.
    pub fn write_common_styles(&self, out: &mut String) {
        self.write_data_styles(out, Visibility::Common);
        self.write_visual_styles(out, Visibility::Common);
    }

    /// Body of `office:automatic-styles` in content.xml.
    pub fn write_automatic_styles(&self, out: &mut String) {
        self.write_data_styles(out, Visibility::Automatic);
        self.write_visual_styles(out, Visibility::Automatic);
    }

    /// Page layouts, for the automatic styles of styles.xml.
    pub fn write_page_layouts(&self, out: &mut String) {
        for layout in self.page_layouts.values() {
            layout.write_xml(out);
        }
    }

    /// Body of `office:master-styles` in styles.xml.
    pub fn write_master_pages(&self, out: &mut String) {
        for page in self.master_pages.values() {
            page.write_xml(out);
        }
    }

    fn write_visual_styles(&self, out: &mut String, visibility: Visibility) {
        write_matching(out, self.table_styles.values(), visibility);
        write_matching(out, self.column_styles.values(), visibility);
        write_matching(out, self.row_styles.values(), visibility);
        write_matching(out, self.cell_styles.values(), visibility);
        write_matching(out, self.text_styles.values(), visibility);
    }
}

/// Automatic child of `base` bound to the data style `data`.
///
/// Inherits from `base` when it is common, otherwise from `base`'s parent.
fn derive_child(base: &TableCellStyle, name: &str, data: &str) -> TableCellStyle {
    let parent = match base.visibility() {
        Visibility::Common => Some(base.name().to_string()),
        Visibility::Automatic => base.parent().map(str::to_string),
    };
    let mut child = base.derive(name.to_string(), Visibility::Automatic, parent);
    child.data_style = Some(data.to_string());
    child
}

fn write_matching<'a, S: OdsStyle + 'a>(out: &mut String, styles: impl Iterator<Item = &'a S>, visibility: Visibility) {
    for style in styles.filter(|s| s.visibility() == visibility) {
        style.write_xml(out);
    }
}
