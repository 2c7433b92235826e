//! Accessibility queries answered by skins.
//!
//! Assistive technologies ask a skin for one [`AccessibleAttribute`] at a
//! time. A disposed skin answers nothing.

use crate::control::ControlKind;
use crate::skin::Skin;

/// The role a control presents to assistive technologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessibleRole {
    /// A push button.
    Button,
    /// A two or three state check box.
    CheckBox,
    /// Static text.
    Label,
    /// A hyperlink.
    Link,
    /// A determinate or indeterminate progress indicator.
    ProgressBar,
    /// A single-line editable text field.
    TextInput,
    /// A text field whose content is masked.
    PasswordInput,
    /// An editable choice with a drop-down list.
    ComboBox,
    /// A button that opens a menu.
    MenuButton,
    /// A button that opens a color palette.
    ColorPicker,
    /// A row of tool items.
    ToolBar,
    /// A virtualized list.
    List,
    /// A virtualized table with columns.
    Table,
    /// A virtualized tree.
    Tree,
}

impl From<ControlKind> for AccessibleRole {
    fn from(kind: ControlKind) -> Self {
        match kind {
            ControlKind::Button => Self::Button,
            ControlKind::CheckBox => Self::CheckBox,
            ControlKind::Label => Self::Label,
            ControlKind::Hyperlink => Self::Link,
            ControlKind::ProgressBar => Self::ProgressBar,
            ControlKind::TextField => Self::TextInput,
            ControlKind::PasswordField => Self::PasswordInput,
            ControlKind::ComboBox => Self::ComboBox,
            ControlKind::MenuButton => Self::MenuButton,
            ControlKind::ColorPicker => Self::ColorPicker,
            ControlKind::ToolBar => Self::ToolBar,
            ControlKind::ListView => Self::List,
            ControlKind::TableView => Self::Table,
            ControlKind::TreeView => Self::Tree,
        }
    }
}

/// What can be asked of a skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessibleAttribute {
    /// The control's role. Every kind answers.
    Role,
    /// Displayed text, masked for password fields.
    Text,
    /// Check box selection.
    Selected,
    /// Check box or progress bar indeterminate state.
    Indeterminate,
    /// Progress in `0.0..=1.0`.
    Value,
    /// Whether the popup is showing.
    Expanded,
    /// Keyboard focus.
    Focused,
    /// Items, rows, or palette entries.
    ItemCount,
    /// Visible table columns.
    ColumnCount,
    /// The selected row.
    FocusItem,
}

/// The answer to an attribute query.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Answer to [`AccessibleAttribute::Role`].
    Role(AccessibleRole),
    /// Text content.
    Text(String),
    /// A flag.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// A number of items or columns.
    Count(usize),
    /// A row index.
    Index(usize),
}

impl Skin {
    /// Answer an accessibility query, or `None` if the attribute does not
    /// apply to this kind or the skin is disposed.
    pub fn query_accessible_attribute(&self, attribute: AccessibleAttribute) -> Option<AttributeValue> {
        if self.is_disposed() {
            return None;
        }
        let control = self.control()?;
        let kind = self.kind();
        match attribute {
            AccessibleAttribute::Role => Some(AttributeValue::Role(kind.into())),
            AccessibleAttribute::Text => match kind {
                ControlKind::TextField | ControlKind::PasswordField => {
                    Some(AttributeValue::Text(crate::skin::accessible_text(&control)))
                }
                ControlKind::ComboBox | ControlKind::ColorPicker => {
                    control.value().get().map(AttributeValue::Text)
                }
                _ => control.text().get().map(AttributeValue::Text),
            },
            AccessibleAttribute::Selected => {
                (kind == ControlKind::CheckBox).then(|| AttributeValue::Bool(control.selected().get()))
            }
            AccessibleAttribute::Indeterminate => {
                matches!(kind, ControlKind::CheckBox | ControlKind::ProgressBar)
                    .then(|| AttributeValue::Bool(control.indeterminate().get()))
            }
            AccessibleAttribute::Value => (kind == ControlKind::ProgressBar)
                .then(|| AttributeValue::Number(control.progress().get().clamp(0.0, 1.0))),
            AccessibleAttribute::Expanded => kind.has_popup().then(|| AttributeValue::Bool(self.popup_open())),
            AccessibleAttribute::Focused => Some(AttributeValue::Bool(control.focused().get())),
            AccessibleAttribute::ItemCount => match kind {
                ControlKind::ColorPicker => Some(AttributeValue::Count(crate::skin::PALETTE.len())),
                ControlKind::ComboBox | ControlKind::MenuButton | ControlKind::ToolBar => {
                    Some(AttributeValue::Count(control.items().len()))
                }
                _ => self.cell_count().map(AttributeValue::Count),
            },
            AccessibleAttribute::ColumnCount => (kind == ControlKind::TableView)
                .then(|| AttributeValue::Count(control.columns().visible_ids().len())),
            AccessibleAttribute::FocusItem => match kind {
                ControlKind::ListView | ControlKind::TableView | ControlKind::TreeView | ControlKind::ComboBox => {
                    control.selected_index().get().map(AttributeValue::Index)
                }
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Control;
    use crate::registry::SkinRegistry;

    #[test]
    fn test_role_and_text() {
        let registry = SkinRegistry::new();
        let button = Control::new(ControlKind::Button);
        button.text().set(Some("OK".to_string())).unwrap();
        let skin = registry.create_skin(&button);

        assert_eq!(
            skin.query_accessible_attribute(AccessibleAttribute::Role),
            Some(AttributeValue::Role(AccessibleRole::Button))
        );
        assert_eq!(
            skin.query_accessible_attribute(AccessibleAttribute::Text),
            Some(AttributeValue::Text("OK".to_string()))
        );
        assert_eq!(skin.query_accessible_attribute(AccessibleAttribute::Selected), None);
    }

    #[test]
    fn test_every_kind_has_its_own_role() {
        let roles: std::collections::HashSet<AccessibleRole> =
            ControlKind::ALL.into_iter().map(AccessibleRole::from).collect();
        assert_eq!(roles.len(), ControlKind::ALL.len());
    }

    #[test]
    fn test_password_text_is_masked() {
        let registry = SkinRegistry::new();
        let field = Control::new(ControlKind::PasswordField);
        field.text().set(Some("abc".to_string())).unwrap();
        let skin = registry.create_skin(&field);
        assert_eq!(
            skin.query_accessible_attribute(AccessibleAttribute::Text),
            Some(AttributeValue::Text("\u{2022}\u{2022}\u{2022}".to_string()))
        );
    }

    #[test]
    fn test_list_counts_and_focus() {
        let registry = SkinRegistry::new();
        let list = Control::new(ControlKind::ListView);
        list.items().extend(["a", "b", "c"].map(String::from)).unwrap();
        list.selected_index().set(Some(1)).unwrap();
        let skin = registry.create_skin(&list);

        assert_eq!(
            skin.query_accessible_attribute(AccessibleAttribute::ItemCount),
            Some(AttributeValue::Count(3))
        );
        assert_eq!(
            skin.query_accessible_attribute(AccessibleAttribute::FocusItem),
            Some(AttributeValue::Index(1))
        );
    }

    #[test]
    fn test_disposed_skin_answers_nothing() {
        let registry = SkinRegistry::new();
        let check = Control::new(ControlKind::CheckBox);
        let skin = registry.create_skin(&check);
        assert!(skin.query_accessible_attribute(AccessibleAttribute::Role).is_some());
        skin.dispose();
        assert_eq!(skin.query_accessible_attribute(AccessibleAttribute::Role), None);
    }

    #[test]
    fn test_expanded_tracks_popup() {
        let registry = SkinRegistry::new();
        let combo = Control::new(ControlKind::ComboBox);
        let skin = registry.create_skin(&combo);
        registry.install(&combo, skin.clone()).unwrap();
        combo.showing().set(true).unwrap();
        assert_eq!(
            skin.query_accessible_attribute(AccessibleAttribute::Expanded),
            Some(AttributeValue::Bool(true))
        );
    }
}
