//! The closed set of control kinds.

use std::fmt;

use crate::geometry::Insets;

/// Every kind of control a skin can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// A push button.
    Button,
    /// A check box with an optional indeterminate state.
    CheckBox,
    /// A static text label.
    Label,
    /// A clickable link.
    Hyperlink,
    /// A determinate or indeterminate progress bar.
    ProgressBar,
    /// A single-line text field.
    TextField,
    /// A text field that masks its content.
    PasswordField,
    /// A drop-down selection from `items`.
    ComboBox,
    /// A button that opens a menu of `items`.
    MenuButton,
    /// A drop-down color palette.
    ColorPicker,
    /// A row of buttons with overflow.
    ToolBar,
    /// A virtualized list of `items`.
    ListView,
    /// A virtualized table of `items` by `columns`.
    TableView,
    /// A virtualized expandable `tree`.
    TreeView,
}

impl ControlKind {
    /// Every kind, in declaration order.
    pub const ALL: [ControlKind; 14] = [
        Self::Button,
        Self::CheckBox,
        Self::Label,
        Self::Hyperlink,
        Self::ProgressBar,
        Self::TextField,
        Self::PasswordField,
        Self::ComboBox,
        Self::MenuButton,
        Self::ColorPicker,
        Self::ToolBar,
        Self::ListView,
        Self::TableView,
        Self::TreeView,
    ];

    /// The kind's name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Button => "Button",
            Self::CheckBox => "CheckBox",
            Self::Label => "Label",
            Self::Hyperlink => "Hyperlink",
            Self::ProgressBar => "ProgressBar",
            Self::TextField => "TextField",
            Self::PasswordField => "PasswordField",
            Self::ComboBox => "ComboBox",
            Self::MenuButton => "MenuButton",
            Self::ColorPicker => "ColorPicker",
            Self::ToolBar => "ToolBar",
            Self::ListView => "ListView",
            Self::TableView => "TableView",
            Self::TreeView => "TreeView",
        }
    }

    /// Padding a new control of this kind starts with.
    pub fn default_padding(self) -> Insets {
        match self {
            Self::Button | Self::MenuButton | Self::ComboBox | Self::ColorPicker => {
                Insets::symmetric(4.0, 8.0)
            }
            Self::TextField | Self::PasswordField => Insets::symmetric(4.0, 7.0),
            Self::Hyperlink => Insets::uniform(2.0),
            Self::ToolBar => Insets::uniform(4.0),
            Self::ListView | Self::TableView | Self::TreeView => Insets::uniform(1.0),
            Self::Label | Self::CheckBox | Self::ProgressBar => Insets::ZERO,
        }
    }

    /// Whether the skin lays out text with an optional graphic.
    pub fn is_labeled(self) -> bool {
        matches!(
            self,
            Self::Button | Self::CheckBox | Self::Label | Self::Hyperlink | Self::MenuButton
        )
    }

    /// Whether the skin edits text with a caret.
    pub fn is_text_input(self) -> bool {
        matches!(self, Self::TextField | Self::PasswordField)
    }

    /// Whether the skin owns a popup.
    pub fn has_popup(self) -> bool {
        matches!(self, Self::ComboBox | Self::MenuButton | Self::ColorPicker)
    }

    /// Whether the skin shows rows through a virtual flow.
    pub fn is_virtualized(self) -> bool {
        matches!(self, Self::ListView | Self::TableView | Self::TreeView)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
