//! Prelude module for Horizon Veneer.
//!
//! ```ignore
//! use horizon_veneer::prelude::*;
//! ```

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use horizon_veneer_core::{
    CollectingFaultSink, ConnectionId, EmitError, Fault, FaultSink, Property, Signal, SlotError,
    SlotResult, TracingFaultSink,
};

// ============================================================================
// Controls and Skins
// ============================================================================

pub use crate::accessibility::{AccessibleAttribute, AccessibleRole, AttributeValue};
pub use crate::control::{ActionEvent, Control, ControlId, ControlKind};
pub use crate::input::{InputEvent, Key};
pub use crate::registry::SkinRegistry;
pub use crate::skin::{Skin, SkinId, SkinLayout, SkinState};

// ============================================================================
// Models and Virtualization
// ============================================================================

pub use crate::flow::{Cell, CellId, VirtualFlow};
pub use crate::model::{ColumnId, ItemList, ItemTree, NodeId, StructuralChange, TableColumns};

// ============================================================================
// Configuration, Geometry, and Errors
// ============================================================================

pub use crate::config::{ReclaimPolicy, SkinConfig, TextMetrics};
pub use crate::error::{ModelError, SkinError, SkinResult, StructureError};
pub use crate::geometry::{Insets, Size};
