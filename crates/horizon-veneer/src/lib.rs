//! Horizon Veneer - swappable widget skins with leak-safe property watching
//! and virtualized cells.
//!
//! A [`Control`](control::Control) holds its state in reactive properties and
//! at most one [`Skin`](skin::Skin). Skins are built, installed, replaced, and
//! disposed through a [`SkinRegistry`](registry::SkinRegistry). A disposed
//! skin leaves no listener behind on its control and is reclaimed as soon as
//! the last outside handle goes away.
//!
//! List, table, and tree views (and the combo box popup) show their rows
//! through a [`VirtualFlow`](flow::VirtualFlow), which materializes only the
//! rows in the viewport and reuses released cells.
//!
//! # Example
//!
//! ```
//! use horizon_veneer::prelude::*;
//!
//! let registry = SkinRegistry::new();
//! let list = Control::new(ControlKind::ListView);
//! list.items().extend((0..10_000).map(|i| format!("row {i}"))).unwrap();
//! list.size().set(Size::new(200.0, 242.0)).unwrap();
//!
//! let skin = registry.create_skin(&list);
//! registry.install(&list, skin.clone()).unwrap();
//! registry.pulse();
//!
//! assert_eq!(skin.cell_count(), Some(10_000));
//! assert_eq!(skin.with_flow(|flow| flow.materialized_count()), Some(10));
//! ```

pub use horizon_veneer_core::*;

pub mod accessibility;
pub mod config;
pub mod control;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod input;
pub mod model;
pub mod prelude;
pub mod reclaim;
pub mod registry;
pub mod skin;
pub mod watch;
