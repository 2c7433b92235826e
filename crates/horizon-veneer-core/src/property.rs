//! Property system for Horizon Veneer.
//!
//! A [`Property<T>`] couples a value with a change [`Signal`]. Setting a
//! different value stores it and then notifies every listener with the new
//! value. Listener failures are handed back to the setter's caller; the new
//! value is kept either way.
//!
//! # Example
//!
//! ```
//! use horizon_veneer_core::Property;
//!
//! let text = Property::new("text", String::from("Hello"));
//! text.changed().connect(|value| {
//!     println!("text is now {value}");
//!     Ok(())
//! });
//!
//! assert!(text.set("World".to_string()).unwrap());
//! assert!(!text.set("World".to_string()).unwrap());
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::error::EmitResult;
use crate::signal::Signal;

/// A reactive property that tracks changes.
///
/// # Thread Safety
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// when `T` is. No lock is held while listeners run, so a listener may read
/// the property it observes.
pub struct Property<T> {
    value: RwLock<T>,
    changed: Signal<T>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Property<T> {
    /// Create a new property with a name and an initial value.
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            value: RwLock::new(value),
            changed: Signal::new(name),
        }
    }

    /// The property name, as used in logs and watch audits.
    pub fn name(&self) -> &'static str {
        self.changed.name()
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value, returning `Ok(true)` if the value changed.
    ///
    /// Listeners are notified only on change. If any listener fails the
    /// value stays updated and the failures are returned.
    pub fn set(&self, value: T) -> EmitResult<bool> {
        {
            let mut current = self.value.write();
            if *current == value {
                return Ok(false);
            }
            *current = value.clone();
        }
        tracing::trace!(target: "horizon_veneer_core::property", property = self.name(), "property changed");
        self.changed.emit(value)?;
        Ok(true)
    }

    /// Set the value without change notification.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// Re-emit the current value to every listener.
    pub fn notify(&self) -> EmitResult<()> {
        let value = self.get();
        self.changed.emit(value)
    }

    /// The change notification signal.
    pub fn changed(&self) -> &Signal<T> {
        &self.changed
    }
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Property<T> {
    /// Create a property holding `T::default()`.
    pub fn with_default(name: &'static str) -> Self {
        Self::new(name, T::default())
    }
}

impl<T: Clone + fmt::Debug + PartialEq + Send + Sync + 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name())
            .field("value", &self.get())
            .field("listeners", &self.changed.connection_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(Property<Option<String>>: Send, Sync);
