//! Item identity and date attribute access

use crate::core::date::RawDate;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Identity of an item stored in a timeline.
///
/// Two values with the same id are the same item; adding the second one
/// updates the first.
pub trait Identify {
    type Id: Eq + Hash + Clone + fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Named date attribute of an item, fixed when a timeline is built
pub struct DateField<T> {
    name: String,
    read: Rc<dyn Fn(&T) -> Option<RawDate>>,
}

impl<T> DateField<T> {
    /// `read` returns `None` when the item has no value for the attribute
    pub fn new<F>(name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&T) -> Option<RawDate> + 'static,
    {
        Self {
            name: name.into(),
            read: Rc::new(read),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn read(&self, item: &T) -> Option<RawDate> {
        (self.read)(item)
    }
}

impl<T> Clone for DateField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            read: Rc::clone(&self.read),
        }
    }
}

impl<T> fmt::Debug for DateField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateField").field("name", &self.name).finish()
    }
}
