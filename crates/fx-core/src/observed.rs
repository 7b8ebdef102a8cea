//! Descriptor lists whose mutations drive registration side effects.
//!
//! An [`ObservedList`] keeps its entries next to a parallel vector of
//! optional handles. A handle is whatever the [`Observer`] returned when it
//! bound the entry (`None` when binding was suppressed). Every mutation
//! method takes the observer explicitly, so there is no hidden interception:
//! each logical insertion calls `on_insert` once and each removal of a bound
//! entry calls `on_remove` once.
//!
//! Hooks only run while the list is attached. A detached list is plain
//! storage.

/// Side effects for an [`ObservedList`].
pub trait Observer<T> {
    /// Registration record kept alongside a bound entry.
    type Handle;
    type Error;

    /// Bind the entry that now sits (or is about to sit) at `index`.
    ///
    /// `Ok(None)` leaves the entry present but unbound. On `Err` the list is
    /// left exactly as it was before the mutation.
    fn on_insert(&mut self, index: usize, item: &T) -> Result<Option<Self::Handle>, Self::Error>;

    /// Release the registration of a bound entry leaving `index`.
    fn on_remove(&mut self, index: usize, item: &T, handle: Self::Handle);
}

/// A list of descriptors plus the runtime handle bound to each slot.
#[derive(Debug, Clone)]
pub struct ObservedList<T, H> {
    items: Vec<T>,
    handles: Vec<Option<H>>,
    attached: bool,
}

impl<T, H> Default for ObservedList<T, H> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            handles: Vec::new(),
            attached: false,
        }
    }
}

impl<T, H> ObservedList<T, H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the entry at `index` holds a live registration.
    pub fn is_bound(&self, index: usize) -> bool {
        matches!(self.handles.get(index), Some(Some(_)))
    }

    pub fn bound_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_some()).count()
    }

    pub fn handle(&self, index: usize) -> Option<&H> {
        self.handles.get(index).and_then(Option::as_ref)
    }

    pub fn handles(&self) -> impl Iterator<Item = (usize, &H)> {
        self.handles
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.as_ref().map(|h| (i, h)))
    }

    /// Append without running hooks. Fails (returning the item) once attached.
    pub fn push_detached(&mut self, item: T) -> Result<usize, T> {
        if self.attached {
            return Err(item);
        }
        self.items.push(item);
        self.handles.push(None);
        Ok(self.items.len() - 1)
    }

    /// Append an entry, binding it if attached.
    pub fn push<O>(&mut self, item: T, observer: &mut O) -> Result<usize, O::Error>
    where
        O: Observer<T, Handle = H>,
    {
        let index = self.items.len();
        self.insert(index, item, observer)?;
        Ok(index)
    }

    /// Insert at `index` (clamped to `len`), binding it if attached.
    pub fn insert<O>(&mut self, index: usize, item: T, observer: &mut O) -> Result<(), O::Error>
    where
        O: Observer<T, Handle = H>,
    {
        let index = index.min(self.items.len());
        let handle = if self.attached {
            observer.on_insert(index, &item)?
        } else {
            None
        };
        self.items.insert(index, item);
        self.handles.insert(index, handle);
        Ok(())
    }

    /// Remove the entry at `index`, unbinding it if bound.
    pub fn remove<O>(&mut self, index: usize, observer: &mut O) -> Option<T>
    where
        O: Observer<T, Handle = H>,
    {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        if let Some(handle) = self.handles.remove(index) {
            observer.on_remove(index, &item, handle);
        }
        Some(item)
    }

    /// Replace the entry at `index`. The new entry is bound first; if that
    /// fails the old entry stays bound and in place.
    pub fn replace<O>(&mut self, index: usize, item: T, observer: &mut O) -> Result<T, O::Error>
    where
        O: Observer<T, Handle = H>,
        O::Error: From<crate::error::FxError>,
    {
        if index >= self.items.len() {
            return Err(crate::error::FxError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            }
            .into());
        }
        let handle = if self.attached {
            observer.on_insert(index, &item)?
        } else {
            None
        };
        let old = std::mem::replace(&mut self.items[index], item);
        if let Some(old_handle) = std::mem::replace(&mut self.handles[index], handle) {
            observer.on_remove(index, &old, old_handle);
        }
        Ok(old)
    }

    /// Drop every entry from `len` onward, last first.
    pub fn truncate<O>(&mut self, len: usize, observer: &mut O) -> Vec<T>
    where
        O: Observer<T, Handle = H>,
    {
        let mut removed = Vec::new();
        while self.items.len() > len {
            let index = self.items.len() - 1;
            if let Some(item) = self.remove(index, observer) {
                removed.push(item);
            }
        }
        removed.reverse();
        removed
    }

    pub fn clear<O>(&mut self, observer: &mut O) -> Vec<T>
    where
        O: Observer<T, Handle = H>,
    {
        self.truncate(0, observer)
    }

    /// Mark the list as living on a canvas and bind every entry in order.
    ///
    /// If any entry fails to bind, everything bound by this call is released
    /// again (in reverse order) and the list stays detached.
    pub fn attach<O>(&mut self, observer: &mut O) -> Result<(), O::Error>
    where
        O: Observer<T, Handle = H>,
    {
        if self.attached {
            return Ok(());
        }
        for index in 0..self.items.len() {
            match observer.on_insert(index, &self.items[index]) {
                Ok(handle) => self.handles[index] = handle,
                Err(err) => {
                    for undo in (0..index).rev() {
                        if let Some(handle) = self.handles[undo].take() {
                            observer.on_remove(undo, &self.items[undo], handle);
                        }
                    }
                    return Err(err);
                }
            }
        }
        self.attached = true;
        Ok(())
    }

    /// Release every bound entry (last first) and mark the list detached.
    /// Entries stay in place.
    pub fn detach<O>(&mut self, observer: &mut O)
    where
        O: Observer<T, Handle = H>,
    {
        for index in (0..self.items.len()).rev() {
            if let Some(handle) = self.handles[index].take() {
                observer.on_remove(index, &self.items[index], handle);
            }
        }
        self.attached = false;
    }
}

impl<'a, T, H> IntoIterator for &'a ObservedList<T, H> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
