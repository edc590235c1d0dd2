use crate::{NbtCompound, NbtList, NbtStructureError, TagType, TagValue};
use std::mem;

/// A handle to a tag stored in an [`NbtTree`].
///
/// Handles are generational: once a tag is [freed](NbtTree::free), its handle is rejected by the
/// tree even if the slot is reused by a newer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId {
    index: u32,
    generation: u32,
}

/// A single node of an NBT tree: an optional name, a back-reference to the owning container and a
/// payload.
#[derive(Debug)]
pub struct Tag {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<TagId>,
    pub(crate) value: TagValue,
}

impl Tag {
    /// Returns the name of this tag. Compound members are always named; list elements and
    /// detached tags may not be.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the compound or list holding this tag, if any.
    #[inline]
    pub fn parent(&self) -> Option<TagId> {
        self.parent
    }

    /// Returns the payload of this tag.
    #[inline]
    pub fn value(&self) -> &TagValue {
        &self.value
    }

    /// Returns the type of this tag.
    #[inline]
    pub fn tag_type(&self) -> TagType {
        self.value.tag_type()
    }
}

#[derive(Debug)]
enum Entry {
    Occupied { generation: u32, tag: Tag },
    Vacant { generation: u32, next_free: usize },
}

/// An arena owning a forest of NBT tags.
///
/// Every tag lives in the tree and is addressed by its [`TagId`]. Compounds and lists refer to
/// their members by handle, and every member records its container as its parent. All mutation
/// goes through the tree, which upholds the following rules:
///  - a tag has at most one parent, and adding a tag which already has one is an error rather than
///    a move;
///  - a tag can never become its own ancestor;
///  - compound members are named, and names are unique within a compound;
///  - all elements of a list share the list's element type.
///
/// Tags which are removed from their container stay in the tree, detached, until they are
/// re-added elsewhere or [freed](NbtTree::free).
///
/// ```
/// # use ember_nbt::*;
/// let mut tree = NbtTree::new();
/// let root = tree.create_named("root", NbtCompound::new());
/// let hp = tree.create_named("hp", 100i32);
///
/// tree.add(root, hp).unwrap();
/// assert_eq!(tree.tag(hp).unwrap().parent(), Some(root));
/// assert_eq!(tree.path(hp).unwrap(), "root.hp");
///
/// // A tag may only belong to one container at a time
/// let other = tree.create_named("other", NbtCompound::new());
/// assert!(tree.add(other, hp).is_err());
///
/// tree.remove(root, hp).unwrap();
/// assert_eq!(tree.tag(hp).unwrap().parent(), None);
/// tree.add(other, hp).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct NbtTree {
    entries: Vec<Entry>,
    next_free_head: usize,
    len: usize,
    pinned_root: Option<TagId>,
}

impl NbtTree {
    /// Returns an empty tree.
    pub const fn new() -> Self {
        NbtTree {
            entries: Vec::new(),
            next_free_head: 0,
            len: 0,
            pinned_root: None,
        }
    }

    /// Returns the number of live tags in this tree, attached or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if this tree holds no tags.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether the given handle refers to a live tag.
    pub fn contains(&self, id: TagId) -> bool {
        self.tag(id).is_ok()
    }

    /// Creates a detached, unnamed tag with the given payload.
    pub fn create<T: Into<TagValue>>(&mut self, value: T) -> TagId {
        self.insert(Tag {
            name: None,
            parent: None,
            value: value.into(),
        })
    }

    /// Creates a detached tag with the given name and payload.
    pub fn create_named<N: Into<String>, T: Into<TagValue>>(&mut self, name: N, value: T) -> TagId {
        self.insert(Tag {
            name: Some(name.into()),
            parent: None,
            value: value.into(),
        })
    }

    pub(crate) fn insert(&mut self, tag: Tag) -> TagId {
        self.len += 1;

        let index = self.next_free_head;
        match self.entries.get(index) {
            Some(&Entry::Vacant {
                generation,
                next_free,
            }) => {
                self.entries[index] = Entry::Occupied { generation, tag };
                self.next_free_head = next_free;

                TagId {
                    index: index as u32,
                    generation,
                }
            }
            _ => {
                let index = self.entries.len();
                self.entries.push(Entry::Occupied { generation: 0, tag });
                self.next_free_head = self.entries.len();

                TagId {
                    index: index as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Marks the given tag as the root of a document. The pinned root cannot be attached to a
    /// container, lose its name or be freed.
    pub(crate) fn pin_root(&mut self, root: Option<TagId>) {
        self.pinned_root = root;
    }

    /// Returns the tag pinned as the root of the document owning this tree, if any.
    pub fn pinned_root(&self) -> Option<TagId> {
        self.pinned_root
    }

    fn check_not_pinned(&self, id: TagId) -> Result<(), NbtStructureError> {
        if self.pinned_root == Some(id) {
            Err(NbtStructureError::pinned_root())
        } else {
            Ok(())
        }
    }

    /// Returns the tag with the given handle.
    pub fn tag(&self, id: TagId) -> Result<&Tag, NbtStructureError> {
        match self.entries.get(id.index as usize) {
            Some(Entry::Occupied { generation, tag }) if *generation == id.generation => Ok(tag),
            _ => Err(NbtStructureError::invalid_handle()),
        }
    }

    fn tag_mut(&mut self, id: TagId) -> Result<&mut Tag, NbtStructureError> {
        match self.entries.get_mut(id.index as usize) {
            Some(Entry::Occupied { generation, tag }) if *generation == id.generation => Ok(tag),
            _ => Err(NbtStructureError::invalid_handle()),
        }
    }

    /// Returns the compound payload of the given tag, or an error if it is not a compound.
    pub fn compound(&self, id: TagId) -> Result<&NbtCompound, NbtStructureError> {
        match &self.tag(id)?.value {
            TagValue::Compound(compound) => Ok(compound),
            other => Err(NbtStructureError::type_mismatch(
                "Compound",
                other.tag_type().name(),
            )),
        }
    }

    fn compound_mut(&mut self, id: TagId) -> Result<&mut NbtCompound, NbtStructureError> {
        match &mut self.tag_mut(id)?.value {
            TagValue::Compound(compound) => Ok(compound),
            other => Err(NbtStructureError::type_mismatch(
                "Compound",
                other.tag_type().name(),
            )),
        }
    }

    /// Returns the list payload of the given tag, or an error if it is not a list.
    pub fn list(&self, id: TagId) -> Result<&NbtList, NbtStructureError> {
        match &self.tag(id)?.value {
            TagValue::List(list) => Ok(list),
            other => Err(NbtStructureError::type_mismatch(
                "List",
                other.tag_type().name(),
            )),
        }
    }

    fn list_mut(&mut self, id: TagId) -> Result<&mut NbtList, NbtStructureError> {
        match &mut self.tag_mut(id)?.value {
            TagValue::List(list) => Ok(list),
            other => Err(NbtStructureError::type_mismatch(
                "List",
                other.tag_type().name(),
            )),
        }
    }

    /// Returns the member of the given compound with the given name, if present.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let root = tree.create_named("root", NbtCompound::new());
    /// let hp = tree.create_named("hp", 20i16);
    /// tree.add(root, hp).unwrap();
    ///
    /// assert_eq!(tree.get(root, "hp").unwrap(), Some(hp));
    /// assert_eq!(tree.get(root, "mp").unwrap(), None);
    /// assert!(tree.get(hp, "hp").is_err()); // Not a compound
    /// ```
    pub fn get(&self, compound: TagId, name: &str) -> Result<Option<TagId>, NbtStructureError> {
        Ok(self.compound(compound)?.get(name))
    }

    /// Returns the payload of the given tag for in-place modification. Only scalar, string and array
    /// payloads are handed out; container membership must be changed through the tree.
    pub fn value_mut(&mut self, id: TagId) -> Result<&mut TagValue, NbtStructureError> {
        let tag = self.tag_mut(id)?;
        if tag.value.tag_type().is_container() {
            return Err(NbtStructureError::type_mismatch(
                "a scalar or array",
                tag.value.tag_type().name(),
            ));
        }

        Ok(&mut tag.value)
    }

    /// Replaces the payload of a scalar, string or array tag with a payload of the same type,
    /// returning the previous payload.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let tag = tree.create(TagValue::from("before"));
    ///
    /// let old = tree.set_value(tag, "after").unwrap();
    /// assert_eq!(old, TagValue::from("before"));
    /// assert!(tree.set_value(tag, 1i32).is_err()); // Type mismatch
    /// ```
    pub fn set_value<T: Into<TagValue>>(
        &mut self,
        id: TagId,
        value: T,
    ) -> Result<TagValue, NbtStructureError> {
        let value = value.into();
        let current = self.value_mut(id)?;
        if current.tag_type() != value.tag_type() {
            return Err(NbtStructureError::type_mismatch(
                current.tag_type().name(),
                value.tag_type().name(),
            ));
        }

        Ok(mem::replace(current, value))
    }

    /// Renames the given tag. If the tag is a compound member, its entry is re-keyed under the new
    /// name, which must not already be in use.
    pub fn set_name<N: Into<String>>(&mut self, id: TagId, name: N) -> Result<(), NbtStructureError> {
        let name = name.into();
        let tag = self.tag(id)?;

        match (tag.parent, tag.name.clone()) {
            (Some(parent), Some(old_name)) if self.compound(parent).is_ok() =>
                self.rename(parent, &old_name, &name),
            _ => {
                self.tag_mut(id)?.name = Some(name);
                Ok(())
            }
        }
    }

    /// Removes the name of the given tag. Compound members cannot be unnamed.
    pub fn clear_name(&mut self, id: TagId) -> Result<(), NbtStructureError> {
        self.tag(id)?;
        self.check_not_pinned(id)?;
        if let Some(parent) = self.tag(id)?.parent {
            if self.compound(parent).is_ok() {
                return Err(NbtStructureError::unnamed_in_compound());
            }
        }

        self.tag_mut(id)?.name = None;
        Ok(())
    }

    fn check_attachable(&self, container: TagId, child: TagId) -> Result<(), NbtStructureError> {
        if self.tag(child)?.parent.is_some() {
            return Err(NbtStructureError::already_parented());
        }
        self.check_not_pinned(child)?;

        // The child is detached, so it can only be an ancestor of the container if walking up from
        // the container reaches it.
        let mut current = Some(container);
        while let Some(id) = current {
            if id == child {
                return Err(NbtStructureError::cycle());
            }
            current = self.tag(id)?.parent;
        }

        Ok(())
    }

    /// Adds a detached, named tag to the given compound.
    pub fn add(&mut self, compound: TagId, child: TagId) -> Result<(), NbtStructureError> {
        self.compound(compound)?;
        self.check_attachable(compound, child)?;

        let name = self
            .tag(child)?
            .name
            .clone()
            .ok_or_else(NbtStructureError::unnamed_in_compound)?;

        let entries = &mut self.compound_mut(compound)?.entries;
        if entries.contains_key(&name) {
            return Err(NbtStructureError::duplicate_name(name));
        }
        entries.insert(name, child);

        self.tag_mut(child)?.parent = Some(compound);
        Ok(())
    }

    /// Stores a detached tag in the given compound under `name`, which must equal the tag's own
    /// name. Any member previously stored under that name is detached and returned.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let root = tree.create_named("root", NbtCompound::new());
    /// let first = tree.create_named("x", 1i32);
    /// let second = tree.create_named("x", 2i32);
    ///
    /// assert_eq!(tree.set(root, "x", first).unwrap(), None);
    /// assert_eq!(tree.set(root, "x", second).unwrap(), Some(first));
    /// assert_eq!(tree.tag(first).unwrap().parent(), None);
    /// assert!(tree.set(root, "y", first).is_err()); // Name does not match
    /// ```
    pub fn set(
        &mut self,
        compound: TagId,
        name: &str,
        child: TagId,
    ) -> Result<Option<TagId>, NbtStructureError> {
        if self.compound(compound)?.get(name) == Some(child) {
            return Ok(None);
        }

        match self.tag(child)?.name() {
            Some(child_name) if child_name == name => (),
            Some(child_name) =>
                return Err(NbtStructureError::name_mismatch(name, child_name)),
            None => return Err(NbtStructureError::unnamed_in_compound()),
        }
        self.check_attachable(compound, child)?;

        let previous = self
            .compound_mut(compound)?
            .entries
            .insert(name.to_owned(), child);
        self.tag_mut(child)?.parent = Some(compound);

        if let Some(previous) = previous {
            self.tag_mut(previous)?.parent = None;
        }

        Ok(previous)
    }

    /// Removes the member with the given name from a compound, returning its now detached handle.
    pub fn remove_named(
        &mut self,
        compound: TagId,
        name: &str,
    ) -> Result<Option<TagId>, NbtStructureError> {
        let removed = self.compound_mut(compound)?.entries.shift_remove(name);
        if let Some(removed) = removed {
            self.tag_mut(removed)?.parent = None;
        }

        Ok(removed)
    }

    /// Removes the given tag from the compound or list holding it. Returns false if `child` is not
    /// a member of `container`.
    pub fn remove(&mut self, container: TagId, child: TagId) -> Result<bool, NbtStructureError> {
        let tag = self.tag(child)?;
        if tag.parent != Some(container) {
            self.tag(container)?;
            return Ok(false);
        }
        let name = tag.name.clone();

        match &mut self.tag_mut(container)?.value {
            TagValue::Compound(compound) => {
                if let Some(name) = name {
                    compound.entries.shift_remove(&name);
                }
            }
            TagValue::List(list) => list.items.retain(|&item| item != child),
            other =>
                return Err(NbtStructureError::type_mismatch(
                    "Compound or List",
                    other.tag_type().name(),
                )),
        }

        self.tag_mut(child)?.parent = None;
        Ok(true)
    }

    /// Re-keys a compound member from `old_name` to `new_name`, preserving the member's identity and
    /// position.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let root = tree.create_named("root", NbtCompound::new());
    /// let hp = tree.create_named("hp", 1i32);
    /// tree.add(root, hp).unwrap();
    ///
    /// tree.rename(root, "hp", "health").unwrap();
    /// assert_eq!(tree.get(root, "health").unwrap(), Some(hp));
    /// assert_eq!(tree.tag(hp).unwrap().name(), Some("health"));
    /// assert!(tree.rename(root, "hp", "x").is_err()); // No longer present
    /// ```
    pub fn rename(
        &mut self,
        compound: TagId,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), NbtStructureError> {
        let entries = &mut self.compound_mut(compound)?.entries;
        let child = entries
            .get(old_name)
            .copied()
            .ok_or_else(|| NbtStructureError::missing_tag(old_name))?;

        if old_name == new_name {
            return Ok(());
        }
        if entries.contains_key(new_name) {
            return Err(NbtStructureError::duplicate_name(new_name));
        }

        *entries = mem::take(entries)
            .into_iter()
            .map(|(name, tag)| {
                if tag == child {
                    (new_name.to_owned(), tag)
                } else {
                    (name, tag)
                }
            })
            .collect();

        self.tag_mut(child)?.name = Some(new_name.to_owned());
        Ok(())
    }

    /// Detaches every member of the given compound or list, returning their handles. A list keeps
    /// its element type.
    pub fn clear(&mut self, container: TagId) -> Result<Vec<TagId>, NbtStructureError> {
        let children = match &mut self.tag_mut(container)?.value {
            TagValue::Compound(compound) => compound.entries.drain(..).map(|(_, id)| id).collect(),
            TagValue::List(list) => mem::take(&mut list.items),
            other =>
                return Err(NbtStructureError::type_mismatch(
                    "Compound or List",
                    other.tag_type().name(),
                )),
        };

        for &child in &children {
            self.tag_mut(child)?.parent = None;
        }

        Ok(children)
    }

    fn check_list_element(&self, list: TagId, child: TagId) -> Result<TagType, NbtStructureError> {
        let element_type = self.list(list)?.element_type;
        self.check_attachable(list, child)?;

        let child_type = self.tag(child)?.tag_type();
        if !self.list(list)?.accepts(child_type) {
            return Err(NbtStructureError::list_type_mismatch(
                element_type,
                child_type,
            ));
        }

        Ok(child_type)
    }

    /// Appends a detached tag to the given list. If the list's element type is not fixed yet, the
    /// tag's type becomes the element type.
    pub fn push(&mut self, list: TagId, child: TagId) -> Result<(), NbtStructureError> {
        let len = self.list(list)?.len();
        self.insert_at(list, len, child)
    }

    /// Inserts a detached tag into the given list at `index`, shifting later elements back.
    pub fn insert_at(
        &mut self,
        list: TagId,
        index: usize,
        child: TagId,
    ) -> Result<(), NbtStructureError> {
        let len = self.list(list)?.len();
        if index > len {
            return Err(NbtStructureError::invalid_index(index, len));
        }
        let child_type = self.check_list_element(list, child)?;

        let list_payload = self.list_mut(list)?;
        list_payload.element_type = child_type;
        list_payload.items.insert(index, child);

        self.tag_mut(child)?.parent = Some(list);
        Ok(())
    }

    /// Replaces the element at `index` with a detached tag of the list's element type, returning
    /// the detached previous element.
    pub fn set_at(
        &mut self,
        list: TagId,
        index: usize,
        child: TagId,
    ) -> Result<TagId, NbtStructureError> {
        let list_payload = self.list(list)?;
        let previous = list_payload
            .get(index)
            .ok_or_else(|| NbtStructureError::invalid_index(index, list_payload.len()))?;
        if previous == child {
            return Ok(child);
        }

        let element_type = list_payload.element_type;
        self.check_attachable(list, child)?;
        let child_type = self.tag(child)?.tag_type();
        if child_type != element_type {
            return Err(NbtStructureError::list_type_mismatch(
                element_type,
                child_type,
            ));
        }

        self.list_mut(list)?.items[index] = child;
        self.tag_mut(child)?.parent = Some(list);
        self.tag_mut(previous)?.parent = None;

        Ok(previous)
    }

    /// Removes the element at `index` from the given list, returning its now detached handle.
    pub fn remove_at(&mut self, list: TagId, index: usize) -> Result<TagId, NbtStructureError> {
        let list_payload = self.list_mut(list)?;
        if index >= list_payload.items.len() {
            return Err(NbtStructureError::invalid_index(
                index,
                list_payload.items.len(),
            ));
        }

        let removed = list_payload.items.remove(index);
        self.tag_mut(removed)?.parent = None;
        Ok(removed)
    }

    /// Explicitly fixes the element type of a list. This fails if the list holds elements of a
    /// different type. `End` and `Unknown` may only be set on empty lists.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let list = tree.create(NbtList::new());
    /// tree.set_list_type(list, TagType::Short).unwrap();
    ///
    /// let int = tree.create(7i32);
    /// assert!(tree.push(list, int).is_err());
    /// ```
    pub fn set_list_type(&mut self, list: TagId, element_type: TagType) -> Result<(), NbtStructureError> {
        let list_payload = self.list_mut(list)?;
        if !list_payload.items.is_empty() && list_payload.element_type != element_type {
            return Err(NbtStructureError::list_type_mismatch(
                list_payload.element_type,
                element_type,
            ));
        }

        list_payload.element_type = element_type;
        Ok(())
    }

    /// Destroys a detached tag together with everything it contains, invalidating their handles.
    pub fn free(&mut self, id: TagId) -> Result<(), NbtStructureError> {
        if self.tag(id)?.parent.is_some() {
            return Err(NbtStructureError::not_detached());
        }
        self.check_not_pinned(id)?;

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let tag = self.vacate(current)?;
            match tag.value {
                TagValue::Compound(compound) => pending.extend(compound.children()),
                TagValue::List(list) => pending.extend(list.iter()),
                _ => (),
            }
        }

        Ok(())
    }

    fn vacate(&mut self, id: TagId) -> Result<Tag, NbtStructureError> {
        self.tag(id)?;

        let index = id.index as usize;
        let entry = mem::replace(&mut self.entries[index], Entry::Vacant {
            generation: id.generation.wrapping_add(1),
            next_free: self.next_free_head,
        });
        self.next_free_head = index;
        self.len -= 1;

        match entry {
            Entry::Occupied { tag, .. } => Ok(tag),
            Entry::Vacant { .. } => Err(NbtStructureError::invalid_handle()),
        }
    }

    /// Copies the given tag and everything it contains into new, detached tags. The copy keeps the
    /// name of the original.
    pub fn deep_clone(&mut self, id: TagId) -> Result<TagId, NbtStructureError> {
        let tag = self.tag(id)?;
        let name = tag.name.clone();

        let (value, children): (TagValue, Vec<TagId>) = match &tag.value {
            TagValue::List(list) => (
                TagValue::List(NbtList::with_type(list.element_type)),
                list.items.clone(),
            ),
            TagValue::Compound(compound) => (
                TagValue::Compound(NbtCompound::new()),
                compound.children().collect(),
            ),
            leaf => (leaf.clone_leaf(), Vec::new()),
        };

        let copy = self.insert(Tag {
            name,
            parent: None,
            value,
        });
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.attach_unchecked(copy, child_copy)?;
        }

        Ok(copy)
    }

    /// Attaches a freshly created tag whose name and type are already known to be acceptable.
    pub(crate) fn attach_unchecked(
        &mut self,
        container: TagId,
        child: TagId,
    ) -> Result<(), NbtStructureError> {
        let name = self.tag(child)?.name.clone();

        match &mut self.tag_mut(container)?.value {
            TagValue::Compound(compound) => {
                let name = name.ok_or_else(NbtStructureError::unnamed_in_compound)?;
                compound.entries.insert(name, child);
            }
            TagValue::List(list) => list.items.push(child),
            other =>
                return Err(NbtStructureError::type_mismatch(
                    "Compound or List",
                    other.tag_type().name(),
                )),
        }

        self.tag_mut(child)?.parent = Some(container);
        Ok(())
    }

    /// Returns the path from the topmost ancestor to the given tag: compound members are joined
    /// with `.` and list elements are written as `[index]`.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let root = tree.create_named("root", NbtCompound::new());
    /// let tags = tree.create_named("tags", NbtList::new());
    /// let b = tree.create("b");
    /// tree.add(root, tags).unwrap();
    /// tree.push(tags, b).unwrap();
    ///
    /// assert_eq!(tree.path(b).unwrap(), "root.tags[0]");
    /// ```
    pub fn path(&self, id: TagId) -> Result<String, NbtStructureError> {
        let mut segments = Vec::new();
        let mut current = id;

        loop {
            let tag = self.tag(current)?;
            match tag.parent {
                None => {
                    segments.push(tag.name.clone().unwrap_or_default());
                    break;
                }
                Some(parent) => {
                    match &self.tag(parent)?.value {
                        TagValue::List(list) => {
                            let index = list
                                .index_of(current)
                                .ok_or_else(NbtStructureError::invalid_handle)?;
                            segments.push(format!("[{}]", index));
                        }
                        _ => segments.push(format!(".{}", tag.name().unwrap_or_default())),
                    }
                    current = parent;
                }
            }
        }

        segments.reverse();
        Ok(segments.concat())
    }

    /// Walks a relative path of member names and list indices starting at `from`, for example
    /// `"player.inventory[2].id"`. An empty path resolves to `from` itself. Names containing `.` or
    /// `[` cannot be addressed this way.
    ///
    /// ```
    /// # use ember_nbt::*;
    /// let mut tree = NbtTree::new();
    /// let root = tree.create_named("root", NbtCompound::new());
    /// let tags = tree.create_named("tags", NbtList::new());
    /// let a = tree.create("a");
    /// tree.add(root, tags).unwrap();
    /// tree.push(tags, a).unwrap();
    ///
    /// assert_eq!(tree.resolve(root, "tags[0]").unwrap(), a);
    /// assert!(tree.resolve(root, "tags[1]").is_err());
    /// assert!(tree.resolve(root, "missing").is_err());
    /// ```
    pub fn resolve(&self, from: TagId, path: &str) -> Result<TagId, NbtStructureError> {
        self.tag(from)?;
        if path.is_empty() {
            return Ok(from);
        }

        let mut current = from;
        for segment in path.split('.') {
            let (name, mut indices) = match segment.find('[') {
                Some(position) => segment.split_at(position),
                None => (segment, ""),
            };

            if !name.is_empty() {
                current = self
                    .compound(current)?
                    .get(name)
                    .ok_or_else(|| NbtStructureError::missing_tag(name))?;
            }

            while let Some(rest) = indices.strip_prefix('[') {
                let close = rest
                    .find(']')
                    .ok_or_else(|| NbtStructureError::missing_tag(segment))?;
                let index = rest[.. close]
                    .parse::<usize>()
                    .map_err(|_| NbtStructureError::missing_tag(segment))?;
                indices = &rest[close + 1 ..];

                let list = self.list(current)?;
                current = list
                    .get(index)
                    .ok_or_else(|| NbtStructureError::invalid_index(index, list.len()))?;
            }

            if !indices.is_empty() {
                return Err(NbtStructureError::missing_tag(segment));
            }
        }

        Ok(current)
    }

    /// Compares two subtrees, possibly living in different trees, by type, name, value, list order
    /// and compound membership. Compound member order and list element names are not compared, since
    /// neither is significant on the wire. Floating point values compare by bit pattern.
    pub fn structurally_eq(&self, id: TagId, other: &NbtTree, other_id: TagId) -> bool {
        match (self.tag(id), other.tag(other_id)) {
            (Ok(tag), Ok(other_tag)) =>
                tag.name == other_tag.name && self.values_eq(tag, other, other_tag),
            _ => false,
        }
    }

    fn values_eq(&self, tag: &Tag, other: &NbtTree, other_tag: &Tag) -> bool {
        match (&tag.value, &other_tag.value) {
            (TagValue::Float(a), TagValue::Float(b)) => a.to_bits() == b.to_bits(),
            (TagValue::Double(a), TagValue::Double(b)) => a.to_bits() == b.to_bits(),
            (TagValue::List(a), TagValue::List(b)) =>
                a.element_type == b.element_type
                    && a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| {
                        match (self.tag(x), other.tag(y)) {
                            (Ok(x), Ok(y)) => self.values_eq(x, other, y),
                            _ => false,
                        }
                    }),
            (TagValue::Compound(a), TagValue::Compound(b)) =>
                a.len() == b.len()
                    && a.iter().all(|(name, x)| match b.get(name) {
                        Some(y) => self.structurally_eq(x, other, y),
                        None => false,
                    }),
            (a, b) => a == b,
        }
    }
}
