use super::domain::{AllocationResult, Subject};
use super::strategy::AllocationBatch;

/// Restartable cursor over a borrowed snapshot.
///
/// The cursor borrows its backing slice, so the collection cannot be mutated
/// while any cursor over it is alive. Create a new cursor after mutating.
///
/// The position sits between elements: `next` yields the element after it
/// and `previous` the element before it.
#[derive(Debug, Clone)]
pub struct Cursor<'a, T> {
    items: &'a [T],
    position: usize,
}

impl<'a, T> Cursor<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self { items, position: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.items.len()
    }

    pub fn has_previous(&self) -> bool {
        self.position > 0
    }

    pub fn previous(&mut self) -> Option<&'a T> {
        if !self.has_previous() {
            return None;
        }
        self.position -= 1;
        self.items.get(self.position)
    }

    pub fn move_to_first(&mut self) {
        self.position = 0;
    }

    /// Position the cursor so the following `next` yields the last element.
    pub fn move_to_last(&mut self) {
        self.position = self.items.len().saturating_sub(1);
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.position
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.position)?;
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Cursor<'_, T> {}

/// Collections that hand out independent cursors over their contents.
pub trait Traversable {
    type Item;

    fn cursor(&self) -> Cursor<'_, Self::Item>;
}

impl Traversable for AllocationBatch {
    type Item = AllocationResult;

    fn cursor(&self) -> Cursor<'_, AllocationResult> {
        Cursor::new(self.results())
    }
}

impl<T> Traversable for [T] {
    type Item = T;

    fn cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self)
    }
}

impl<T> Traversable for Vec<T> {
    type Item = T;

    fn cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice())
    }
}

/// Current members of one department, in the order they were registered.
#[derive(Debug, Clone)]
pub struct DepartmentRoster<'a> {
    name: String,
    members: Vec<&'a Subject>,
}

impl<'a> DepartmentRoster<'a> {
    pub fn new(name: impl Into<String>, subjects: &'a [Subject]) -> Self {
        let name = name.into();
        let members = subjects
            .iter()
            .filter(|subject| subject.in_department(&name))
            .collect();
        Self { name, members }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> Traversable for DepartmentRoster<'a> {
    type Item = &'a Subject;

    fn cursor(&self) -> Cursor<'_, &'a Subject> {
        Cursor::new(&self.members)
    }
}
