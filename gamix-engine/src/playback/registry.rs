//! Playback registry: singly linked list of playing instances in a slot pool
//!
//! All slots are allocated up front. Slot 0 is a permanent sentinel heading
//! the play list; it is never played and never freed. Vacant slots are
//! chained through the same `next` links into a free list, so neither
//! insertion nor removal touches the allocator.
//!
//! Insertion appends at the tail. Removal only happens from inside a full
//! traversal via [`PlaybackRegistry::unlink_after`], which lets the walker
//! keep a trailing `previous` slot instead of restarting from the head.

use super::instance::PlaybackInstance;

/// Index of a registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// Head of the play list
pub const SENTINEL: SlotId = SlotId(0);

#[derive(Debug, Default)]
struct Slot {
    instance: Option<PlaybackInstance>,
    next: Option<SlotId>,
}

/// Fixed-capacity intrusive list of playback instances
#[derive(Debug)]
pub struct PlaybackRegistry {
    slots: Vec<Slot>,
    free_head: Option<SlotId>,
    len: usize,
}

impl PlaybackRegistry {
    /// Preallocate `capacity` playable slots plus the sentinel
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(Slot::default());
        for index in 1..=capacity {
            slots.push(Slot {
                instance: None,
                next: (index < capacity).then_some(SlotId(index + 1)),
            });
        }

        Self {
            slots,
            free_head: (capacity > 0).then_some(SlotId(1)),
            len: 0,
        }
    }

    /// Playable slots (sentinel excluded)
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Linked instances (sentinel excluded)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }

    /// Append an instance at the tail
    ///
    /// Hands the instance back when every slot is taken.
    pub fn insert(&mut self, instance: PlaybackInstance) -> Result<SlotId, PlaybackInstance> {
        let Some(id) = self.free_head else {
            return Err(instance);
        };

        self.free_head = self.slots[id.0].next;
        self.slots[id.0] = Slot {
            instance: Some(instance),
            next: None,
        };

        // Linear walk to the tail; the list is a few dozen entries at most
        let mut tail = SENTINEL;
        while let Some(next) = self.slots[tail.0].next {
            tail = next;
        }
        self.slots[tail.0].next = Some(id);
        self.len += 1;

        Ok(id)
    }

    /// Slot following `id` in play order
    pub fn successor(&self, id: SlotId) -> Option<SlotId> {
        self.slots[id.0].next
    }

    pub fn get(&self, id: SlotId) -> Option<&PlaybackInstance> {
        self.slots.get(id.0)?.instance.as_ref()
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut PlaybackInstance> {
        self.slots.get_mut(id.0)?.instance.as_mut()
    }

    /// Remove the node after `previous`, relinking `previous` to its successor
    ///
    /// The freed slot goes back on the free list. `previous` itself is not
    /// touched, so a walker continues with `successor(previous)`.
    pub fn unlink_after(&mut self, previous: SlotId) -> Option<PlaybackInstance> {
        let target = self.slots[previous.0].next?;

        self.slots[previous.0].next = self.slots[target.0].next;
        self.slots[target.0].next = self.free_head;
        self.free_head = Some(target);
        self.len -= 1;

        self.slots[target.0].instance.take()
    }

    /// Instances in play order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            current: self.successor(SENTINEL),
        }
    }

    /// Visit every instance in play order
    pub fn for_each_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut PlaybackInstance),
    {
        let mut current = self.successor(SENTINEL);
        while let Some(id) = current {
            if let Some(instance) = self.slots[id.0].instance.as_mut() {
                visit(instance);
            }
            current = self.slots[id.0].next;
        }
    }

    /// Unlink every instance, front to back
    pub fn clear<F>(&mut self, mut release: F)
    where
        F: FnMut(PlaybackInstance),
    {
        while let Some(instance) = self.unlink_after(SENTINEL) {
            release(instance);
        }
    }
}

/// Iterator over linked instances
pub struct Iter<'a> {
    registry: &'a PlaybackRegistry,
    current: Option<SlotId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PlaybackInstance;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.registry.successor(id);
        self.registry.get(id)
    }
}
