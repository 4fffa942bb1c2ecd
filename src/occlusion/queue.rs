/// Double-buffered FIFO work queues for layered breadth-first traversal
///
/// One buffer is drained while the other collects the next layer's work, then
/// the roles swap. Both buffers keep their allocations across layers and
/// frames; a traversal that touches the same number of sections every frame
/// settles into zero queue allocation.
pub struct SearchQueue<T> {
    entries: Vec<T>,
    head: usize,
}

impl<T: Copy> SearchQueue<T> {
    pub fn new() -> SearchQueue<T> {
        SearchQueue {
            entries: Vec::new(),
            head: 0,
        }
    }

    #[inline]
    pub fn enqueue(&mut self, value: T) {
        self.entries.push(value);
    }

    /// Pop in insertion order. Entries stay in the backing buffer until the
    /// next clear so dequeueing is a cursor bump, not a shift.
    #[inline]
    pub fn dequeue(&mut self) -> Option<T> {
        let value = self.entries.get(self.head).copied()?;
        self.head += 1;
        Some(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len() - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head >= self.entries.len()
    }

    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Drop all entries but keep the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = 0;
    }
}

pub struct DoubleBufferedQueue<T> {
    buffers: [SearchQueue<T>; 2],
    read_index: usize,
}

impl<T: Copy> DoubleBufferedQueue<T> {
    pub fn new() -> DoubleBufferedQueue<T> {
        DoubleBufferedQueue {
            buffers: [SearchQueue::new(), SearchQueue::new()],
            read_index: 0,
        }
    }

    /// Empty both buffers; the start of a frame's traversal
    pub fn reset(&mut self) {
        self.buffers[0].clear();
        self.buffers[1].clear();
    }

    /// The buffer collecting the next layer's work
    #[inline]
    pub fn write(&mut self) -> &mut SearchQueue<T> {
        &mut self.buffers[self.read_index ^ 1]
    }

    /// The buffer being drained this layer
    #[inline]
    pub fn read(&mut self) -> &mut SearchQueue<T> {
        &mut self.buffers[self.read_index]
    }

    /// Both sides at once, for a drain loop that also appends
    pub fn split_mut(&mut self) -> (&mut SearchQueue<T>, &mut SearchQueue<T>) {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.read_index == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        }
    }

    /// Swap the buffer roles and clear the new write side. Returns true when
    /// the new read side has work, i.e. another layer must run.
    pub fn flip(&mut self) -> bool {
        self.read_index ^= 1;
        let (read, write) = self.split_mut();
        write.clear();
        !read.is_empty()
    }
}
