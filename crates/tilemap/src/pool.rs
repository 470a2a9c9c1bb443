//! Fixed-capacity vertex arena with chained allocation.
//!
//! Every tile owns a singly linked chain of vertices threaded through the
//! `next` field of the arena slots. Free slots are recognised by their
//! ambient value (`VERTEX_UNUSED`); a rotating scan cursor keeps typical
//! allocations close to O(1).

use tracing::{trace, warn};

use crate::constants::{CHAINEND, VERTEX_FRESH, VERTEX_UNUSED};
use crate::types::{Vertex, VertexId};

/// Errors that can occur while allocating vertex chains
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("Vertex pool exhausted: requested {requested}, {available} free")]
    Exhausted { requested: usize, available: usize },
    #[error("Invalid chain length: {0}")]
    InvalidChainLength(usize),
}

/// Arena of mesh vertices
#[derive(Debug, Clone)]
pub struct VertexPool {
    vertices: Vec<Vertex>,
    free_count: usize,
    cursor: usize,
}

impl VertexPool {
    /// Create a pool with every slot free
    pub fn new(capacity: usize) -> Self {
        Self {
            vertices: vec![Vertex::default(); capacity],
            free_count: capacity,
            cursor: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Number of slots currently available for allocation
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    #[inline]
    pub fn used_count(&self) -> usize {
        self.vertices.len() - self.free_count
    }

    /// Position of the rotating scan cursor
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Raw view of every slot, free or not
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.index())
    }

    /// True if `id` is in range and currently allocated
    #[inline]
    pub fn is_live(&self, id: VertexId) -> bool {
        self.vertex(id).is_some_and(|v| !v.is_unused())
    }

    /// Advance the cursor to the next free slot.
    ///
    /// Returns `None` without scanning when the free counter is empty, or
    /// after one full lap of the arena found nothing.
    pub fn find_free_vertex(&mut self) -> Option<VertexId> {
        if self.free_count == 0 || self.vertices.is_empty() {
            return None;
        }

        let capacity = self.vertices.len();
        for _ in 0..capacity {
            let index = self.cursor;
            self.cursor = (self.cursor + 1) % capacity;
            if self.vertices[index].is_unused() {
                return Some(VertexId(index as u32));
            }
        }
        None
    }

    /// Allocate `count` vertices linked into one chain.
    ///
    /// The chain is terminated by `CHAINEND` and every member gets the
    /// provisional ambient `VERTEX_FRESH`. On failure the pool is restored
    /// exactly (slots, free counter and cursor).
    pub fn allocate_chain(&mut self, count: usize) -> Result<VertexId, PoolError> {
        if count == 0 {
            return Err(PoolError::InvalidChainLength(count));
        }
        if count > self.free_count {
            warn!(
                "allocate_chain: need {} vertices, only {} free",
                count, self.free_count
            );
            return Err(PoolError::Exhausted {
                requested: count,
                available: self.free_count,
            });
        }

        let saved_cursor = self.cursor;
        let saved_free = self.free_count;
        let mut touched: Vec<(VertexId, Vertex)> = Vec::with_capacity(count);
        let mut previous: Option<VertexId> = None;

        for _ in 0..count {
            let Some(id) = self.find_free_vertex() else {
                // Free counter disagreed with the slots; undo everything
                for (id, original) in touched.iter().rev() {
                    self.vertices[id.index()] = *original;
                }
                self.cursor = saved_cursor;
                self.free_count = saved_free;
                warn!(
                    "allocate_chain: free counter said {} but scan found fewer; rolled back",
                    saved_free
                );
                return Err(PoolError::Exhausted {
                    requested: count,
                    available: saved_free,
                });
            };

            touched.push((id, self.vertices[id.index()]));
            let vertex = &mut self.vertices[id.index()];
            vertex.ambient = VERTEX_FRESH;
            vertex.next = CHAINEND;

            if let Some(prev) = previous {
                self.vertices[prev.index()].next = id.0;
            }
            previous = Some(id);
            self.free_count -= 1;
        }

        let first = touched[0].0;
        trace!("allocate_chain: {} vertices starting at {:?}", count, first);
        Ok(first)
    }

    /// Return up to `count` chained vertices to the free state.
    ///
    /// Stops early at `CHAINEND` or at a vertex that is already free, so a
    /// double release cannot corrupt the free counter. Returns how many
    /// vertices were released.
    pub fn release(&mut self, first: VertexId, count: usize) -> usize {
        let mut current = first.0;
        let mut released = 0;

        while released < count && current != CHAINEND {
            let Some(vertex) = self.vertices.get_mut(current as usize) else {
                warn!("release: chain points outside the pool at {}", current);
                break;
            };
            if vertex.is_unused() {
                warn!("release: vertex {} already free, chain walk stopped", current);
                break;
            }

            let next = vertex.next;
            vertex.ambient = VERTEX_UNUSED;
            vertex.next = CHAINEND;
            self.free_count += 1;
            released += 1;
            current = next;
        }

        released
    }

    /// Iterate a chain for at most `count` steps.
    ///
    /// Iteration ends early at `CHAINEND` or at a free slot (a broken chain).
    pub fn chain(&self, first: VertexId, count: usize) -> ChainIter<'_> {
        ChainIter {
            pool: self,
            current: first.0,
            remaining: count,
        }
    }

    /// The `n`-th vertex of a chain of length `count`
    pub fn chain_nth(&self, first: VertexId, count: usize, n: usize) -> Option<VertexId> {
        if n >= count {
            return None;
        }
        self.chain(first, count).nth(n)
    }

    /// Verify the free counter against the slots.
    pub fn validate_free_count(&self) -> Result<(), String> {
        let unused = self.vertices.iter().filter(|v| v.is_unused()).count();
        if unused != self.free_count {
            return Err(format!(
                "free counter {} disagrees with {} unused slots",
                self.free_count, unused
            ));
        }
        Ok(())
    }
}

/// Iterator over one tile's vertex chain
pub struct ChainIter<'a> {
    pool: &'a VertexPool,
    current: u32,
    remaining: usize,
}

impl Iterator for ChainIter<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        if self.remaining == 0 || self.current == CHAINEND {
            return None;
        }
        let vertex = self.pool.vertices.get(self.current as usize)?;
        if vertex.is_unused() {
            return None;
        }
        let id = VertexId(self.current);
        self.current = vertex.next;
        self.remaining -= 1;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_links_chain() {
        let mut pool = VertexPool::new(8);
        let first = pool.allocate_chain(3).unwrap();

        let chain: Vec<_> = pool.chain(first, 3).collect();
        assert_eq!(chain.len(), 3);
        assert_eq!(pool.free_count(), 5);
        for id in &chain {
            assert_eq!(pool.vertex(*id).unwrap().ambient, VERTEX_FRESH);
        }
        let last = pool.vertex(chain[2]).unwrap();
        assert_eq!(last.next(), None);
        assert!(pool.validate_free_count().is_ok());
    }

    #[test]
    fn test_release_returns_vertices() {
        let mut pool = VertexPool::new(8);
        let first = pool.allocate_chain(4).unwrap();
        assert_eq!(pool.release(first, 4), 4);
        assert_eq!(pool.free_count(), 8);
        assert!(pool.vertices().iter().all(|v| v.is_unused()));
    }

    #[test]
    fn test_double_release_is_harmless() {
        let mut pool = VertexPool::new(8);
        let first = pool.allocate_chain(2).unwrap();
        assert_eq!(pool.release(first, 2), 2);
        assert_eq!(pool.release(first, 2), 0);
        assert_eq!(pool.free_count(), 8);
        assert!(pool.validate_free_count().is_ok());
    }

    #[test]
    fn test_failed_allocation_leaves_pool_untouched() {
        let mut pool = VertexPool::new(7);
        pool.allocate_chain(4).unwrap();
        let before = pool.clone();

        let err = pool.allocate_chain(4).unwrap_err();
        assert_eq!(
            err,
            PoolError::Exhausted {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.cursor(), before.cursor());
        assert_eq!(pool.vertices(), before.vertices());
    }

    #[test]
    fn test_rollback_when_counter_lies() {
        let mut pool = VertexPool::new(4);
        pool.allocate_chain(2).unwrap();
        // Corrupt the counter so the fast path lets the scan run
        pool.free_count = 3;
        let cursor = pool.cursor();
        let slots = pool.vertices().to_vec();

        assert!(pool.allocate_chain(3).is_err());
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.cursor(), cursor);
        assert_eq!(pool.vertices(), &slots[..]);
    }

    #[test]
    fn test_cursor_wraps_around() {
        let mut pool = VertexPool::new(4);
        let a = pool.allocate_chain(3).unwrap();
        pool.release(a, 3);
        // Cursor sits at 3; the next chain wraps to reuse slot 0
        let b = pool.allocate_chain(2).unwrap();
        let chain: Vec<_> = pool.chain(b, 2).collect();
        assert_eq!(chain, vec![VertexId(3), VertexId(0)]);
    }

    #[test]
    fn test_find_free_fast_path() {
        let mut pool = VertexPool::new(2);
        pool.allocate_chain(2).unwrap();
        let cursor = pool.cursor();
        assert_eq!(pool.find_free_vertex(), None);
        assert_eq!(pool.cursor(), cursor);
    }

    #[test]
    fn test_zero_length_chain_rejected() {
        let mut pool = VertexPool::new(2);
        assert_eq!(pool.allocate_chain(0), Err(PoolError::InvalidChainLength(0)));
    }

    #[test]
    fn test_conservation_over_mixed_operations() {
        let mut pool = VertexPool::new(32);
        let mut live: Vec<(VertexId, usize)> = Vec::new();
        for (step, count) in [4usize, 6, 3, 16, 5, 2].into_iter().enumerate() {
            if step % 3 == 2 && !live.is_empty() {
                let (first, len) = live.remove(0);
                pool.release(first, len);
            }
            if let Ok(first) = pool.allocate_chain(count) {
                live.push((first, count));
            }
            let held: usize = live.iter().map(|(_, len)| len).sum();
            assert_eq!(pool.free_count() + held, pool.capacity());
            assert!(pool.validate_free_count().is_ok());
        }
    }
}
