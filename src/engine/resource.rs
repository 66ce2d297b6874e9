//! `resource(capacity)`: a counted semaphore with a FIFO wait queue.

use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::model::VehicleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub usize);

struct ResourceState {
    capacity: i64,
    in_use: i64,
    queue: VecDeque<VehicleId>,
}

/// Owns every resource created during setup. A resource's identity never
/// changes after creation (locations are immutable once `run` starts).
#[derive(Default)]
pub struct ResourceTable {
    resources: Vec<ResourceState>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, capacity: i64) -> Result<ResourceId, ConfigError> {
        if capacity < 1 {
            return Err(ConfigError::InvalidResourceCapacity(capacity));
        }
        let id = ResourceId(self.resources.len());
        self.resources.push(ResourceState {
            capacity,
            in_use: 0,
            queue: VecDeque::new(),
        });
        Ok(id)
    }

    /// Attempts to acquire a slot. Returns `true` if the caller may
    /// proceed immediately; `false` if it was enqueued FIFO and must wait
    /// for a matching `release`. A slot is only granted immediately when
    /// the queue is empty *and* capacity remains, so a later arrival can
    /// never jump an earlier, still-waiting one even if capacity is free.
    pub fn try_acquire(&mut self, id: ResourceId, vehicle: VehicleId) -> bool {
        let r = &mut self.resources[id.0];
        if r.queue.is_empty() && r.in_use < r.capacity {
            r.in_use += 1;
            true
        } else {
            r.queue.push_back(vehicle);
            false
        }
    }

    /// Frees the caller's slot and, if anyone is waiting, hands it to the
    /// queue head at the current instant.
    pub fn release(&mut self, id: ResourceId) -> Option<VehicleId> {
        let r = &mut self.resources[id.0];
        r.in_use -= 1;
        match r.queue.pop_front() {
            Some(next) => {
                r.in_use += 1;
                Some(next)
            }
            None => None,
        }
    }

    /// Dequeues a pending request without affecting any other waiter.
    pub fn cancel_pending(&mut self, id: ResourceId, vehicle: &VehicleId) {
        let r = &mut self.resources[id.0];
        r.queue.retain(|v| v != vehicle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_up_to_capacity_then_queues() {
        let mut table = ResourceTable::new();
        let res = table.create(1).unwrap();
        let v1 = VehicleId::from("V1");
        let v2 = VehicleId::from("V2");
        assert!(table.try_acquire(res, v1.clone()));
        assert!(!table.try_acquire(res, v2.clone()));
        assert_eq!(table.release(res), Some(v2));
        assert_eq!(table.release(res), None);
    }

    #[test]
    fn rejects_nonpositive_capacity() {
        let mut table = ResourceTable::new();
        assert!(matches!(
            table.create(0),
            Err(ConfigError::InvalidResourceCapacity(0))
        ));
    }
}
