use super::culled::{CulledMesher, MesherConfig};
use super::mesh::ChunkMeshData;
use crate::world::World;
use glam::IVec2;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

/// A finished mesher job, waiting on the ready list for the simulation
/// thread to publish and upload it.
pub struct MeshOutput {
    pub coord: IVec2,
    pub mesh: ChunkMeshData,
    worker: usize,
}

struct MeshJob {
    coord: IVec2,
    worker: usize,
}

struct WorkerChannel {
    sender: Sender<MeshJob>,
    in_flight: usize,
    _handle: JoinHandle<()>,
}

/// One job per worker at a time; chunks left over simply stay dirty and get
/// picked up by a later scan.
const MAX_JOBS_IN_FLIGHT: usize = 1;

/// Runs mesher jobs on a pool of worker threads.
///
/// Dispatch is round-robin over per-worker channels; jobs read the world
/// under the store's read lock and only ever produce CPU-side vertex
/// buffers, which land on a mutex-guarded ready list. The simulation thread
/// drains that list once per tick, so no GPU resource is ever touched off
/// the render thread.
pub struct MeshScheduler {
    workers: Vec<WorkerChannel>,
    ready: Arc<Mutex<Vec<MeshOutput>>>,
    next_worker: usize,
}

impl MeshScheduler {
    pub fn new(num_workers: usize, world: Arc<RwLock<World>>, config: MesherConfig) -> Self {
        let num_workers = num_workers.max(1);
        let ready = Arc::new(Mutex::new(Vec::new()));
        let mut workers = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (sender, receiver) = channel::<MeshJob>();
            let world = Arc::clone(&world);
            let ready = Arc::clone(&ready);

            let handle = thread::spawn(move || {
                while let Ok(job) = receiver.recv() {
                    let mesh = {
                        let Ok(guard) = world.read() else {
                            break;
                        };
                        CulledMesher::mesh_chunk(&guard, job.coord, &config)
                    };
                    let output = MeshOutput {
                        coord: job.coord,
                        mesh,
                        worker: job.worker,
                    };
                    let Ok(mut list) = ready.lock() else {
                        break;
                    };
                    list.push(output);
                }
            });

            workers.push(WorkerChannel {
                sender,
                in_flight: 0,
                _handle: handle,
            });
        }

        log::info!("mesh scheduler running with {num_workers} workers");
        Self {
            workers,
            ready,
            next_worker: 0,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Hand a chunk to an idle worker. Returns false when every worker is
    /// saturated; the caller leaves the chunk dirty and retries next tick.
    pub fn dispatch(&mut self, coord: IVec2) -> bool {
        let count = self.workers.len();
        for probe in 0..count {
            let index = (self.next_worker + probe) % count;
            let worker = &mut self.workers[index];
            if worker.in_flight >= MAX_JOBS_IN_FLIGHT {
                continue;
            }
            if worker
                .sender
                .send(MeshJob {
                    coord,
                    worker: index,
                })
                .is_ok()
            {
                worker.in_flight += 1;
                self.next_worker = (index + 1) % count;
                return true;
            }
        }
        false
    }

    /// Take everything off the ready list. Called once per tick on the
    /// simulation thread.
    pub fn drain_ready(&mut self) -> Vec<MeshOutput> {
        let outputs = match self.ready.lock() {
            Ok(mut list) => std::mem::take(&mut *list),
            Err(_) => Vec::new(),
        };
        for output in &outputs {
            if let Some(worker) = self.workers.get_mut(output.worker) {
                worker.in_flight = worker.in_flight.saturating_sub(1);
            }
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{BlockKind, Chunk};
    use glam::IVec3;
    use std::time::{Duration, Instant};

    fn wait_for_outputs(scheduler: &mut MeshScheduler, expected: usize) -> Vec<MeshOutput> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outputs = Vec::new();
        while outputs.len() < expected && Instant::now() < deadline {
            outputs.extend(scheduler.drain_ready());
            thread::sleep(Duration::from_millis(1));
        }
        outputs
    }

    #[test]
    fn job_round_trip_produces_a_mesh() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(IVec2::ZERO));
        world.set_block(IVec3::new(4, 10, 4), BlockKind::Stone);
        let world = Arc::new(RwLock::new(world));

        let mut scheduler = MeshScheduler::new(1, world, MesherConfig::default());
        assert!(scheduler.dispatch(IVec2::ZERO));

        let outputs = wait_for_outputs(&mut scheduler, 1);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].coord, IVec2::ZERO);
        assert_eq!(outputs[0].mesh.opaque.len(), 36);
    }

    #[test]
    fn saturated_pool_rejects_extra_jobs_until_drained() {
        let world = Arc::new(RwLock::new({
            let mut world = World::new();
            world.insert_chunk(Chunk::new(IVec2::ZERO));
            world.insert_chunk(Chunk::new(IVec2::new(1, 0)));
            world
        }));

        let mut scheduler = MeshScheduler::new(1, world, MesherConfig::default());
        assert!(scheduler.dispatch(IVec2::ZERO));
        // Single worker, in-flight cap of one: the slot frees only when the
        // result is drained, so a second dispatch must be refused now.
        assert!(!scheduler.dispatch(IVec2::new(1, 0)));

        let outputs = wait_for_outputs(&mut scheduler, 1);
        assert!(!outputs.is_empty());
        assert!(scheduler.dispatch(IVec2::new(1, 0)));
        wait_for_outputs(&mut scheduler, 1);
    }
}
