use crate::camera::Camera;
use crate::lighting::{LightEngine, INITIAL_DRAIN_BUDGET};
use crate::meshing::{MesherConfig, MeshScheduler, Vertex};
use crate::physics::{raycast, MoveInput, Player};
use crate::voxel::BlockKind;
use crate::world::{terrain::TerrainGenerator, World};
use glam::{IVec2, Vec2, Vec3};
use std::sync::{Arc, RwLock};

/// Everything the platform shim feeds into one simulation tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct Input {
    pub movement: MoveInput,
    /// Mouse delta in pixels.
    pub look_delta: Vec2,
    /// Left-click edge: break the picked block.
    pub break_block: bool,
    /// Right-click edge: place `selected` against the picked face.
    pub place_block: bool,
    pub selected: BlockKind,
}

/// A finished chunk mesh leaving the core. The shim owns the buffers from
/// here on and uploads them to whatever device it renders with.
pub struct MeshUpload {
    pub coord: IVec2,
    pub opaque: Vec<Vertex>,
    pub transparent: Vec<Vertex>,
}

pub struct TickOutput {
    pub uploads: Vec<MeshUpload>,
    /// Nodes still pending in the startup sky fill; zero once settled.
    pub sky_fill_remaining: usize,
}

/// The simulation core behind a plain `tick(dt, input)` boundary.
///
/// Owns the chunk store behind the coarse reader-writer lock, the lighting
/// queues, the mesh-job scheduler, the player and the camera. Each tick:
/// physics, then edits (with their lighting updates completing before the
/// call returns), then the budgeted sky fill, then mesh-job dispatch and
/// ready-list drain.
pub struct Engine {
    world: Arc<RwLock<World>>,
    lighting: LightEngine,
    scheduler: MeshScheduler,
    pub player: Player,
    pub camera: Camera,
    clock: f32,
}

impl Engine {
    /// Generate the resident world, seed its lighting and start the worker
    /// pool.
    pub fn new(seed: u32, num_workers: usize, aspect_ratio: f32) -> Self {
        let world = World::generate(seed);
        let surface = TerrainGenerator::new(seed).surface_height(8, 8);
        let spawn = Vec3::new(8.5, (surface + 3) as f32, 8.5);
        Self::with_world(world, num_workers, aspect_ratio, spawn)
    }

    /// Build an engine around an existing store (tests use small hand-built
    /// worlds).
    pub fn with_world(
        mut world: World,
        num_workers: usize,
        aspect_ratio: f32,
        spawn: Vec3,
    ) -> Self {
        let mut lighting = LightEngine::new();
        lighting.seed_initial(&mut world);

        let world = Arc::new(RwLock::new(world));
        let scheduler = MeshScheduler::new(
            num_workers,
            Arc::clone(&world),
            MesherConfig::default(),
        );

        let player = Player::new(spawn);
        let camera = Camera::new(player.eye_position(), aspect_ratio);

        Self {
            world,
            lighting,
            scheduler,
            player,
            camera,
            clock: 0.0,
        }
    }

    pub fn world(&self) -> &Arc<RwLock<World>> {
        &self.world
    }

    /// Place or break a block, running the lighting edit protocol before
    /// returning so any mesh job dispatched afterwards sees settled light.
    pub fn set_block(&mut self, pos: glam::IVec3, kind: BlockKind) {
        let Ok(mut world) = self.world.write() else {
            return;
        };
        if let Some(previous) = world.set_block(pos, kind) {
            self.lighting.on_block_changed(&mut world, pos, previous, kind);
        }
    }

    pub fn tick(&mut self, dt: f32, input: &Input) -> TickOutput {
        self.clock += dt;
        self.camera.rotate(input.look_delta.x, input.look_delta.y);

        // Physics first: the player moves against the pre-edit world.
        {
            let Ok(world) = self.world.read() else {
                return TickOutput {
                    uploads: Vec::new(),
                    sky_fill_remaining: self.lighting.initial_pending(),
                };
            };
            self.player.update(
                &world,
                &input.movement,
                self.camera.flat_forward(),
                self.camera.flat_right(),
                dt,
                self.clock,
            );
        }
        self.camera.position = self.player.eye_position();

        // Edits: pick through the crosshair, then write block + light.
        if input.break_block || input.place_block {
            let hit = {
                match self.world.read() {
                    Ok(world) => raycast(&world, self.camera.position, self.camera.forward()),
                    Err(_) => None,
                }
            };
            if let Some(hit) = hit {
                if input.break_block {
                    self.set_block(hit.block, BlockKind::Air);
                } else if input.selected != BlockKind::Air {
                    self.set_block(hit.adjacent, input.selected);
                }
            }
        }

        let mut uploads = Vec::new();
        let sky_fill_remaining;
        {
            let Ok(mut world) = self.world.write() else {
                return TickOutput {
                    uploads,
                    sky_fill_remaining: self.lighting.initial_pending(),
                };
            };

            // Keep the startup sky fill flowing without stalling the tick.
            self.lighting.drain_initial(&mut world, INITIAL_DRAIN_BUDGET);
            sky_fill_remaining = self.lighting.initial_pending();

            // Dispatch mesher jobs for chunks awaiting a remesh.
            let dirty: Vec<IVec2> = world.iter_dirty().collect();
            for coord in dirty {
                if self.scheduler.dispatch(coord) {
                    if let Some(chunk) = world.chunk_mut(coord) {
                        chunk.building = true;
                        chunk.dirty_mesh = false;
                    }
                } else {
                    // Pool saturated; the chunk stays dirty for next tick.
                    break;
                }
            }

            // Publish finished jobs and hand the buffers to the shim.
            for output in self.scheduler.drain_ready() {
                if let Some(chunk) = world.chunk_mut(output.coord) {
                    chunk.building = false;
                }
                uploads.push(MeshUpload {
                    coord: output.coord,
                    opaque: output.mesh.opaque,
                    transparent: output.mesh.transparent,
                });
            }
        }

        TickOutput {
            uploads,
            sky_fill_remaining,
        }
    }
}
