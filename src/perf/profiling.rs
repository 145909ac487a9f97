/// Instrumentation infrastructure: function call counting and optional
/// hardware performance counter integration.
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for the engine's hot paths.
pub struct FunctionCounters {
    // Meshing counters
    pub mesh_chunk_calls: AtomicU64,
    pub faces_emitted: AtomicU64,

    // Lighting counters
    pub light_propagation_pops: AtomicU64,
    pub light_removal_pops: AtomicU64,

    // Physics counters
    pub raycast_steps: AtomicU64,

    // Rasterization counters
    pub render_triangle_calls: AtomicU64,
    pub render_triangle_culled: AtomicU64,
    pub set_pixel_attempts: AtomicU64,
    pub set_pixel_depth_passed: AtomicU64,
    pub set_pixel_depth_failed: AtomicU64,
    pub framebuffer_clear_calls: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            mesh_chunk_calls: AtomicU64::new(0),
            faces_emitted: AtomicU64::new(0),
            light_propagation_pops: AtomicU64::new(0),
            light_removal_pops: AtomicU64::new(0),
            raycast_steps: AtomicU64::new(0),
            render_triangle_calls: AtomicU64::new(0),
            render_triangle_culled: AtomicU64::new(0),
            set_pixel_attempts: AtomicU64::new(0),
            set_pixel_depth_passed: AtomicU64::new(0),
            set_pixel_depth_failed: AtomicU64::new(0),
            framebuffer_clear_calls: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.mesh_chunk_calls.store(0, Ordering::Relaxed);
        self.faces_emitted.store(0, Ordering::Relaxed);
        self.light_propagation_pops.store(0, Ordering::Relaxed);
        self.light_removal_pops.store(0, Ordering::Relaxed);
        self.raycast_steps.store(0, Ordering::Relaxed);
        self.render_triangle_calls.store(0, Ordering::Relaxed);
        self.render_triangle_culled.store(0, Ordering::Relaxed);
        self.set_pixel_attempts.store(0, Ordering::Relaxed);
        self.set_pixel_depth_passed.store(0, Ordering::Relaxed);
        self.set_pixel_depth_failed.store(0, Ordering::Relaxed);
        self.framebuffer_clear_calls.store(0, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            mesh_chunk_calls: self.mesh_chunk_calls.load(Ordering::Relaxed),
            faces_emitted: self.faces_emitted.load(Ordering::Relaxed),
            light_propagation_pops: self.light_propagation_pops.load(Ordering::Relaxed),
            light_removal_pops: self.light_removal_pops.load(Ordering::Relaxed),
            raycast_steps: self.raycast_steps.load(Ordering::Relaxed),
            render_triangle_calls: self.render_triangle_calls.load(Ordering::Relaxed),
            render_triangle_culled: self.render_triangle_culled.load(Ordering::Relaxed),
            set_pixel_attempts: self.set_pixel_attempts.load(Ordering::Relaxed),
            set_pixel_depth_passed: self.set_pixel_depth_passed.load(Ordering::Relaxed),
            set_pixel_depth_failed: self.set_pixel_depth_failed.load(Ordering::Relaxed),
            framebuffer_clear_calls: self.framebuffer_clear_calls.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy)]
pub struct CounterSnapshot {
    pub mesh_chunk_calls: u64,
    pub faces_emitted: u64,
    pub light_propagation_pops: u64,
    pub light_removal_pops: u64,
    pub raycast_steps: u64,
    pub render_triangle_calls: u64,
    pub render_triangle_culled: u64,
    pub set_pixel_attempts: u64,
    pub set_pixel_depth_passed: u64,
    pub set_pixel_depth_failed: u64,
    pub framebuffer_clear_calls: u64,
}

impl CounterSnapshot {
    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Performance Counters Report ===");
        println!("\nMeshing:");
        println!("  mesh_chunk calls:           {:12}", self.mesh_chunk_calls);
        println!("  faces emitted:              {:12}", self.faces_emitted);

        println!("\nLighting:");
        println!("  propagation pops:           {:12}", self.light_propagation_pops);
        println!("  removal pops:               {:12}", self.light_removal_pops);

        println!("\nPhysics:");
        println!("  raycast steps:              {:12}", self.raycast_steps);

        println!("\nRasterization:");
        println!("  render_triangle calls:      {:12}", self.render_triangle_calls);
        println!("  triangles culled:           {:12}", self.render_triangle_culled);
        println!("  set_pixel attempts:         {:12}", self.set_pixel_attempts);
        println!("  depth test passed:          {:12}", self.set_pixel_depth_passed);
        println!("  depth test failed:          {:12}", self.set_pixel_depth_failed);
        if self.set_pixel_attempts > 0 {
            let pass_rate =
                (self.set_pixel_depth_passed as f64 / self.set_pixel_attempts as f64) * 100.0;
            println!("  depth test pass rate:       {:11.2}%", pass_rate);
        }
        println!("  framebuffer clear calls:    {:12}", self.framebuffer_clear_calls);

        println!();
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Hardware performance counter wrapper for benchmarking
#[cfg(feature = "profiling")]
pub mod hardware {
    use perf_event::{Builder, Counter};

    pub struct PerfCounters {
        pub cpu_cycles: Option<Counter>,
        pub instructions: Option<Counter>,
        pub cache_references: Option<Counter>,
        pub cache_misses: Option<Counter>,
    }

    impl PerfCounters {
        pub fn new() -> Self {
            Self {
                cpu_cycles: Builder::new()
                    .kind(perf_event::events::Hardware::CPU_CYCLES)
                    .build()
                    .ok(),
                instructions: Builder::new()
                    .kind(perf_event::events::Hardware::INSTRUCTIONS)
                    .build()
                    .ok(),
                cache_references: Builder::new()
                    .kind(perf_event::events::Hardware::CACHE_REFERENCES)
                    .build()
                    .ok(),
                cache_misses: Builder::new()
                    .kind(perf_event::events::Hardware::CACHE_MISSES)
                    .build()
                    .ok(),
            }
        }

        pub fn enable_all(&mut self) {
            if let Some(ref mut c) = self.cpu_cycles {
                let _ = c.enable();
            }
            if let Some(ref mut c) = self.instructions {
                let _ = c.enable();
            }
            if let Some(ref mut c) = self.cache_references {
                let _ = c.enable();
            }
            if let Some(ref mut c) = self.cache_misses {
                let _ = c.enable();
            }
        }

        pub fn read_all(&mut self) -> PerfSnapshot {
            PerfSnapshot {
                cpu_cycles: self
                    .cpu_cycles
                    .as_mut()
                    .and_then(|c| c.read().ok())
                    .unwrap_or(0),
                instructions: self
                    .instructions
                    .as_mut()
                    .and_then(|c| c.read().ok())
                    .unwrap_or(0),
                cache_references: self
                    .cache_references
                    .as_mut()
                    .and_then(|c| c.read().ok())
                    .unwrap_or(0),
                cache_misses: self
                    .cache_misses
                    .as_mut()
                    .and_then(|c| c.read().ok())
                    .unwrap_or(0),
            }
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub struct PerfSnapshot {
        pub cpu_cycles: u64,
        pub instructions: u64,
        pub cache_references: u64,
        pub cache_misses: u64,
    }

    impl PerfSnapshot {
        pub fn print_report(&self) {
            println!("\n=== Hardware Performance Counters ===");
            println!("CPU Cycles:            {:16}", self.cpu_cycles);
            println!("Instructions:          {:16}", self.instructions);
            if self.cpu_cycles > 0 {
                let ipc = self.instructions as f64 / self.cpu_cycles as f64;
                println!("IPC (Instructions/Cycle): {:13.3}", ipc);
            }
            println!("Cache References:      {:16}", self.cache_references);
            println!("Cache Misses:          {:16}", self.cache_misses);
            println!();
        }
    }
}
