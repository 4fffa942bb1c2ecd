/// Instrumentation and profiling infrastructure for traversal tuning
/// Provides function call counting and hardware performance counter integration
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe performance counters for traversal call tracking
pub struct FunctionCounters {
    // Traversal counters
    pub find_visible_calls: AtomicU64,
    pub layers_processed: AtomicU64,
    pub sections_visited: AtomicU64,
    pub sections_culled: AtomicU64,

    // Graph expansion counters
    pub neighbor_visits: AtomicU64,
    pub sections_enqueued: AtomicU64,
    pub sections_dequeued: AtomicU64,

    // Seeding counters
    pub spiral_probes: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            find_visible_calls: AtomicU64::new(0),
            layers_processed: AtomicU64::new(0),
            sections_visited: AtomicU64::new(0),
            sections_culled: AtomicU64::new(0),
            neighbor_visits: AtomicU64::new(0),
            sections_enqueued: AtomicU64::new(0),
            sections_dequeued: AtomicU64::new(0),
            spiral_probes: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.find_visible_calls.store(0, Ordering::Relaxed);
        self.layers_processed.store(0, Ordering::Relaxed);
        self.sections_visited.store(0, Ordering::Relaxed);
        self.sections_culled.store(0, Ordering::Relaxed);
        self.neighbor_visits.store(0, Ordering::Relaxed);
        self.sections_enqueued.store(0, Ordering::Relaxed);
        self.sections_dequeued.store(0, Ordering::Relaxed);
        self.spiral_probes.store(0, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            find_visible_calls: self.find_visible_calls.load(Ordering::Relaxed),
            layers_processed: self.layers_processed.load(Ordering::Relaxed),
            sections_visited: self.sections_visited.load(Ordering::Relaxed),
            sections_culled: self.sections_culled.load(Ordering::Relaxed),
            neighbor_visits: self.neighbor_visits.load(Ordering::Relaxed),
            sections_enqueued: self.sections_enqueued.load(Ordering::Relaxed),
            sections_dequeued: self.sections_dequeued.load(Ordering::Relaxed),
            spiral_probes: self.spiral_probes.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy)]
pub struct CounterSnapshot {
    pub find_visible_calls: u64,
    pub layers_processed: u64,
    pub sections_visited: u64,
    pub sections_culled: u64,
    pub neighbor_visits: u64,
    pub sections_enqueued: u64,
    pub sections_dequeued: u64,
    pub spiral_probes: u64,
}

impl CounterSnapshot {
    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Performance Counters Report ===");
        println!("\nTraversal Operations:");
        println!("  find_visible calls:         {:12}", self.find_visible_calls);
        println!("  layers processed:           {:12}", self.layers_processed);
        println!("  sections visited:           {:12}", self.sections_visited);
        println!("  sections culled:            {:12}", self.sections_culled);
        if self.sections_visited > 0 {
            let cull_rate = (self.sections_culled as f64 / self.sections_visited as f64) * 100.0;
            println!("  cull rate:                  {:11.2}%", cull_rate);
        }

        println!("\nGraph Expansion:");
        println!("  neighbor visits:            {:12}", self.neighbor_visits);
        println!("  sections enqueued:          {:12}", self.sections_enqueued);
        println!("  sections dequeued:          {:12}", self.sections_dequeued);
        if self.neighbor_visits > 0 {
            let claim_rate = (self.sections_enqueued as f64 / self.neighbor_visits as f64) * 100.0;
            println!("  first-claim rate:           {:11.2}%", claim_rate);
        }

        println!("\nSpiral Seeding:");
        println!("  spiral probes:              {:12}", self.spiral_probes);

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

/// Hardware performance counter wrapper for benchmarking the traversal
#[cfg(feature = "profiling")]
pub mod hardware {
    use perf_event::events::Hardware;
    use perf_event::{Builder, Counter};

    const EVENT_COUNT: usize = 6;

    // Indices into the counter array, in snapshot field order
    const EVENTS: [Hardware; EVENT_COUNT] = [
        Hardware::CPU_CYCLES,
        Hardware::INSTRUCTIONS,
        Hardware::CACHE_REFERENCES,
        Hardware::CACHE_MISSES,
        Hardware::BRANCH_INSTRUCTIONS,
        Hardware::BRANCH_MISSES,
    ];

    /// One perf fd per hardware event. Events the kernel refuses (missing
    /// permissions, virtualized hosts) stay None and read back as zero.
    pub struct HardwareCounters {
        counters: [Option<Counter>; EVENT_COUNT],
    }

    impl HardwareCounters {
        pub fn new() -> Self {
            Self {
                counters: EVENTS.map(|event| Builder::new().kind(event).build().ok()),
            }
        }

        pub fn enable_all(&mut self) {
            for counter in self.counters.iter_mut().flatten() {
                let _ = counter.enable();
            }
        }

        pub fn disable_all(&mut self) {
            for counter in self.counters.iter_mut().flatten() {
                let _ = counter.disable();
            }
        }

        pub fn reset_all(&mut self) {
            for counter in self.counters.iter_mut().flatten() {
                let _ = counter.reset();
            }
        }

        /// Run `work` with every counter enabled and return what they saw
        pub fn measure<T>(&mut self, work: impl FnOnce() -> T) -> (T, HardwareSnapshot) {
            self.reset_all();
            self.enable_all();
            let result = work();
            self.disable_all();
            (result, self.read_all())
        }

        pub fn read_all(&mut self) -> HardwareSnapshot {
            let mut values = [0u64; EVENT_COUNT];
            for (value, counter) in values.iter_mut().zip(self.counters.iter_mut()) {
                if let Some(counter) = counter {
                    *value = counter.read().unwrap_or(0);
                }
            }
            HardwareSnapshot {
                cpu_cycles: values[0],
                instructions: values[1],
                cache_references: values[2],
                cache_misses: values[3],
                branch_instructions: values[4],
                branch_misses: values[5],
            }
        }
    }

    /// Counter values captured over one measurement window
    #[derive(Debug, Clone, Copy, Default)]
    pub struct HardwareSnapshot {
        pub cpu_cycles: u64,
        pub instructions: u64,
        pub cache_references: u64,
        pub cache_misses: u64,
        pub branch_instructions: u64,
        pub branch_misses: u64,
    }

    impl HardwareSnapshot {
        /// Instructions retired per cycle, when cycles were measured
        pub fn instructions_per_cycle(&self) -> Option<f64> {
            (self.cpu_cycles > 0).then(|| self.instructions as f64 / self.cpu_cycles as f64)
        }

        /// Percentage of cache references served without a miss
        pub fn cache_hit_rate(&self) -> Option<f64> {
            (self.cache_references > 0).then(|| {
                self.cache_references.saturating_sub(self.cache_misses) as f64
                    / self.cache_references as f64
                    * 100.0
            })
        }

        /// Percentage of branches predicted correctly
        pub fn branch_prediction_rate(&self) -> Option<f64> {
            (self.branch_instructions > 0).then(|| {
                self.branch_instructions.saturating_sub(self.branch_misses) as f64
                    / self.branch_instructions as f64
                    * 100.0
            })
        }

        pub fn print_report(&self) {
            println!("\n=== Hardware Performance Counters ===");
            println!("CPU Cycles:            {:16}", self.cpu_cycles);
            println!("Instructions:          {:16}", self.instructions);
            if let Some(ipc) = self.instructions_per_cycle() {
                println!("IPC:                   {:16.3}", ipc);
            }

            println!("\nCache Performance:");
            println!("Cache References:      {:16}", self.cache_references);
            println!("Cache Misses:          {:16}", self.cache_misses);
            if let Some(rate) = self.cache_hit_rate() {
                println!("Cache Hit Rate:        {:15.2}%", rate);
            }

            println!("\nBranch Performance:");
            println!("Branch Instructions:   {:16}", self.branch_instructions);
            println!("Branch Misses:         {:16}", self.branch_misses);
            if let Some(rate) = self.branch_prediction_rate() {
                println!("Branch Prediction:     {:15.2}%", rate);
            }

            println!();
        }
    }
}
