//! Parallel search scheduler.
//!
//! Workers run the sample-filter-playout loop against the shared tree until
//! the duration deadline, the iteration cap or an external cancel stops
//! them. A progress task ticks alongside the workers. The search state
//! (sampler, tree, root bookkeeping) lives behind one lock, which doubles as
//! the aggregation mutex for backup evaluation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;
use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};

use cardplay_core::{Card, Game, Seat, Side};
use cardplay_dds::{AlphaBetaOracle, Oracle, OracleError};

use crate::backup::{BackupEvaluator, Model};
use crate::sampler::Sampler;
use crate::tree::{Node, Role, Tree};
use crate::world::World;

use std::collections::BTreeMap;

/// Fixed default seed, so identical runs replay identically
const DEFAULT_SEED: u64 = 0x5EED_CA2D;

/// Engine-wide knobs fixed at construction
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Worker threads running the simulation loop (min 1)
    pub threads: usize,
    /// Optional hard cap on total iterations per search
    pub max_iterations: Option<u64>,
    /// Master seed for the per-worker random streams
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: 1,
            max_iterations: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl SearchConfig {
    fn actual_threads(&self) -> usize {
        self.threads.max(1)
    }
}

/// Periodic search progress, also delivered once at completion
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress {
    pub iterations: u64,
    pub elapsed: Duration,
}

type Callback = Box<dyn Fn(&SearchProgress) + Send + Sync>;

/// Per-search state: fixed once a search starts, reused by `continue_search`
struct SearchState {
    sampler: Sampler,
    tree: Arc<Tree>,
    /// The game's acting seat when the search started
    root_seat: Seat,
    root_side: Side,
    declarer_side: Side,
    required_tricks: u8,
    depth: u8,
    /// Master generator handing one stream seed to each worker
    seeder: Mutex<StdRng>,
}

/// Deadline plus external-cancel flag, checked cooperatively at loop heads
struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Instant,
}

impl CancelToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || Instant::now() >= self.deadline
    }

    fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// The analysis engine: owns the oracle, the attached game and the search
pub struct Engine {
    config: SearchConfig,
    oracle: Arc<dyn Oracle>,
    game: Mutex<Option<Game>>,
    state: Mutex<Option<SearchState>>,
    iterations: AtomicU64,
    searching: AtomicBool,
    cancel_flag: Arc<AtomicBool>,
    elapsed_ms: AtomicU64,
    progress_callbacks: Mutex<Vec<Callback>>,
    completed_callbacks: Mutex<Vec<Callback>>,
}

impl Engine {
    /// Create an engine backed by the built-in double-dummy solver
    pub fn new(config: SearchConfig) -> Result<Self, OracleError> {
        Ok(Self::with_oracle(config, Arc::new(AlphaBetaOracle)))
    }

    /// Create an engine with a caller-supplied oracle
    pub fn with_oracle(config: SearchConfig, oracle: Arc<dyn Oracle>) -> Self {
        Engine {
            config,
            oracle,
            game: Mutex::new(None),
            state: Mutex::new(None),
            iterations: AtomicU64::new(0),
            searching: AtomicBool::new(false),
            cancel_flag: Arc::new(AtomicBool::new(false)),
            elapsed_ms: AtomicU64::new(0),
            progress_callbacks: Mutex::new(Vec::new()),
            completed_callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Attach the position to analyze; any previous search is discarded
    pub fn attach(&self, game: &Game) {
        *self.game.lock() = Some(game.clone());
        *self.state.lock() = None;
        self.iterations.store(0, Ordering::Relaxed);
    }

    /// Subscribe to the periodic progress event
    pub fn on_progress(&self, callback: impl Fn(&SearchProgress) + Send + Sync + 'static) {
        self.progress_callbacks.lock().push(Box::new(callback));
    }

    /// Subscribe to the search-completed event
    pub fn on_completed(&self, callback: impl Fn(&SearchProgress) + Send + Sync + 'static) {
        self.completed_callbacks.lock().push(Box::new(callback));
    }

    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Relaxed)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Elapsed wall time of the last finished search
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
    }

    /// The current search tree, if a search has been set up.
    /// Blocks while a search is running.
    pub fn tree(&self) -> Option<Arc<Tree>> {
        self.state.lock().as_ref().map(|s| Arc::clone(&s.tree))
    }

    /// Signal cancellation; workers stop at their next loop head
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Start a fresh search: new sampler, new tree, iteration counter reset.
    /// Blocks until the duration elapses, the iteration cap fires or the
    /// search is cancelled from another thread. Returns false if no game is
    /// attached.
    pub fn search(&self, duration_ms: u64, interval_ms: u64, depth: u8) -> bool {
        let state = {
            let game = self.game.lock();
            let game = match game.as_ref() {
                Some(game) => game,
                None => {
                    warn!("search requested with no game attached");
                    return false;
                }
            };
            let root_seat = game.leader();
            SearchState {
                sampler: Sampler::new(game),
                tree: Arc::new(Tree::new()),
                root_seat,
                root_side: root_seat.side(),
                declarer_side: game.declarer().side(),
                required_tricks: game.contract().required_tricks(),
                depth: depth.clamp(1, 3),
                seeder: Mutex::new(StdRng::seed_from_u64(self.config.seed)),
            }
        };

        let mut guard = self.state.lock();
        *guard = Some(state);
        self.iterations.store(0, Ordering::Relaxed);
        if let Some(state) = guard.as_ref() {
            self.execute(state, duration_ms, interval_ms);
        }
        true
    }

    /// Resume the previous search, reusing its sampler and tree. Returns
    /// false if no search has been run yet.
    pub fn continue_search(&self, duration_ms: u64, interval_ms: u64) -> bool {
        let guard = self.state.lock();
        match guard.as_ref() {
            Some(state) => {
                self.execute(state, duration_ms, interval_ms);
                true
            }
            None => {
                warn!("continue requested with no prior search");
                false
            }
        }
    }

    /// Evaluate the tree under an (opponent, partner) model pair, yielding a
    /// score per root move. Returns None before any iteration has run.
    /// Taking the state lock serializes this against a running search.
    pub fn evaluate(
        &self,
        opponent: &dyn Model,
        partner: &dyn Model,
    ) -> Option<BTreeMap<Card, f64>> {
        let guard = self.state.lock();
        let state = match guard.as_ref() {
            Some(state) => state,
            None => {
                warn!("evaluate requested with no search state");
                return None;
            }
        };
        if self.iterations.load(Ordering::Relaxed) == 0 {
            warn!("evaluate requested before any iterations");
            return None;
        }
        Some(BackupEvaluator::new(opponent, partner).evaluate(&state.tree))
    }

    /// Run workers plus the progress task until the token fires
    fn execute(&self, state: &SearchState, duration_ms: u64, interval_ms: u64) {
        let duration = duration_ms.max(250);
        let interval = interval_ms.clamp(50, duration);

        self.cancel_flag.store(false, Ordering::Relaxed);
        self.searching.store(true, Ordering::Relaxed);
        let start = Instant::now();
        let token = CancelToken {
            flag: Arc::clone(&self.cancel_flag),
            deadline: start + Duration::from_millis(duration),
        };

        let threads = self.config.actual_threads();
        debug!(
            "search: {} workers, {} ms, depth {}",
            threads, duration, state.depth
        );

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(threads + 1)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!("could not build worker pool: {}", e);
                self.searching.store(false, Ordering::Relaxed);
                return;
            }
        };

        pool.scope(|scope| {
            for _ in 0..threads {
                let seed: u64 = state.seeder.lock().random();
                let token = CancelToken {
                    flag: Arc::clone(&token.flag),
                    deadline: token.deadline,
                };
                scope.spawn(move |_| self.worker_loop(state, &token, seed));
            }

            let progress_token = CancelToken {
                flag: Arc::clone(&token.flag),
                deadline: token.deadline,
            };
            scope.spawn(move |_| self.progress_loop(&progress_token, start, interval));
        });

        let elapsed = start.elapsed();
        self.elapsed_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
        self.searching.store(false, Ordering::Relaxed);

        let progress = SearchProgress {
            iterations: self.iterations.load(Ordering::Relaxed),
            elapsed,
        };
        for callback in self.completed_callbacks.lock().iter() {
            callback(&progress);
        }
    }

    /// The simulation loop: sample, filter, synchronize, descend
    fn worker_loop(&self, state: &SearchState, token: &CancelToken, seed: u64) {
        let mut rng = SmallRng::seed_from_u64(seed);

        while !token.is_cancelled() {
            let iteration = self.iterations.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(cap) = self.config.max_iterations {
                if iteration >= cap {
                    token.cancel();
                }
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                let mut world = state.sampler.generate(&mut rng);
                if !state.sampler.filter(&world) {
                    return; // rejection sample
                }
                state.sampler.synchronize(&mut world);
                let root = state.tree.root();
                self.query(state, &root, &mut world, state.depth, &mut rng);
            }));
            if outcome.is_err() {
                // Do not take the other workers down with us
                warn!("worker failed, ending this worker");
                break;
            }
        }
    }

    /// One random playout step through the shared tree
    fn query(
        &self,
        state: &SearchState,
        node: &Arc<Node>,
        world: &mut World,
        depth: u8,
        rng: &mut SmallRng,
    ) {
        if depth == 0 || world.is_over() {
            let (win, tricks) = self.evaluate_world(state, world);
            node.insert(win, tricks);
            return;
        }

        let moves = world.legal_moves();
        if moves.is_empty() {
            let (win, tricks) = self.evaluate_world(state, world);
            node.insert(win, tricks);
            return;
        }
        let card = moves[rng.random_range(0..moves.len())];

        let key = world.play(card);
        let role = self.role_for(state, world.to_act());
        let child = state.tree.get_or_create(key, role);
        let edge = node.edge(card);
        edge.update(key);

        self.query(state, &child, world, depth - 1, rng);
    }

    /// Role of the seat to act, relative to the search's root seat
    fn role_for(&self, state: &SearchState, seat: Seat) -> Role {
        if seat == state.root_seat {
            Role::Hero
        } else if seat.side() == state.root_side {
            Role::Partner
        } else {
            Role::Opponent
        }
    }

    /// Score a playout world for the root side: (contract decided our way,
    /// tricks for the root side)
    fn evaluate_world(&self, state: &SearchState, world: &World) -> (bool, u8) {
        let world_side = world.to_act().side() as usize;
        let for_leader = match world.tricks(&*self.oracle) {
            Ok(tricks) => tricks,
            Err(e) => {
                warn!("oracle evaluation failed: {}", e);
                0
            }
        };

        let mut tricks = [0u8; 2];
        tricks[world_side] = for_leader;
        tricks[1 - world_side] = 13 - for_leader;

        let can_make = tricks[state.declarer_side as usize] >= state.required_tricks;
        let win = if state.root_side == state.declarer_side {
            can_make
        } else {
            !can_make
        };
        (win, tricks[state.root_side as usize])
    }

    /// Emit progress every `interval` ms until cancelled, sleeping in short
    /// steps so cancellation cuts the wait
    fn progress_loop(&self, token: &CancelToken, start: Instant, interval_ms: u64) {
        loop {
            let wake = Instant::now() + Duration::from_millis(interval_ms);
            while Instant::now() < wake {
                if token.is_cancelled() {
                    return;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            if token.is_cancelled() {
                return;
            }
            let progress = SearchProgress {
                iterations: self.iterations.load(Ordering::Relaxed),
                elapsed: start.elapsed(),
            };
            for callback in self.progress_callbacks.lock().iter() {
                callback(&progress);
            }
        }
    }
}
