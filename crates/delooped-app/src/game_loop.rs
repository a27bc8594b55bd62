//! Game loop thread: runs the engine at its tick rate and publishes snapshots.
//!
//! The engine moves into the thread and is handed back on shutdown.
//! Commands arrive via `mpsc`. Every snapshot is sent on the outgoing channel
//! and the latest one is kept in shared state for synchronous polling.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use delooped_core::commands::PlayerCommand;
use delooped_core::state::RunSnapshot;
use delooped_sim::Simulation;

/// Messages accepted by the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the engine.
    Player(PlayerCommand),
    /// Stop the loop and hand the engine back.
    Shutdown,
}

/// Owner side of a running game loop.
pub struct GameLoopHandle {
    commands: mpsc::Sender<GameLoopCommand>,
    thread: JoinHandle<Simulation>,
}

impl GameLoopHandle {
    /// Forward a player command. Returns false once the loop has stopped.
    pub fn send(&self, command: PlayerCommand) -> bool {
        self.commands.send(GameLoopCommand::Player(command)).is_ok()
    }

    /// Stop the loop and take the engine back. `None` if the thread panicked.
    pub fn shutdown(self) -> Option<Simulation> {
        let _ = self.commands.send(GameLoopCommand::Shutdown);
        self.thread.join().ok()
    }
}

/// Nominal duration of one tick.
pub fn tick_duration(tick_rate: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / tick_rate.max(1) as u64)
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(
    sim: Simulation,
    latest_snapshot: Arc<Mutex<Option<RunSnapshot>>>,
    snapshot_tx: mpsc::Sender<RunSnapshot>,
) -> io::Result<GameLoopHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let thread = std::thread::Builder::new()
        .name("delooped-game-loop".into())
        .spawn(move || run_game_loop(sim, cmd_rx, &latest_snapshot, &snapshot_tx))?;

    Ok(GameLoopHandle {
        commands: cmd_tx,
        thread,
    })
}

/// Runs until `Shutdown` or until the command channel disconnects.
fn run_game_loop(
    mut sim: Simulation,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<RunSnapshot>>,
    snapshot_tx: &mpsc::Sender<RunSnapshot>,
) -> Simulation {
    let step = tick_duration(sim.config().tick_rate);
    let mut next_tick_time = Instant::now();
    log::debug!("game loop started at {:?} per tick", step);

    loop {
        // 1. Drain pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Player(cmd)) => sim.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    log::debug!("game loop stopped");
                    return sim;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick (game speed and pause are applied by the engine)
        let snapshot = sim.tick();

        // 3. Store the latest snapshot, then publish it
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot.clone());
        }
        let _ = snapshot_tx.send(snapshot);

        // 4. Sleep until the next tick
        next_tick_time += step;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > step * 2 {
            // Too far behind, skip ahead instead of spiralling
            next_tick_time = now;
        }
    }
}
