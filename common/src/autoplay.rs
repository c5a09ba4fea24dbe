use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Board, Engine, Inference, Minefield, Move, next_move};

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
    /// No cell is left that is neither revealed nor a known mine.
    Stuck,
}

/// The result of a single bot move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub chosen: Move,
    /// Neighbor count reported by the board, `None` if the cell was a mine.
    pub revealed: Option<u8>,
    pub inference: Inference,
}

/// A board paired with the bot playing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub board: Board,
    pub engine: Engine,
    pub game_state: GameState,
    pub move_count: usize,
}

impl Game {
    pub fn new(board: Board) -> Self {
        let (height, width) = board.dimensions();
        Game {
            board,
            engine: Engine::new(height, width),
            game_state: GameState::Playing,
            move_count: 0,
        }
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Makes one move:
    /// 1. Asks the selector for a safe cell, or a random guess.
    /// 2. Reveals it on the board; a mine loses the game.
    /// 3. Feeds the neighbor count to the engine.
    /// 4. Flags every mine the engine has proven and checks for a win.
    ///
    /// Returns `None` when there is nothing left to try.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Turn>> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let Some(chosen) = next_move(&self.engine, rng) else {
            info!("no candidate moves left");
            self.game_state = GameState::Stuck;
            return Ok(None);
        };
        let point = chosen.point();
        self.move_count += 1;
        debug!("move #{}: {chosen:?}", self.move_count);

        if self.board.is_mine(point)? {
            info!("hit a mine at {point}");
            self.game_state = GameState::Lost;
            return Ok(Some(Turn {
                chosen,
                revealed: None,
                inference: Inference::default(),
            }));
        }

        let count = self.board.neighbor_mine_count(point)?;
        let inference = self.engine.add_observation(point, count)?;

        for &mine in self.engine.mines() {
            self.board.flag(mine)?;
        }
        if self.board.won() {
            info!("all {} mines flagged", self.board.mine_count());
            self.game_state = GameState::Won;
        }

        Ok(Some(Turn {
            chosen,
            revealed: Some(count),
            inference,
        }))
    }

    /// Plays until the game is won, lost, or stuck.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.game_state == GameState::Playing {
            self.step(rng)?;
        }
        Ok(self.game_state)
    }
}
