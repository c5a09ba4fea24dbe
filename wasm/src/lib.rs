use minesweeper_ai as ms;
use std::collections::BTreeSet;
use wasm_bindgen::prelude::*;

fn init() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed, which is fine on repeat calls.
    let _ = console_log::init_with_level(log::Level::Debug);
}

fn load(bts: &[u8]) -> Result<ms::Game, String> {
    ms::Game::deserialize(bts).map_err(|e| e.to_string())
}

fn flatten(game: &ms::Game, cells: &BTreeSet<ms::Point>) -> Vec<u32> {
    cells
        .iter()
        .map(|p| (p.row * game.board.width + p.col) as u32)
        .collect()
}

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u16) -> Result<Vec<u8>, String> {
    init();

    let mut rng = rand::rng();
    let board = ms::Board::new(height as usize, width as usize, mines as usize, &mut rng)
        .map_err(|e| e.to_string())?;
    ms::Game::new(board).serialize().map_err(|e| e.to_string())
}

/// Lets the bot make one move and returns the updated game.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    init();

    let mut game = load(&bts)?;
    let mut rng = rand::rng();
    if let Some(turn) = game.step(&mut rng).map_err(|e| e.to_string())? {
        log::debug!("bot chose {:?}", turn.chosen);
    }
    game.serialize().map_err(|e| e.to_string())
}

/// 0 playing, 1 won, 2 lost, 3 stuck.
#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> Result<u8, String> {
    let game = load(&bts)?;
    Ok(match game.game_state {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
        ms::GameState::Stuck => 3,
    })
}

/// Row-major indices of cells the bot has proven safe.
#[wasm_bindgen]
pub fn safe_cells(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    let game = load(&bts)?;
    Ok(flatten(&game, game.engine.safes()))
}

/// Row-major indices of cells the bot has proven to be mines.
#[wasm_bindgen]
pub fn mine_cells(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    let game = load(&bts)?;
    Ok(flatten(&game, game.engine.mines()))
}

/// Row-major indices of cells the bot has revealed.
#[wasm_bindgen]
pub fn revealed_cells(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    let game = load(&bts)?;
    Ok(flatten(&game, game.engine.moves_made()))
}
