//! Piece sequence generation
//!
//! By default pieces are dealt in a fixed cycle. The optional "7-bag" order
//! shuffles all 7 pieces, then deals them out before reshuffling.

use crate::tetromino::TetrominoType;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How the next piece is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PieceOrder {
    /// O, L, T, I, S, Z, J, repeating
    #[default]
    Cycle,
    /// Shuffled bags of all seven kinds
    Bag,
}

impl PieceOrder {
    pub fn name(&self) -> &'static str {
        match self {
            PieceOrder::Cycle => "Cycle",
            PieceOrder::Bag => "7-Bag",
        }
    }
}

/// Source of upcoming pieces with a preview queue
#[derive(Debug, Clone)]
pub struct PieceQueue {
    order: PieceOrder,
    rng: ChaCha8Rng,
    queue: VecDeque<TetrominoType>,
}

impl PieceQueue {
    /// Create a queue; the seed only matters for the bag order
    pub fn new(order: PieceOrder, seed: u64) -> Self {
        let mut queue = Self {
            order,
            rng: ChaCha8Rng::seed_from_u64(seed),
            queue: VecDeque::with_capacity(14),
        };
        queue.refill();
        queue
    }

    /// Get the next piece from the queue
    pub fn next(&mut self) -> TetrominoType {
        // Keep at least one piece behind the one handed out for the preview
        if self.queue.len() <= 1 {
            self.refill();
        }
        self.queue.pop_front().unwrap_or(TetrominoType::O)
    }

    /// The piece that `next` will return
    pub fn peek(&self) -> TetrominoType {
        self.queue.front().copied().unwrap_or(TetrominoType::O)
    }

    fn refill(&mut self) {
        let mut batch = TetrominoType::all();
        if self.order == PieceOrder::Bag {
            batch.shuffle(&mut self.rng);
        }
        self.queue.extend(batch);
    }
}
