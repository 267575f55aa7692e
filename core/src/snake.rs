use alloc::collections::VecDeque;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// The snake only moves on every Nth frame.
pub const SNAKE_FRAME_SKIP: u32 = 8;

/// How many recently visited tiles stay closed behind the head.
pub const SNAKE_LENGTH: usize = 12;

/// State of the decorative snake that wanders a won board, closing tiles under its head and reopening
/// them once they fall off its tail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnakeState {
    head: Coord2,
    heading: Direction,
    trail: VecDeque<Coord2>,
    frame: u32,
}

impl SnakeState {
    fn new(head: Coord2, heading: Direction) -> Self {
        Self {
            head,
            heading,
            trail: VecDeque::with_capacity(SNAKE_LENGTH + 1),
            frame: 0,
        }
    }

    pub fn head(&self) -> Coord2 {
        self.head
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Recently visited tiles, oldest first. The same tile shows up more than once when the snake crosses
    /// its own path.
    pub fn trail(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.trail.iter().copied()
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

#[derive(Copy, Clone, Debug)]
struct Candidate {
    direction: Direction,
    coords: Coord2,
    rank: u8,
    weight: u32,
}

impl Board {
    pub(crate) fn start_snake(&mut self) {
        let free = self.tiles().filter(|tile| !tile.is_flag()).count();
        if free == 0 {
            log::debug!("No room for the win animation");
            return;
        }

        let nth = self.rng.random_range(0..free);
        let Some(head) = self
            .tiles()
            .filter(|tile| !tile.is_flag())
            .nth(nth)
            .map(Tile::coords)
        else {
            return;
        };
        let heading = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];

        log::debug!("Win animation starts at {:?} heading {:?}", head, heading);
        self.snake = Some(SnakeState::new(head, heading));
    }

    pub fn is_animating(&self) -> bool {
        self.snake.is_some()
    }

    pub fn snake(&self) -> Option<&SnakeState> {
        self.snake.as_ref()
    }

    pub fn snake_head(&self) -> Option<Coord2> {
        self.snake.as_ref().map(SnakeState::head)
    }

    /// Advances the win animation by one frame, returning whether any tile changed. Does nothing until
    /// the game is won.
    pub fn tick(&mut self) -> bool {
        let Some(mut snake) = self.snake.take() else {
            return false;
        };

        snake.frame = snake.frame.wrapping_add(1);
        let moved = snake.frame % SNAKE_FRAME_SKIP == 0 && self.step_snake(&mut snake);
        self.snake = Some(snake);

        if moved {
            self.notify();
        }
        moved
    }

    fn step_snake(&mut self, snake: &mut SnakeState) -> bool {
        let Some((direction, next)) = self.choose_snake_move(snake) else {
            log::trace!("Snake boxed in at {:?}", snake.head);
            snake.heading = snake.heading.reverse();
            return false;
        };

        self.tile_mut(snake.head).is_glasses = false;
        self.close_for_animation(next);
        self.tile_mut(next).is_glasses = true;

        snake.trail.push_back(next);
        if snake.trail.len() > SNAKE_LENGTH {
            if let Some(tail) = snake.trail.pop_front() {
                // still part of the body when the snake crossed itself
                if !snake.trail.contains(&tail) {
                    self.reopen_for_animation(tail);
                }
            }
        }

        log::trace!("Snake moved {:?} to {:?}", direction, next);
        snake.head = next;
        snake.heading = direction;
        true
    }

    /// Picks the next move. Headings within 45 degrees of the current one are preferred, going straight
    /// counts double, and tiles outside the trail win within the same tier. Flagged tiles are never entered.
    fn choose_snake_move(&mut self, snake: &SnakeState) -> Option<(Direction, Coord2)> {
        let size = self.size();
        let candidates: SmallVec<[Candidate; 8]> = Direction::ALL
            .iter()
            .filter_map(|&direction| {
                let coords = direction.step(snake.head, size)?;
                if self.tile(coords).is_flag() {
                    return None;
                }

                let turns = snake.heading.turns_to(direction);
                let preferred = turns <= 1;
                let fresh = !snake.trail.contains(&coords);
                let rank = match (preferred, fresh) {
                    (true, true) => 0,
                    (true, false) => 1,
                    (false, true) => 2,
                    (false, false) => 3,
                };
                let weight = if turns == 0 { 2 } else { 1 };

                Some(Candidate {
                    direction,
                    coords,
                    rank,
                    weight,
                })
            })
            .collect();

        let best_rank = candidates.iter().map(|candidate| candidate.rank).min()?;
        let total_weight: u32 = candidates
            .iter()
            .filter(|candidate| candidate.rank == best_rank)
            .map(|candidate| candidate.weight)
            .sum();

        let mut pick = self.rng.random_range(0..total_weight);
        candidates
            .iter()
            .filter(|candidate| candidate.rank == best_rank)
            .find(|candidate| {
                if pick < candidate.weight {
                    true
                } else {
                    pick -= candidate.weight;
                    false
                }
            })
            .map(|candidate| (candidate.direction, candidate.coords))
    }
}
