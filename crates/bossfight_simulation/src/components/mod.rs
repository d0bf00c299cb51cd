//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: бойцы (Combatant, Mana, Invincibility, Hurtbox, Player)
//! - movement: тело и motion intent (Body, MotionIntent, Arena)

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
