pub mod card;
pub mod keyword;
pub mod mana;
pub mod permanent;
pub mod player;
pub mod snapshot;
pub mod stack;
