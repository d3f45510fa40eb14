pub mod combat;
pub mod cycle;
pub mod encounter;
pub mod market;
pub mod perks;
pub mod player;
