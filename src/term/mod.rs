//! Term module - terminal presentation for the demo binary

pub mod view;

pub use view::BoardView;
