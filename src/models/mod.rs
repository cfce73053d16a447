pub mod candle;
pub mod direction;

pub use candle::{Candle, CandleWindow};
pub use direction::{Direction, Outcome};
