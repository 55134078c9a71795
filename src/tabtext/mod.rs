mod length;
mod markup;

pub use length::{SongLength, classify_length};
pub use markup::highlight_tab;
