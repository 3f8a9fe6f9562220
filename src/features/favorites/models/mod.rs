mod favorite;

pub use favorite::*;
