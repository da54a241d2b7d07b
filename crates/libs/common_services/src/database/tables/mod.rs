mod post;
mod series;

pub use post::*;
pub use series::*;
