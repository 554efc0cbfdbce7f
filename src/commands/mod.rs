pub mod apply;
pub mod inspect;
pub mod utils;

pub use apply::run_apply;
pub use inspect::{run_list, run_path};
