pub mod locking;
pub mod work_dir;

pub use work_dir::WorkDir;
