pub mod loader;
pub mod mask;
pub mod paths;
pub mod tiff_stack;

pub use loader::{load_masks, load_stacks};
pub use mask::read_mask;
pub use paths::PathSettings;
pub use tiff_stack::{read_stack, save_projection, write_stack};
