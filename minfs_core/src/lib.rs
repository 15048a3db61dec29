pub mod bitmap;
pub mod check;
pub mod disk;
pub mod errors;
pub mod fs_format;
pub mod layout;

pub use crate::bitmap::Bitmap;
pub use crate::check::{check_image, CheckReport};
pub use crate::disk::{BlockId, DirEntry, Inode, InodeKind, Superblock};
pub use crate::errors::MinfsError;
pub use crate::fs_format::{format_device, FormatContext, FormatOptions};
pub use crate::layout::Layout;
