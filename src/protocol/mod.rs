pub mod frame;

pub use frame::{encode_frame, read_frame, write_frame, DEFAULT_MAX_FRAME_BYTES, PREFIX_LEN};
