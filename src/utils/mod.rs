pub mod fs_utils;
pub mod number_utils;
pub mod progress_utils;
pub mod test_utils;
