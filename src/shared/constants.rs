/// Chunk size for incremental blob uploads (5 MiB, backend minimum)
pub const UPLOAD_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Delay before a completed upload task disappears from the tracker,
/// giving the UI time to show the completed state
pub const UPLOAD_REMOVAL_DELAY_MS: u64 = 2500;

/// Avatar assigned to newly provisioned catalog users
pub const DEFAULT_AVATAR_URL: &str =
    "https://www.svgrepo.com/show/382109/male-avatar-boy-face-man-user-7.svg";
